use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::Credentials;
use crate::ui::components::form::{FormField, FormState, render_form};

pub enum LoginAction {
    Quit,
    Submit(Credentials),
}

#[derive(Clone, Copy)]
enum LoginField {
    Username,
    Password,
}

pub struct LoginState {
    form: FormState,
    message: Option<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            form: FormState::new(vec![
                FormField::text("Username").required(),
                FormField::secret("Password").required(),
            ]),
            message: None,
        }
    }

    /// Inline message under the form, e.g. the server's reason for a failed login.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            username: self.form.value(LoginField::Username as usize).trim().to_string(),
            password: self.form.value(LoginField::Password as usize).to_string(),
        }
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &mut LoginState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title = Paragraph::new("FastFix Console - Login")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_form(frame, &state.form, chunks[1], "Credentials");

    if let Some(message) = &state.message {
        let message = Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(message, chunks[2]);
    }

    let help_text = if state.form.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate | L - Log in | Esc - Quit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[4]);
}

pub fn handle_key(state: &mut LoginState, key: KeyCode) -> Option<LoginAction> {
    if state.form.editing {
        match key {
            KeyCode::Enter | KeyCode::Esc => state.form.toggle_editing(),
            KeyCode::Tab => {
                state.form.toggle_editing();
                state.form.next_field();
                state.form.toggle_editing();
            }
            _ => state.form.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Esc | KeyCode::Char('q') => return Some(LoginAction::Quit),
        KeyCode::Enter => state.form.toggle_editing(),
        KeyCode::Up => state.form.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.form.next_field(),
        KeyCode::Char('l') => {
            if state.form.is_valid() {
                state.message = None;
                return Some(LoginAction::Submit(state.credentials()));
            }
            state.set_message("Username and password are required");
        }
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(state: &mut LoginState, text: &str) {
        handle_key(state, KeyCode::Enter);
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Enter);
    }

    #[test]
    fn submit_requires_both_fields() {
        let mut state = LoginState::new();
        type_into(&mut state, "admin");
        assert!(handle_key(&mut state, KeyCode::Char('l')).is_none());
        assert!(state.message.is_some());

        handle_key(&mut state, KeyCode::Down);
        type_into(&mut state, "s3cret");
        match handle_key(&mut state, KeyCode::Char('l')) {
            Some(LoginAction::Submit(credentials)) => {
                assert_eq!(credentials.username, "admin");
                assert_eq!(credentials.password, "s3cret");
            }
            _ => panic!("expected a submit"),
        }
    }
}
