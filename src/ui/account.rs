use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Registration, User};
use crate::ui::components::form::{FormField, FormState, render_form};

pub enum AccountAction {
    Back,
    Register(Registration),
}

#[derive(Clone, Copy)]
enum RegisterField {
    Username,
    Password,
    ConfirmPassword,
}

pub struct AccountState {
    username: String,
    users: Vec<User>,
    form: FormState,
    message: Option<(String, bool)>,
}

impl AccountState {
    pub fn new(username: &str, users: Vec<User>) -> Self {
        Self {
            username: username.to_string(),
            users,
            form: blank_form(),
            message: None,
        }
    }

    /// Called after the server accepted a registration.
    pub fn registered(&mut self, users: Vec<User>, message: impl Into<String>) {
        self.users = users;
        self.form = blank_form();
        self.message = Some((message.into(), false));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), true));
    }

    fn registration(&self) -> Registration {
        Registration {
            username: self.form.value(RegisterField::Username as usize).trim().to_string(),
            password: self.form.value(RegisterField::Password as usize).to_string(),
            confirm_password: self.form.value(RegisterField::ConfirmPassword as usize).to_string(),
        }
    }
}

fn blank_form() -> FormState {
    FormState::new(vec![
        FormField::text("Username").required(),
        FormField::secret("Password").required(),
        FormField::secret("Confirm Password").required(),
    ])
}

pub fn render_account<B: Backend>(frame: &mut Frame<B>, state: &mut AccountState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title = Paragraph::new(format!("Account - logged in as {}", state.username))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(chunks[1]);

    let users: Vec<ListItem> = state
        .users
        .iter()
        .map(|user| {
            let style = if user.username == state.username {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Spans::from(Span::styled(user.username.clone(), style)))
        })
        .collect();
    let users = List::new(users).block(
        Block::default()
            .title(format!("Users ({})", state.users.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(users, body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(body[1]);

    render_form(frame, &state.form, right[0], "Register User");

    let registration = state.registration();
    let status = match &state.message {
        Some((message, is_error)) => Some((
            message.clone(),
            if *is_error { Color::Red } else { Color::Green },
        )),
        None if !registration.confirm_password.is_empty() && !registration.passwords_match() => {
            Some(("Passwords do not match".to_string(), Color::Red))
        }
        None => None,
    };
    if let Some((text, colour)) = status {
        let status = Paragraph::new(text)
            .style(Style::default().fg(colour))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, right[1]);
    }

    let help_text = if state.form.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate | S - Register | Esc - Back"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

pub fn handle_key(state: &mut AccountState, key: KeyCode) -> Option<AccountAction> {
    if state.form.editing {
        match key {
            KeyCode::Enter => state.form.toggle_editing(),
            KeyCode::Esc => state.form.cancel_editing(),
            _ => state.form.edit_current_field(key),
        }
        return None;
    }

    state.message = None;
    match key {
        KeyCode::Esc | KeyCode::Char('q') => return Some(AccountAction::Back),
        KeyCode::Enter => state.form.toggle_editing(),
        KeyCode::Up => state.form.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.form.next_field(),
        KeyCode::Char('s') => {
            let registration = state.registration();
            if !state.form.is_valid() {
                state.set_error(format!("Required: {}", state.form.missing_fields().join(", ")));
            } else if !registration.passwords_match() {
                state.set_error("Passwords do not match");
            } else {
                return Some(AccountAction::Register(registration));
            }
        }
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut AccountState) -> Result<Option<AccountAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(state: &mut AccountState, password: &str, confirm: &str) {
        state.form.set_value(RegisterField::Username as usize, "mechanic");
        state.form.set_value(RegisterField::Password as usize, password);
        state.form.set_value(RegisterField::ConfirmPassword as usize, confirm);
    }

    #[test]
    fn mismatched_passwords_are_not_submitted() {
        let mut state = AccountState::new("admin", Vec::new());
        fill(&mut state, "abc123", "abc124");
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.message, Some(("Passwords do not match".to_string(), true)));
    }

    #[test]
    fn matching_passwords_register() {
        let mut state = AccountState::new("admin", Vec::new());
        fill(&mut state, "abc123", "abc123");
        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(AccountAction::Register(registration)) => {
                assert_eq!(registration.username, "mechanic");
                assert_eq!(registration.confirm_password, "abc123");
            }
            _ => panic!("expected register"),
        }

        state.registered(
            vec![User {
                id: "u2".into(),
                username: "mechanic".into(),
            }],
            "User registered",
        );
        assert!(state.form.value(RegisterField::Username as usize).is_empty());
        assert_eq!(state.users.len(), 1);
    }
}
