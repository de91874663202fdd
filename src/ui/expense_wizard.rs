use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::Expense;
use crate::models::wire::parse_amount;
use crate::ui::components::form::{FormField, FormState, render_form};

pub enum ExpenseWizardAction {
    Cancel,
    Save(Expense),
}

#[derive(Clone, Copy, PartialEq)]
enum ExpenseField {
    Description,
    Amount,
}

pub struct ExpenseWizardState {
    expense: Expense,
    form: FormState,
    error: Option<String>,
}

impl ExpenseWizardState {
    pub fn new() -> Self {
        Self::from_existing(Expense::default())
    }

    pub fn from_existing(expense: Expense) -> Self {
        let amount = if expense.amount.is_zero() {
            String::new()
        } else {
            expense.amount.normalize().to_string()
        };
        let form = FormState::new(vec![
            FormField::text("Expense").required().with_value(&expense.description),
            FormField::amount("Amount (AED)").required().with_value(amount),
        ]);
        Self {
            expense,
            form,
            error: None,
        }
    }

    pub fn to_expense(&self) -> Expense {
        let mut expense = self.expense.clone();
        expense.description = self.form.value(ExpenseField::Description as usize).trim().to_string();
        expense.amount = parse_amount(self.form.value(ExpenseField::Amount as usize));
        expense
    }
}

impl Default for ExpenseWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_expense_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut ExpenseWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let (title_text, title_style) = match &state.error {
        Some(error) => (error.clone(), Style::default().fg(Color::Red)),
        None if state.expense.id.is_empty() => ("New Expense".to_string(), Style::default().fg(Color::Cyan)),
        None => ("Edit Expense".to_string(), Style::default().fg(Color::Cyan)),
    };
    let title = Paragraph::new(title_text)
        .style(title_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_form(frame, &state.form, chunks[1], "Expense Details");

    let help_text = if state.form.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save expense | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

pub fn handle_key(state: &mut ExpenseWizardState, key: KeyCode) -> Option<ExpenseWizardAction> {
    state.error = None;

    if state.form.editing {
        match key {
            KeyCode::Enter => state.form.toggle_editing(),
            KeyCode::Esc => state.form.cancel_editing(),
            _ => state.form.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(ExpenseWizardAction::Cancel),
        KeyCode::Enter => state.form.toggle_editing(),
        KeyCode::Up => state.form.previous_field(),
        KeyCode::Down => state.form.next_field(),
        KeyCode::Char('s') => {
            if state.form.is_valid() {
                return Some(ExpenseWizardAction::Save(state.to_expense()));
            }
            state.error = Some(format!("Required: {}", state.form.missing_fields().join(", ")));
        }
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut ExpenseWizardState) -> Result<Option<ExpenseWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn saves_parsed_amount() {
        let mut state = ExpenseWizardState::new();
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert!(state.error.is_some());

        state.form.set_value(ExpenseField::Description as usize, " Rent ");
        state.form.set_value(ExpenseField::Amount as usize, "1500.50");
        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ExpenseWizardAction::Save(expense)) => {
                assert_eq!(expense.description, "Rent");
                assert_eq!(expense.amount, dec!(1500.50));
                assert!(expense.id.is_empty());
            }
            _ => panic!("expected save"),
        }
    }
}
