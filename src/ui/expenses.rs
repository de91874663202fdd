use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use rust_decimal::Decimal;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::billing::MonthKey;
use crate::billing::monthly::{in_month, sum_amounts};
use crate::models::Expense;
use crate::ui::components::month_bar::{handle_month_key, render_month_bar};
use crate::ui::components::popup::render_confirm;
use crate::ui::components::selection::Selection;

pub struct ExpensesState {
    expenses: Vec<Expense>,
    month: MonthKey,
    selection: Selection,
    show_delete_confirmation: bool,
}

impl ExpensesState {
    pub fn new(expenses: Vec<Expense>, month: MonthKey) -> Self {
        let mut state = Self {
            expenses,
            month,
            selection: Selection::default(),
            show_delete_confirmation: false,
        };
        state.selection.reset(state.visible().len());
        state
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    fn visible(&self) -> Vec<&Expense> {
        in_month(&self.expenses, self.month)
    }

    pub fn month_total(&self) -> Decimal {
        sum_amounts(self.visible())
    }

    pub fn selected_expense(&self) -> Option<&Expense> {
        self.selection
            .selected()
            .and_then(|i| self.visible().get(i).copied())
    }

    pub fn remove(&mut self, deleted: &[String]) {
        self.expenses.retain(|e| !deleted.contains(&e.id));
        let remaining: Vec<String> = self.visible().iter().map(|e| e.id.clone()).collect();
        let ids: Vec<&str> = remaining.iter().map(String::as_str).collect();
        self.selection.retain(&ids, ids.len());
    }

    fn delete_targets(&self) -> Vec<String> {
        self.selection
            .targets(self.selected_expense().map(|e| e.id.as_str()))
    }
}

pub enum ExpenseAction {
    Back,
    New,
    Edit(Expense),
    Delete(Vec<String>),
}

pub fn render_expenses<B: Backend>(frame: &mut Frame<B>, state: &mut ExpensesState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    render_month_bar(frame, chunks[0], state.month, &[("Total", state.month_total())]);

    let header_cells = ["", "Date", "Expense", "Amount (AED)"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = state
        .visible()
        .into_iter()
        .map(|expense| {
            let mark = if state.selection.is_marked(&expense.id) { "[x]" } else { "[ ]" };
            let date = expense
                .date
                .map(|d| d.format("%d-%m-%Y").to_string())
                .unwrap_or_default();
            Row::new(vec![
                Cell::from(mark),
                Cell::from(date),
                Cell::from(expense.description.clone()),
                Cell::from(format!("{:.2}", expense.amount)),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Expenses").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Length(3),
            Constraint::Percentage(20),
            Constraint::Percentage(55),
            Constraint::Percentage(20),
        ]);

    frame.render_stateful_widget(table, chunks[1], &mut state.selection.table_state);

    let buttons_text = if state.selected_expense().is_some() {
        "<N> New | <E> Edit | <Space> Mark | <D> Delete | <[ ]> Month | <Esc> Back"
    } else {
        "<N> New | <[ ]> Month | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_confirm(
            frame,
            "Confirm Delete",
            &format!("Are you sure you want to delete {} expense(s)?", state.delete_targets().len()),
        );
    }
}

pub fn handle_key(state: &mut ExpensesState, key: KeyCode) -> Option<ExpenseAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let targets = state.delete_targets();
                if !targets.is_empty() {
                    return Some(ExpenseAction::Delete(targets));
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    if handle_month_key(&mut state.month, key) {
        let len = state.visible().len();
        state.selection.reset(len);
        return None;
    }

    let len = state.visible().len();
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ExpenseAction::Back),
        KeyCode::Char('n') => return Some(ExpenseAction::New),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(expense) = state.selected_expense() {
                return Some(ExpenseAction::Edit(expense.clone()));
            }
        }
        KeyCode::Char(' ') => {
            if let Some(id) = state.selected_expense().map(|e| e.id.clone()) {
                state.selection.toggle(&id);
                state.selection.next(len);
            }
        }
        KeyCode::Char('d') => {
            if !state.delete_targets().is_empty() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Down => state.selection.next(len),
        KeyCode::Up => state.selection.previous(len),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut ExpensesState) -> Result<Option<ExpenseAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wire::parse_date;
    use rust_decimal_macros::dec;

    fn expense(id: &str, date: &str, amount: Decimal) -> Expense {
        Expense {
            id: id.into(),
            date: parse_date(date),
            description: format!("expense {}", id),
            amount,
        }
    }

    #[test]
    fn month_total_follows_filter() {
        let mut state = ExpensesState::new(
            vec![
                expense("a", "2024-01-05", dec!(100)),
                expense("b", "2024-01-25", dec!(50.25)),
                expense("c", "2024-02-10", dec!(10)),
                expense("d", "", dec!(999)),
            ],
            MonthKey::new(2024, 1),
        );
        assert_eq!(state.month_total(), dec!(150.25));

        handle_key(&mut state, KeyCode::Char(']'));
        assert_eq!(state.month_total(), dec!(10));
        match handle_key(&mut state, KeyCode::Enter) {
            Some(ExpenseAction::Edit(e)) => assert_eq!(e.id, "c"),
            _ => panic!("expected edit"),
        }
    }
}
