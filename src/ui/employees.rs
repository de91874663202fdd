use anyhow::Result;
use chrono::{NaiveDate, Utc};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::Employee;
use crate::ui::components::popup::render_confirm;
use crate::ui::components::selection::Selection;

pub struct EmployeesState {
    employees: Vec<Employee>,
    selection: Selection,
    show_delete_confirmation: bool,
}

impl EmployeesState {
    pub fn new(employees: Vec<Employee>) -> Self {
        let selection = Selection::new(employees.len());
        Self {
            employees,
            selection,
            show_delete_confirmation: false,
        }
    }

    pub fn selected_employee(&self) -> Option<&Employee> {
        self.selection.selected().and_then(|i| self.employees.get(i))
    }

    pub fn remove(&mut self, deleted: &[String]) {
        self.employees.retain(|e| !deleted.contains(&e.id));
        let remaining: Vec<String> = self.employees.iter().map(|e| e.id.clone()).collect();
        let ids: Vec<&str> = remaining.iter().map(String::as_str).collect();
        self.selection.retain(&ids, ids.len());
    }

    fn delete_targets(&self) -> Vec<String> {
        self.selection
            .targets(self.selected_employee().map(|e| e.id.as_str()))
    }
}

pub enum EmployeeAction {
    Back,
    New,
    Edit(String),
    Delete(Vec<String>),
}

/// Earliest of the visa, passport and Emirates ID expiry dates.
fn next_expiry(employee: &Employee) -> Option<NaiveDate> {
    [
        employee.visa_expiry,
        employee.passport.expiry_passport,
        employee.emirates_id.expiry,
    ]
    .into_iter()
    .flatten()
    .min()
}

pub fn render_employees<B: Backend>(frame: &mut Frame<B>, state: &mut EmployeesState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let today = Utc::now().date_naive();
    let header_cells = ["", "Name", "Designation", "Department", "Phone", "Next Expiry"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = state
        .employees
        .iter()
        .map(|employee| {
            let mark = if state.selection.is_marked(&employee.id) { "[x]" } else { "[ ]" };
            let expiry = next_expiry(employee);
            let expiry_style = match expiry {
                Some(day) if day < today => Style::default().fg(Color::Red),
                _ => Style::default(),
            };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(employee.name.clone()),
                Cell::from(employee.work.designation.clone()),
                Cell::from(employee.work.department.clone()),
                Cell::from(employee.phone.clone()),
                Cell::from(expiry.map(|d| d.format("%d-%m-%Y").to_string()).unwrap_or_default())
                    .style(expiry_style),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Employees").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Length(3),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(18),
            Constraint::Percentage(17),
            Constraint::Percentage(15),
        ]);

    frame.render_stateful_widget(table, chunks[0], &mut state.selection.table_state);

    let buttons_text = if state.selected_employee().is_some() {
        "<N> New | <E> Edit | <Space> Mark | <D> Delete | <Esc> Back"
    } else {
        "<N> New | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[1]);

    if state.show_delete_confirmation {
        render_confirm(
            frame,
            "Confirm Delete",
            &format!("Are you sure you want to delete {} employee(s)?", state.delete_targets().len()),
        );
    }
}

pub fn handle_key(state: &mut EmployeesState, key: KeyCode) -> Option<EmployeeAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let targets = state.delete_targets();
                if !targets.is_empty() {
                    return Some(EmployeeAction::Delete(targets));
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let len = state.employees.len();
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(EmployeeAction::Back),
        KeyCode::Char('n') => return Some(EmployeeAction::New),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(employee) = state.selected_employee() {
                return Some(EmployeeAction::Edit(employee.id.clone()));
            }
        }
        KeyCode::Char(' ') => {
            if let Some(id) = state.selected_employee().map(|e| e.id.clone()) {
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

pub fn handle_input(state: &mut EmployeesState) -> Result<Option<EmployeeAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Passport;

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.into(),
            name: format!("employee {}", id),
            ..Default::default()
        }
    }

    #[test]
    fn cursor_row_is_deleted_when_nothing_is_marked() {
        let mut state = EmployeesState::new(vec![employee("a"), employee("b")]);
        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Char('d'));
        match handle_key(&mut state, KeyCode::Char('y')) {
            Some(EmployeeAction::Delete(ids)) => assert_eq!(ids, vec!["b".to_string()]),
            _ => panic!("expected delete"),
        }
        state.remove(&["b".to_string()]);
        assert_eq!(state.selected_employee().map(|e| e.id.as_str()), Some("a"));
    }

    #[test]
    fn next_expiry_picks_the_earliest_document() {
        let mut e = employee("a");
        e.visa_expiry = NaiveDate::from_ymd_opt(2026, 9, 1);
        e.passport = Passport {
            passport_no: "X1".into(),
            expiry_passport: NaiveDate::from_ymd_opt(2025, 2, 1),
        };
        assert_eq!(next_expiry(&e), NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(next_expiry(&employee("b")), None);
    }
}
