use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::Employee;
use crate::models::wire::parse_amount;
use crate::ui::components::form::{FieldKind, FormField, FormState, render_form};

pub enum EmployeeWizardAction {
    Cancel,
    Save(Employee),
}

#[derive(Clone, Copy, PartialEq)]
enum EmployeeField {
    Name,
    Phone,
    DateOfBirth,
    Email,
    Address,
    Nationality,
    Status,
    Department,
    Designation,
    Salary,
    StartDate,
    ContractEndDate,
    PassportNo,
    PassportExpiry,
    VisaExpiry,
    EmiratesIdNo,
    EmiratesIdExpiry,
}

pub struct EmployeeWizardState {
    employee: Employee,
    form: FormState,
    error: Option<String>,
}

fn day_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

impl EmployeeWizardState {
    pub fn new() -> Self {
        Self::from_existing(Employee::default())
    }

    pub fn from_existing(employee: Employee) -> Self {
        let salary = if employee.work.salary.is_zero() {
            String::new()
        } else {
            employee.work.salary.normalize().to_string()
        };
        let form = FormState::new(vec![
            FormField::text("Name").required().with_value(&employee.name),
            FormField::text("Phone").with_value(&employee.phone),
            FormField::date("Date of Birth").with_value(day_text(employee.date_of_birth)),
            FormField::text("Email").with_value(&employee.email),
            FormField::text("Address").with_value(&employee.address),
            FormField::text("Nationality").with_value(&employee.nationality),
            FormField::text("Status").with_value(&employee.status),
            FormField::text("Department").with_value(&employee.work.department),
            FormField::text("Designation").with_value(&employee.work.designation),
            FormField::amount("Salary").with_value(salary),
            FormField::date("Start Date").with_value(day_text(employee.work.start_date)),
            FormField::date("Contract End").with_value(day_text(employee.work.contract_end_date)),
            FormField::text("Passport No").with_value(&employee.passport.passport_no),
            FormField::date("Passport Expiry").with_value(day_text(employee.passport.expiry_passport)),
            FormField::date("Visa Expiry").with_value(day_text(employee.visa_expiry)),
            FormField::text("Emirates ID No").with_value(&employee.emirates_id.number),
            FormField::date("Emirates ID Expiry").with_value(day_text(employee.emirates_id.expiry)),
        ]);
        Self {
            employee,
            form,
            error: None,
        }
    }

    pub fn to_employee(&self) -> Employee {
        let text = |field: EmployeeField| self.form.value(field as usize).trim().to_string();
        let date = |field: EmployeeField| self.form.date_value(field as usize);

        let mut employee = self.employee.clone();
        employee.name = text(EmployeeField::Name);
        employee.phone = text(EmployeeField::Phone);
        employee.date_of_birth = date(EmployeeField::DateOfBirth);
        employee.email = text(EmployeeField::Email);
        employee.address = text(EmployeeField::Address);
        employee.nationality = text(EmployeeField::Nationality);
        employee.status = text(EmployeeField::Status);
        employee.work.department = text(EmployeeField::Department);
        employee.work.designation = text(EmployeeField::Designation);
        employee.work.salary = parse_amount(self.form.value(EmployeeField::Salary as usize));
        employee.work.start_date = date(EmployeeField::StartDate);
        employee.work.contract_end_date = date(EmployeeField::ContractEndDate);
        employee.passport.passport_no = text(EmployeeField::PassportNo);
        employee.passport.expiry_passport = date(EmployeeField::PassportExpiry);
        employee.visa_expiry = date(EmployeeField::VisaExpiry);
        employee.emirates_id.number = text(EmployeeField::EmiratesIdNo);
        employee.emirates_id.expiry = date(EmployeeField::EmiratesIdExpiry);
        employee
    }
}

impl Default for EmployeeWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_employee_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut EmployeeWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(19),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let (title_text, title_style) = match &state.error {
        Some(error) => (error.clone(), Style::default().fg(Color::Red)),
        None if state.employee.id.is_empty() => ("New Employee".to_string(), Style::default().fg(Color::Cyan)),
        None => (format!("Edit Employee {}", state.employee.name), Style::default().fg(Color::Cyan)),
    };
    let title = Paragraph::new(title_text)
        .style(title_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_form(frame, &state.form, chunks[1], "Employee Details");

    let help_text = match (state.form.editing, state.form.current_kind()) {
        (true, Some(FieldKind::Date)) => "Digits - Fill part | Left/Right - Switch part | Enter - Save field | Esc - Cancel",
        (true, _) => "Enter - Save field | Esc - Cancel editing",
        (false, Some(FieldKind::Date)) => "Enter - Edit date | Del - Clear date | Up/Down - Navigate | S - Save | Esc - Cancel",
        (false, _) => "Enter - Edit field | Up/Down - Navigate fields | S - Save employee | Esc - Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

pub fn handle_key(state: &mut EmployeeWizardState, key: KeyCode) -> Option<EmployeeWizardAction> {
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
        KeyCode::Esc => return Some(EmployeeWizardAction::Cancel),
        KeyCode::Enter => state.form.toggle_editing(),
        KeyCode::Delete => state.form.clear_current(),
        KeyCode::Up => state.form.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.form.next_field(),
        KeyCode::Char('s') => {
            if state.form.is_valid() {
                return Some(EmployeeWizardAction::Save(state.to_employee()));
            }
            state.error = Some(format!("Required: {}", state.form.missing_fields().join(", ")));
        }
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut EmployeeWizardState) -> Result<Option<EmployeeWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmiratesId, Passport};
    use rust_decimal_macros::dec;

    #[test]
    fn nested_documents_round_trip_through_the_form() {
        let existing = Employee {
            id: "e1".into(),
            name: "Ravi".into(),
            passport: Passport {
                passport_no: "P123".into(),
                expiry_passport: NaiveDate::from_ymd_opt(2027, 1, 31),
            },
            emirates_id: EmiratesId {
                number: "784-1".into(),
                expiry: NaiveDate::from_ymd_opt(2026, 6, 1),
            },
            ..Default::default()
        };
        let mut state = EmployeeWizardState::from_existing(existing);
        state.form.set_value(EmployeeField::Salary as usize, "3500");

        state.form.current_field = EmployeeField::EmiratesIdExpiry as usize;
        handle_key(&mut state, KeyCode::Delete);

        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(EmployeeWizardAction::Save(employee)) => {
                assert_eq!(employee.id, "e1");
                assert_eq!(employee.work.salary, dec!(3500));
                assert_eq!(employee.passport.expiry_passport, NaiveDate::from_ymd_opt(2027, 1, 31));
                assert_eq!(employee.emirates_id.number, "784-1");
                assert_eq!(employee.emirates_id.expiry, None);
            }
            _ => panic!("expected save"),
        }
    }

    #[test]
    fn name_is_required() {
        let mut state = EmployeeWizardState::new();
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.error.as_deref(), Some("Required: Name"));
    }
}
