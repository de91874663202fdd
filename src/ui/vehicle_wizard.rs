use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::billing::InvoiceDraft;
use crate::models::{PAYMENT_METHODS, Vehicle};
use crate::ui::components::form::{FormField, FormState, render_form};
use crate::ui::components::line_items::{LineItemsState, render_line_items, render_totals};

pub enum VehicleWizardAction {
    Cancel,
    Save(Vehicle),
}

// Order matches the form rows.
#[derive(Clone, Copy, PartialEq)]
enum VehicleField {
    CustomerName,
    Phone,
    VehicleRegNo,
    Brand,
    VehicleModel,
    Mileage,
    PaymentMethod,
    VehicleAnalysis,
    SpareParts,
    Discount,
    PaidAmount,
}

#[derive(Clone, Copy, PartialEq)]
enum Focus {
    Details,
    Lines,
}

pub struct VehicleWizardState {
    vehicle: Vehicle,
    form: FormState,
    draft: InvoiceDraft,
    lines: LineItemsState,
    focus: Focus,
    error: Option<String>,
}

impl VehicleWizardState {
    pub fn new() -> Self {
        Self::from_existing(Vehicle {
            payment_method: PAYMENT_METHODS[0].to_string(),
            ..Default::default()
        })
        .with_blank_line()
    }

    fn with_blank_line(mut self) -> Self {
        self.draft = InvoiceDraft::new();
        self.lines = LineItemsState::new("Service", self.draft.lines().len());
        self
    }

    pub fn from_existing(vehicle: Vehicle) -> Self {
        let method = if vehicle.payment_method.is_empty() {
            PAYMENT_METHODS[0].to_string()
        } else {
            vehicle.payment_method.clone()
        };
        let form = FormState::new(vec![
            FormField::text("Customer Name").required().with_value(&vehicle.customer_name),
            FormField::text("Phone").required().with_value(&vehicle.phone),
            FormField::text("Vehicle Reg No").with_value(&vehicle.vehicle_reg_no),
            FormField::text("Brand").with_value(&vehicle.brand),
            FormField::text("Model").with_value(&vehicle.vehicle_model),
            FormField::text("Mileage").with_value(&vehicle.mileage),
            FormField::choice("Payment Method", &PAYMENT_METHODS).with_value(method),
            FormField::text("Vehicle Analysis").with_value(&vehicle.vehicle_analysis),
            FormField::text("Parts & Supplies").with_value(&vehicle.spare_parts),
            FormField::amount("Discount").with_value(plain(vehicle.discount)),
            FormField::amount("Paid Amount").with_value(plain(vehicle.paid_amount)),
        ]);
        let draft = InvoiceDraft::from_vehicle(&vehicle);
        let lines = LineItemsState::new("Service", draft.lines().len());

        Self {
            vehicle,
            form,
            draft,
            lines,
            focus: Focus::Details,
            error: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.vehicle.id.is_empty()
    }

    // Discount and paid amount drive the totals, so push them on every keystroke.
    fn sync_amounts(&mut self) {
        self.draft.set_discount(self.form.value(VehicleField::Discount as usize));
        self.draft.set_paid_amount(self.form.value(VehicleField::PaidAmount as usize));
    }

    pub fn validation_error(&self) -> Option<String> {
        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            return Some(format!("Required: {}", missing.join(", ")));
        }
        if self.draft.lines().iter().any(|line| line.description.trim().is_empty()) {
            return Some("Every service line needs a service type".to_string());
        }
        None
    }

    /// The vehicle as it will be submitted, with derived amounts filled in.
    pub fn to_vehicle(&self) -> Vehicle {
        let value = |field: VehicleField| self.form.value(field as usize).trim().to_string();
        let mut vehicle = self.vehicle.clone();
        vehicle.customer_name = value(VehicleField::CustomerName);
        vehicle.phone = value(VehicleField::Phone);
        vehicle.vehicle_reg_no = value(VehicleField::VehicleRegNo);
        vehicle.brand = value(VehicleField::Brand);
        vehicle.vehicle_model = value(VehicleField::VehicleModel);
        vehicle.mileage = value(VehicleField::Mileage);
        vehicle.payment_method = value(VehicleField::PaymentMethod);
        vehicle.vehicle_analysis = value(VehicleField::VehicleAnalysis);
        vehicle.spare_parts = value(VehicleField::SpareParts);
        self.draft.write_to_vehicle(&mut vehicle);
        vehicle
    }
}

impl Default for VehicleWizardState {
    fn default() -> Self {
        Self::new()
    }
}

fn plain(amount: rust_decimal::Decimal) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        amount.normalize().to_string()
    }
}

pub fn render_vehicle_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut VehicleWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(13),
                Constraint::Min(6),
                Constraint::Length(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title_text = match (&state.error, state.is_new()) {
        (Some(error), _) => error.clone(),
        (None, true) => "New Vehicle".to_string(),
        (None, false) => format!("Edit Vehicle {}", state.vehicle.vehicle_id),
    };
    let title_style = if state.error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let title = Paragraph::new(title_text)
        .style(title_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let details_title = if state.focus == Focus::Details {
        "Details (selected)"
    } else {
        "Details"
    };
    render_form(frame, &state.form, chunks[1], details_title);
    render_line_items(frame, &mut state.lines, &state.draft, chunks[2], state.focus == Focus::Lines);
    render_totals(frame, &state.draft, chunks[3]);

    let help_text = match state.focus {
        Focus::Details if state.form.editing => "Enter - Save field | Esc - Cancel editing",
        Focus::Details => "Enter - Edit/cycle | Up/Down - Navigate | Tab - Lines | S - Save | Esc - Cancel",
        Focus::Lines if state.lines.is_editing() => "Enter/Tab - Next field | Esc - Stop editing",
        Focus::Lines => "A - Add | E - Edit | D - Delete | R - Reset VAT | Tab - Details | S - Save | Esc - Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[4]);
}

pub fn handle_key(state: &mut VehicleWizardState, key: KeyCode) -> Option<VehicleWizardAction> {
    state.error = None;

    match state.focus {
        Focus::Details if state.form.editing => {
            match key {
                KeyCode::Enter => state.form.toggle_editing(),
                KeyCode::Esc => state.form.cancel_editing(),
                _ => state.form.edit_current_field(key),
            }
            state.sync_amounts();
            return None;
        }
        Focus::Lines => {
            if !state.lines.is_editing() {
                match key {
                    KeyCode::Tab => {
                        state.focus = Focus::Details;
                        return None;
                    }
                    KeyCode::Char('s') => return save(state),
                    KeyCode::Esc => return Some(VehicleWizardAction::Cancel),
                    _ => {}
                }
            }
            state.lines.handle_key(&mut state.draft, key);
            return None;
        }
        Focus::Details => {}
    }

    match key {
        KeyCode::Esc => return Some(VehicleWizardAction::Cancel),
        KeyCode::Tab => state.focus = Focus::Lines,
        KeyCode::Enter => state.form.toggle_editing(),
        KeyCode::Left => state.form.cycle_choice(false),
        KeyCode::Right => state.form.cycle_choice(true),
        KeyCode::Up => state.form.previous_field(),
        KeyCode::Down => state.form.next_field(),
        KeyCode::Char('s') => return save(state),
        _ => {}
    }
    None
}

fn save(state: &mut VehicleWizardState) -> Option<VehicleWizardAction> {
    match state.validation_error() {
        Some(error) => {
            state.error = Some(error);
            None
        }
        None => Some(VehicleWizardAction::Save(state.to_vehicle())),
    }
}

pub fn handle_input(state: &mut VehicleWizardState) -> Result<Option<VehicleWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::LineField;
    use crate::models::WorkStatus;
    use rust_decimal_macros::dec;

    fn type_field(state: &mut VehicleWizardState, text: &str) {
        handle_key(state, KeyCode::Enter);
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Enter);
    }

    #[test]
    fn save_requires_customer_and_phone() {
        let mut state = VehicleWizardState::new();
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert!(state.error.as_deref().is_some_and(|e| e.contains("Customer Name")));
    }

    #[test]
    fn discount_and_payment_settle_the_invoice() {
        let mut state = VehicleWizardState::new();
        type_field(&mut state, "Ahmed");
        handle_key(&mut state, KeyCode::Down);
        type_field(&mut state, "0501234567");

        state.draft.edit_line(0, LineField::Description, "Wash");
        state.draft.edit_line(0, LineField::UnitPrice, "100");
        state.draft.edit_line(0, LineField::Quantity, "2");

        state.form.current_field = VehicleField::Discount as usize;
        type_field(&mut state, "10");
        handle_key(&mut state, KeyCode::Down);
        type_field(&mut state, "150");
        assert_eq!(state.draft.totals().pending_amount, dec!(50));
        assert_eq!(state.draft.status(), WorkStatus::Progress);

        state.form.set_value(VehicleField::PaidAmount as usize, "200");
        state.sync_amounts();
        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(VehicleWizardAction::Save(vehicle)) => {
                assert_eq!(vehicle.customer_name, "Ahmed");
                assert_eq!(vehicle.payment_method, "Cash");
                assert_eq!(vehicle.total_amount, dec!(210));
                assert_eq!(vehicle.due_amount, dec!(200));
                assert_eq!(vehicle.pending_amount, dec!(0));
                assert_eq!(vehicle.status_of_work, WorkStatus::Done);
                assert!(vehicle.completion_date.is_some());
            }
            _ => panic!("expected save"),
        }
    }

    #[test]
    fn payment_method_cycles() {
        let mut state = VehicleWizardState::new();
        state.form.current_field = VehicleField::PaymentMethod as usize;
        handle_key(&mut state, KeyCode::Enter);
        assert_eq!(state.to_vehicle().payment_method, "Credit Card");
        handle_key(&mut state, KeyCode::Left);
        handle_key(&mut state, KeyCode::Left);
        assert_eq!(state.to_vehicle().payment_method, "Bank Transfer");
    }
}
