use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::billing::InvoiceDraft;
use crate::models::PartOrder;
use crate::ui::components::form::{FormField, FormState, render_form};
use crate::ui::components::line_items::{LineItemsState, render_line_items, render_totals};

pub enum PartOrderWizardAction {
    Cancel,
    Save(PartOrder),
}

#[derive(Clone, Copy, PartialEq)]
enum OrderField {
    Supplier,
    Phone,
    TargetVehicle,
    Discount,
    PaidAmount,
}

#[derive(Clone, Copy, PartialEq)]
enum Focus {
    Details,
    Parts,
}

pub struct PartOrderWizardState {
    order: PartOrder,
    form: FormState,
    draft: InvoiceDraft,
    parts: LineItemsState,
    focus: Focus,
    error: Option<String>,
}

impl PartOrderWizardState {
    pub fn new() -> Self {
        let mut state = Self::from_existing(PartOrder::default());
        state.draft = InvoiceDraft::new();
        state.parts = LineItemsState::new("Item", 1);
        state
    }

    pub fn from_existing(order: PartOrder) -> Self {
        let form = FormState::new(vec![
            FormField::text("Supplier").required().with_value(&order.supplier),
            FormField::text("Phone").required().with_value(&order.phone),
            FormField::text("Target Vehicle").with_value(&order.target_vehicle),
            FormField::amount("Discount").with_value(plain(order.discount)),
            FormField::amount("Paid Amount").with_value(plain(order.paid_amount)),
        ]);
        let draft = InvoiceDraft::from_part_order(&order);
        let parts = LineItemsState::new("Item", draft.lines().len());

        Self {
            order,
            form,
            draft,
            parts,
            focus: Focus::Details,
            error: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.order.id.is_empty()
    }

    fn sync_amounts(&mut self) {
        self.draft.set_discount(self.form.value(OrderField::Discount as usize));
        self.draft.set_paid_amount(self.form.value(OrderField::PaidAmount as usize));
    }

    pub fn validation_error(&self) -> Option<String> {
        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            return Some(format!("Required: {}", missing.join(", ")));
        }
        if self.draft.lines().is_empty() {
            return Some("Add at least one item".to_string());
        }
        if self
            .draft
            .lines()
            .iter()
            .any(|line| line.description.trim().is_empty() || line.quantity <= 0)
        {
            return Some("Every item needs a name and a quantity".to_string());
        }
        None
    }

    pub fn to_order(&self) -> PartOrder {
        let value = |field: OrderField| self.form.value(field as usize).trim().to_string();
        let mut order = self.order.clone();
        order.supplier = value(OrderField::Supplier);
        order.phone = value(OrderField::Phone);
        order.target_vehicle = value(OrderField::TargetVehicle);
        self.draft.write_to_part_order(&mut order);
        order
    }
}

impl Default for PartOrderWizardState {
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

pub fn render_part_order_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut PartOrderWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(7),
                Constraint::Min(6),
                Constraint::Length(5),
                Constraint::Length(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title_text = match (&state.error, state.is_new()) {
        (Some(error), _) => error.clone(),
        (None, true) => "New Part Order".to_string(),
        (None, false) => format!("Edit Part Order for {}", state.order.supplier),
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
        "Order (selected)"
    } else {
        "Order"
    };
    render_form(frame, &state.form, chunks[1], details_title);
    render_line_items(frame, &mut state.parts, &state.draft, chunks[2], state.focus == Focus::Parts);
    render_totals(frame, &state.draft, chunks[3]);

    let share = Paragraph::new(state.to_order().whatsapp_link())
        .style(Style::default().fg(Color::Green))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("WhatsApp").borders(Borders::ALL));
    frame.render_widget(share, chunks[4]);

    let help_text = match state.focus {
        Focus::Details if state.form.editing => "Enter - Save field | Esc - Cancel editing",
        Focus::Details => "Enter - Edit field | Up/Down - Navigate | Tab - Items | S - Save | Esc - Cancel",
        Focus::Parts if state.parts.is_editing() => "Enter/Tab - Next field | Esc - Stop editing",
        Focus::Parts => "A - Add | E - Edit | D - Delete | R - Reset VAT | Tab - Order | S - Save | Esc - Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[5]);
}

pub fn handle_key(state: &mut PartOrderWizardState, key: KeyCode) -> Option<PartOrderWizardAction> {
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
        Focus::Parts => {
            if !state.parts.is_editing() {
                match key {
                    KeyCode::Tab => {
                        state.focus = Focus::Details;
                        return None;
                    }
                    KeyCode::Char('s') => return save(state),
                    KeyCode::Esc => return Some(PartOrderWizardAction::Cancel),
                    _ => {}
                }
            }
            state.parts.handle_key(&mut state.draft, key);
            return None;
        }
        Focus::Details => {}
    }

    match key {
        KeyCode::Esc => return Some(PartOrderWizardAction::Cancel),
        KeyCode::Tab => state.focus = Focus::Parts,
        KeyCode::Enter => state.form.toggle_editing(),
        KeyCode::Up => state.form.previous_field(),
        KeyCode::Down => state.form.next_field(),
        KeyCode::Char('s') => return save(state),
        _ => {}
    }
    None
}

fn save(state: &mut PartOrderWizardState) -> Option<PartOrderWizardAction> {
    match state.validation_error() {
        Some(error) => {
            state.error = Some(error);
            None
        }
        None => Some(PartOrderWizardAction::Save(state.to_order())),
    }
}

pub fn handle_input(state: &mut PartOrderWizardState) -> Result<Option<PartOrderWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::LineField;
    use rust_decimal_macros::dec;

    #[test]
    fn items_need_names() {
        let mut state = PartOrderWizardState::new();
        state.form.set_value(OrderField::Supplier as usize, "Gulf Spares");
        state.form.set_value(OrderField::Phone as usize, "971500000000");
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.error.as_deref(), Some("Every item needs a name and a quantity"));
    }

    #[test]
    fn edited_order_keeps_its_id() {
        let existing = PartOrder {
            id: "po-7".into(),
            supplier: "Gulf Spares".into(),
            phone: "971500000000".into(),
            ..Default::default()
        };
        let mut state = PartOrderWizardState::from_existing(existing);
        handle_key(&mut state, KeyCode::Tab);
        handle_key(&mut state, KeyCode::Char('a'));
        state.parts.commit_field(&mut state.draft);
        state.draft.edit_line(0, LineField::Description, "Brake Pad");
        state.draft.edit_line(0, LineField::UnitPrice, "40");

        match handle_key(&mut state, KeyCode::Esc) {
            None => {}
            _ => panic!("Esc while editing a field should only stop editing"),
        }
        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(PartOrderWizardAction::Save(order)) => {
                assert_eq!(order.id, "po-7");
                assert_eq!(order.parts[0].description, "Brake Pad");
                assert_eq!(order.total_amount, dec!(42));
            }
            _ => panic!("expected save"),
        }
    }
}
