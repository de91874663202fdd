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
use crate::billing::monthly::in_month;
use crate::models::PartOrder;
use crate::print::PrintMode;
use crate::ui::components::month_bar::{handle_month_key, render_month_bar};
use crate::ui::components::popup::render_confirm;
use crate::ui::components::selection::Selection;

pub struct PartOrdersState {
    orders: Vec<PartOrder>,
    month: MonthKey,
    selection: Selection,
    show_delete_confirmation: bool,
}

impl PartOrdersState {
    pub fn new(orders: Vec<PartOrder>, month: MonthKey) -> Self {
        let mut state = Self {
            orders,
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

    fn visible(&self) -> Vec<&PartOrder> {
        in_month(&self.orders, self.month)
    }

    pub fn selected_order(&self) -> Option<&PartOrder> {
        self.selection
            .selected()
            .and_then(|i| self.visible().get(i).copied())
    }

    pub fn month_totals(&self) -> (Decimal, Decimal) {
        self.visible()
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(due, pending), o| {
                (due + o.due_amount, pending + o.pending_amount)
            })
    }

    pub fn remove(&mut self, deleted: &[String]) {
        self.orders.retain(|o| !deleted.contains(&o.id));
        let remaining: Vec<String> = self.visible().iter().map(|o| o.id.clone()).collect();
        let ids: Vec<&str> = remaining.iter().map(String::as_str).collect();
        self.selection.retain(&ids, ids.len());
    }

    fn delete_targets(&self) -> Vec<String> {
        self.selection
            .targets(self.selected_order().map(|o| o.id.as_str()))
    }
}

pub enum PartOrderAction {
    Back,
    New,
    Edit(String),
    Delete(Vec<String>),
    Print(PartOrder, PrintMode),
    Share(String),
}

pub fn render_part_orders<B: Backend>(frame: &mut Frame<B>, state: &mut PartOrdersState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let (due, pending) = state.month_totals();
    render_month_bar(frame, chunks[0], state.month, &[("Due", due), ("Pending", pending)]);

    let header_cells = ["", "Date", "Supplier", "Phone", "Vehicle", "Items", "Due", "Pending", "Status"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = state
        .visible()
        .into_iter()
        .map(|order| {
            let mark = if state.selection.is_marked(&order.id) { "[x]" } else { "[ ]" };
            let date = order
                .date
                .map(|d| d.format("%d-%m-%Y").to_string())
                .unwrap_or_default();
            Row::new(vec![
                Cell::from(mark),
                Cell::from(date),
                Cell::from(order.supplier.clone()),
                Cell::from(order.phone.clone()),
                Cell::from(order.target_vehicle.clone()),
                Cell::from(order.parts.len().to_string()),
                Cell::from(format!("{:.2}", order.due_amount)),
                Cell::from(format!("{:.2}", order.pending_amount)),
                Cell::from(order.status_of_work.as_str()),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Part Orders").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Length(3),
            Constraint::Percentage(11),
            Constraint::Percentage(18),
            Constraint::Percentage(14),
            Constraint::Percentage(12),
            Constraint::Percentage(6),
            Constraint::Percentage(11),
            Constraint::Percentage(11),
            Constraint::Percentage(10),
        ]);

    frame.render_stateful_widget(table, chunks[1], &mut state.selection.table_state);

    let buttons_text = if state.selected_order().is_some() {
        "<N> New | <E> Edit | <Space> Mark | <D> Delete | <P> Invoice | <O> Quotation | <W> WhatsApp | <[ ]> Month | <Esc> Back"
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
            &format!("Are you sure you want to delete {} part order(s)?", state.delete_targets().len()),
        );
    }
}

pub fn handle_key(state: &mut PartOrdersState, key: KeyCode) -> Option<PartOrderAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let targets = state.delete_targets();
                if !targets.is_empty() {
                    return Some(PartOrderAction::Delete(targets));
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
        KeyCode::Char('q') | KeyCode::Esc => return Some(PartOrderAction::Back),
        KeyCode::Char('n') => return Some(PartOrderAction::New),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(order) = state.selected_order() {
                return Some(PartOrderAction::Edit(order.id.clone()));
            }
        }
        KeyCode::Char(' ') => {
            if let Some(id) = state.selected_order().map(|o| o.id.clone()) {
                state.selection.toggle(&id);
                state.selection.next(len);
            }
        }
        KeyCode::Char('d') => {
            if !state.delete_targets().is_empty() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Char('p') => {
            if let Some(order) = state.selected_order() {
                return Some(PartOrderAction::Print(order.clone(), PrintMode::Invoice));
            }
        }
        KeyCode::Char('o') => {
            if let Some(order) = state.selected_order() {
                return Some(PartOrderAction::Print(order.clone(), PrintMode::Quotation));
            }
        }
        KeyCode::Char('w') => {
            if let Some(order) = state.selected_order() {
                return Some(PartOrderAction::Share(order.whatsapp_link()));
            }
        }
        KeyCode::Down => state.selection.next(len),
        KeyCode::Up => state.selection.previous(len),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut PartOrdersState) -> Result<Option<PartOrderAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceLine;
    use crate::models::wire::parse_date;
    use rust_decimal_macros::dec;

    fn order(id: &str, date: &str, due: Decimal) -> PartOrder {
        PartOrder {
            id: id.into(),
            date: parse_date(date),
            supplier: "Gulf Spares".into(),
            phone: "+971 50 000 0000".into(),
            due_amount: due,
            parts: vec![ServiceLine {
                description: "Brake Pad".into(),
                quantity: 2,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn share_builds_the_supplier_link() {
        let mut state = PartOrdersState::new(vec![order("a", "2024-08-03", dec!(90))], MonthKey::new(2024, 8));
        assert_eq!(state.month_totals().0, dec!(90));
        match handle_key(&mut state, KeyCode::Char('w')) {
            Some(PartOrderAction::Share(link)) => {
                assert_eq!(link, "https://wa.me/971500000000?text=Brake%20Pad%3A%202");
            }
            _ => panic!("expected share"),
        }
    }

    #[test]
    fn other_months_are_hidden() {
        let mut state = PartOrdersState::new(vec![order("a", "2024-08-03", dec!(90))], MonthKey::new(2024, 9));
        assert!(state.selected_order().is_none());
        assert!(handle_key(&mut state, KeyCode::Char('p')).is_none());
        handle_key(&mut state, KeyCode::Char('['));
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('p')),
            Some(PartOrderAction::Print(_, PrintMode::Invoice))
        ));
    }
}
