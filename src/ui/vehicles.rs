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
use crate::models::Vehicle;
use crate::print::PrintMode;
use crate::ui::components::month_bar::{handle_month_key, render_month_bar};
use crate::ui::components::popup::render_confirm;
use crate::ui::components::selection::Selection;

// Represents the state of the vehicle table screen
pub struct VehiclesState {
    vehicles: Vec<Vehicle>,
    month: MonthKey,
    visible: Vec<usize>,
    selection: Selection,
    show_delete_confirmation: bool,
}

impl VehiclesState {
    pub fn new(vehicles: Vec<Vehicle>, month: MonthKey) -> Self {
        let mut state = Self {
            vehicles,
            month,
            visible: Vec::new(),
            selection: Selection::default(),
            show_delete_confirmation: false,
        };
        state.filter();
        state
    }

    fn visible_indexes(&self) -> Vec<usize> {
        self.vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| self.month.contains(v.date))
            .map(|(i, _)| i)
            .collect()
    }

    fn filter(&mut self) {
        self.visible = self.visible_indexes();
        self.selection.reset(self.visible.len());
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn visible_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.visible.iter().filter_map(|&i| self.vehicles.get(i))
    }

    pub fn selected_vehicle(&self) -> Option<&Vehicle> {
        self.selection
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|&i| self.vehicles.get(i))
    }

    /// Due and pending totals over the selected month.
    pub fn month_totals(&self) -> (Decimal, Decimal) {
        in_month(&self.vehicles, self.month)
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(due, pending), v| {
                (due + v.due_amount, pending + v.pending_amount)
            })
    }

    /// Drop records the server confirmed deleted; failed ones stay listed.
    pub fn remove(&mut self, deleted: &[String]) {
        self.vehicles.retain(|v| !deleted.contains(&v.id));
        self.visible = self.visible_indexes();
        let remaining: Vec<String> = self.visible_vehicles().map(|v| v.id.clone()).collect();
        let ids: Vec<&str> = remaining.iter().map(String::as_str).collect();
        self.selection.retain(&ids, ids.len());
    }

    fn delete_targets(&self) -> Vec<String> {
        self.selection
            .targets(self.selected_vehicle().map(|v| v.id.as_str()))
    }
}

pub enum VehicleAction {
    Back,
    New,
    Edit(String),
    Delete(Vec<String>),
    Print(Vehicle, PrintMode),
}

pub fn render_vehicles<B: Backend>(frame: &mut Frame<B>, state: &mut VehiclesState) {
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

    let header_cells = ["", "ID", "Date", "Customer", "Reg No", "Brand & Model", "Due", "Pending", "Status"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells)
        .style(Style::default())
        .height(1)
        .bottom_margin(1);

    let rows = state.visible_vehicles().map(|vehicle| {
        let mark = if state.selection.is_marked(&vehicle.id) { "[x]" } else { "[ ]" };
        let date = vehicle
            .date
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_default();
        let cells = vec![
            Cell::from(mark),
            Cell::from(vehicle.vehicle_id.clone()),
            Cell::from(date),
            Cell::from(vehicle.customer_name.clone()),
            Cell::from(vehicle.vehicle_reg_no.clone()),
            Cell::from(vehicle.brand_and_model()),
            Cell::from(format!("{:.2}", vehicle.due_amount)),
            Cell::from(format!("{:.2}", vehicle.pending_amount)),
            Cell::from(vehicle.status_of_work.as_str()),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Vehicles").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Length(3),
            Constraint::Percentage(7),
            Constraint::Percentage(11),
            Constraint::Percentage(18),
            Constraint::Percentage(11),
            Constraint::Percentage(17),
            Constraint::Percentage(11),
            Constraint::Percentage(11),
            Constraint::Percentage(10),
        ]);

    frame.render_stateful_widget(table, chunks[1], &mut state.selection.table_state);

    let buttons_text = if state.selected_vehicle().is_some() {
        "<N> New | <E> Edit | <Space> Mark | <D> Delete | <P> Print invoice | <O> Print quotation | <[ ]> Month | <Esc> Back"
    } else {
        "<N> New | <[ ]> Month | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        let count = state.delete_targets().len();
        render_confirm(
            frame,
            "Confirm Delete",
            &format!("Are you sure you want to delete {} vehicle record(s)?", count),
        );
    }
}

pub fn handle_key(state: &mut VehiclesState, key: KeyCode) -> Option<VehicleAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let targets = state.delete_targets();
                if !targets.is_empty() {
                    return Some(VehicleAction::Delete(targets));
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    if handle_month_key(&mut state.month, key) {
        state.filter();
        return None;
    }

    let len = state.visible.len();
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(VehicleAction::Back),
        KeyCode::Char('n') => return Some(VehicleAction::New),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(vehicle) = state.selected_vehicle() {
                return Some(VehicleAction::Edit(vehicle.id.clone()));
            }
        }
        KeyCode::Char(' ') => {
            if let Some(id) = state.selected_vehicle().map(|v| v.id.clone()) {
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
            if let Some(vehicle) = state.selected_vehicle() {
                return Some(VehicleAction::Print(vehicle.clone(), PrintMode::Invoice));
            }
        }
        KeyCode::Char('o') => {
            if let Some(vehicle) = state.selected_vehicle() {
                return Some(VehicleAction::Print(vehicle.clone(), PrintMode::Quotation));
            }
        }
        KeyCode::Down => state.selection.next(len),
        KeyCode::Up => state.selection.previous(len),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut VehiclesState) -> Result<Option<VehicleAction>> {
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

    fn vehicle(id: &str, date: &str, due: Decimal, pending: Decimal) -> Vehicle {
        Vehicle {
            id: id.into(),
            date: parse_date(date),
            due_amount: due,
            pending_amount: pending,
            ..Default::default()
        }
    }

    fn state() -> VehiclesState {
        VehiclesState::new(
            vec![
                vehicle("a", "2024-05-02", dec!(200), dec!(50)),
                vehicle("b", "2024-05-20", dec!(100), dec!(0)),
                vehicle("c", "2024-06-12", dec!(999), dec!(999)),
            ],
            MonthKey::new(2024, 5),
        )
    }

    #[test]
    fn month_filter_and_totals() {
        let mut state = state();
        assert_eq!(state.visible_vehicles().count(), 2);
        assert_eq!(state.month_totals(), (dec!(300), dec!(50)));

        handle_key(&mut state, KeyCode::Char(']'));
        assert_eq!(state.visible_vehicles().count(), 1);
        assert_eq!(state.month_totals(), (dec!(999), dec!(999)));
    }

    #[test]
    fn marked_rows_are_deleted_together() {
        let mut state = state();
        handle_key(&mut state, KeyCode::Char(' '));
        handle_key(&mut state, KeyCode::Char(' '));
        handle_key(&mut state, KeyCode::Char('d'));
        match handle_key(&mut state, KeyCode::Char('y')) {
            Some(VehicleAction::Delete(ids)) => assert_eq!(ids, vec!["a".to_string(), "b".to_string()]),
            _ => panic!("expected a batch delete"),
        }

        state.remove(&["a".to_string()]);
        assert_eq!(state.visible_vehicles().count(), 1);
        assert!(state.selection.is_marked("b"));
    }
}
