use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{BarChart, Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::Workshop;
use crate::billing::monthly::MONTH_NAMES;
use crate::billing::{MonthKey, MonthSummary, SearchHit, YearSeries, search};
use crate::ui::components::month_bar::handle_month_key;

/// Top-level screens reachable from the dashboard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Section {
    Vehicles,
    Expenses,
    Employees,
    PartOrders,
    Account,
}

pub enum DashboardAction {
    Quit,
    Logout,
    Refresh,
    Navigate(Section),
    Open(SearchHit),
}

pub struct DashboardState {
    username: String,
    workshop: Workshop,
    month: MonthKey,
    summary: MonthSummary,
    series: YearSeries,
    query: String,
    searching: bool,
    results: Vec<SearchHit>,
    results_state: ListState,
}

impl DashboardState {
    pub fn new(username: &str, workshop: Workshop) -> Self {
        Self::with_month(username, workshop, MonthKey::current())
    }

    pub fn with_month(username: &str, workshop: Workshop, month: MonthKey) -> Self {
        let summary = MonthSummary::compute(&workshop.vehicles, &workshop.expenses, month);
        let series = YearSeries::compute(&workshop.vehicles, month.year);
        Self {
            username: username.to_string(),
            workshop,
            month,
            summary,
            series,
            query: String::new(),
            searching: false,
            results: Vec::new(),
            results_state: ListState::default(),
        }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    fn refresh_figures(&mut self) {
        self.summary = MonthSummary::compute(&self.workshop.vehicles, &self.workshop.expenses, self.month);
        self.series = YearSeries::compute(&self.workshop.vehicles, self.month.year);
    }

    fn run_search(&mut self) {
        self.results = search(
            &self.query,
            &self.workshop.vehicles,
            &self.workshop.expenses,
            &self.workshop.employees,
            &self.workshop.part_orders,
        );
        self.results_state
            .select(if self.results.is_empty() { None } else { Some(0) });
        tracing::debug!(query = %self.query, hits = self.results.len(), "dashboard search");
    }

    fn move_result(&mut self, forward: bool) {
        let len = self.results.len();
        if len == 0 {
            return;
        }
        let i = match self.results_state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.results_state.select(Some(i));
    }

    pub fn selected_hit(&self) -> Option<&SearchHit> {
        self.results_state.selected().and_then(|i| self.results.get(i))
    }
}

fn whole(amount: Decimal) -> u64 {
    amount.round().to_u64().unwrap_or(0)
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title = Paragraph::new(Spans::from(vec![
        Span::styled("FastFix Dashboard", Style::default().fg(Color::Cyan)),
        Span::raw(format!("   logged in as {}   ", state.username)),
        Span::styled(state.month.label(), Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_cards(frame, state, chunks[1]);
    render_charts(frame, state, chunks[2]);

    let query_style = if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let query = Paragraph::new(format!(
        "{}{}",
        state.query,
        if state.searching { "|" } else { "" }
    ))
    .style(query_style)
    .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(query, chunks[3]);

    let items: Vec<ListItem> = state
        .results
        .iter()
        .map(|hit| {
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{:<9}", hit.kind()), Style::default().fg(Color::Cyan)),
                Span::raw(hit.summary()),
            ]))
        })
        .collect();
    let results_title = if state.query.trim().is_empty() {
        "Results".to_string()
    } else {
        format!("Results ({})", state.results.len())
    };
    let results = List::new(items)
        .block(Block::default().title(results_title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(results, chunks[4], &mut state.results_state);

    let help_text = if state.searching {
        "Type to search | Up/Down - Select | Enter - Open | Esc - Stop searching"
    } else {
        "1 Vehicles | 2 Expenses | 3 Employees | 4 Part orders | 5 Account | / Search | [ ] Month | R Refresh | L Logout | Q Quit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[5]);
}

fn render_cards<B: Backend>(frame: &mut Frame<B>, state: &DashboardState, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(area);

    let figures = [
        ("Revenue", format!("AED {:.2}", state.summary.revenue), Color::Green),
        ("Expenses", format!("AED {:.2}", state.summary.expense), Color::Red),
        ("Vehicles", state.summary.vehicle_count.to_string(), Color::Cyan),
    ];
    for ((label, value, colour), area) in figures.into_iter().zip(cards.iter()) {
        let card = Paragraph::new(Spans::from(Span::styled(
            value,
            Style::default().fg(colour).add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().title(label).borders(Borders::ALL));
        frame.render_widget(card, *area);
    }
}

fn render_charts<B: Backend>(frame: &mut Frame<B>, state: &DashboardState, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let labels: [&str; 12] = MONTH_NAMES.map(|name| &name[..3]);
    let revenue: Vec<(&str, u64)> = labels
        .iter()
        .zip(state.series.revenue.iter())
        .map(|(label, amount)| (*label, whole(*amount)))
        .collect();
    let target: Vec<(&str, u64)> = labels
        .iter()
        .zip(state.series.target.iter())
        .map(|(label, amount)| (*label, whole(*amount)))
        .collect();

    let revenue_chart = BarChart::default()
        .block(
            Block::default()
                .title(format!("Revenue {}", state.series.year))
                .borders(Borders::ALL),
        )
        .data(&revenue)
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));
    frame.render_widget(revenue_chart, halves[0]);

    let target_chart = BarChart::default()
        .block(
            Block::default()
                .title(format!("Target {}", state.series.year))
                .borders(Borders::ALL),
        )
        .data(&target)
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    frame.render_widget(target_chart, halves[1]);
}

pub fn handle_key(state: &mut DashboardState, key: KeyCode) -> Option<DashboardAction> {
    if state.searching {
        match key {
            KeyCode::Esc => state.searching = false,
            KeyCode::Enter => {
                if let Some(hit) = state.selected_hit() {
                    return Some(DashboardAction::Open(hit.clone()));
                }
            }
            KeyCode::Up => state.move_result(false),
            KeyCode::Down => state.move_result(true),
            KeyCode::Char(c) => {
                state.query.push(c);
                state.run_search();
            }
            KeyCode::Backspace => {
                state.query.pop();
                state.run_search();
            }
            _ => {}
        }
        return None;
    }

    if handle_month_key(&mut state.month, key) {
        state.refresh_figures();
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(DashboardAction::Quit),
        KeyCode::Char('l') => return Some(DashboardAction::Logout),
        KeyCode::Char('r') => return Some(DashboardAction::Refresh),
        KeyCode::Char('1') => return Some(DashboardAction::Navigate(Section::Vehicles)),
        KeyCode::Char('2') => return Some(DashboardAction::Navigate(Section::Expenses)),
        KeyCode::Char('3') => return Some(DashboardAction::Navigate(Section::Employees)),
        KeyCode::Char('4') => return Some(DashboardAction::Navigate(Section::PartOrders)),
        KeyCode::Char('5') => return Some(DashboardAction::Navigate(Section::Account)),
        KeyCode::Char('/') => state.searching = true,
        KeyCode::Up => state.move_result(false),
        KeyCode::Down => state.move_result(true),
        KeyCode::Enter => {
            if let Some(hit) = state.selected_hit() {
                return Some(DashboardAction::Open(hit.clone()));
            }
        }
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wire::parse_date;
    use crate::models::{ServiceLine, Vehicle};
    use rust_decimal_macros::dec;

    fn workshop() -> Workshop {
        let oil = Vehicle {
            id: "v1".into(),
            customer_name: "Sara".into(),
            date: parse_date("2024-03-04"),
            due_amount: dec!(400),
            services: vec![ServiceLine {
                description: "Oil Change".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let brakes = Vehicle {
            id: "v2".into(),
            customer_name: "Omar".into(),
            date: parse_date("2024-04-10"),
            due_amount: dec!(100),
            ..Default::default()
        };
        Workshop {
            vehicles: vec![oil, brakes],
            ..Default::default()
        }
    }

    #[test]
    fn month_keys_move_the_summary() {
        let mut state = DashboardState::with_month("admin", workshop(), MonthKey::new(2024, 3));
        assert_eq!(state.summary.revenue, dec!(400));
        assert_eq!(state.series.target[3], dec!(500));

        handle_key(&mut state, KeyCode::Char(']'));
        assert_eq!(state.month(), MonthKey::new(2024, 4));
        assert_eq!(state.summary.revenue, dec!(100));
        assert_eq!(state.summary.vehicle_count, 1);
    }

    #[test]
    fn search_then_open_hit() {
        let mut state = DashboardState::with_month("admin", workshop(), MonthKey::new(2024, 3));
        handle_key(&mut state, KeyCode::Char('/'));
        for c in "oil".chars() {
            handle_key(&mut state, KeyCode::Char(c));
        }
        assert_eq!(state.results.len(), 1);
        match handle_key(&mut state, KeyCode::Enter) {
            Some(DashboardAction::Open(hit)) => assert_eq!(hit.id(), "v1"),
            _ => panic!("expected the vehicle hit to open"),
        }
    }
}
