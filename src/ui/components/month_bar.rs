use crossterm::event::KeyCode;
use rust_decimal::Decimal;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::billing::MonthKey;

/// `[` and `]` step the month back and forward. Returns true if it moved.
pub fn handle_month_key(month: &mut MonthKey, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('[') => *month = month.previous(),
        KeyCode::Char(']') => *month = month.next(),
        _ => return false,
    }
    true
}

/// One-line month selector followed by labelled totals for that month.
pub fn render_month_bar<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    month: MonthKey,
    totals: &[(&str, Decimal)],
) {
    let mut spans = vec![
        Span::raw("[ "),
        Span::styled(month.label(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" ]"),
    ];
    for (label, amount) in totals {
        spans.push(Span::raw(format!("   {}: ", label)));
        spans.push(Span::styled(
            format!("AED {:.2}", amount),
            Style::default().fg(Color::Yellow),
        ));
    }

    let bar = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}
