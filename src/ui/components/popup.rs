use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// A blocking message shown over the current screen until a key is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            is_error: true,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: false,
        }
    }
}

pub fn render_alert<B: Backend>(frame: &mut Frame<B>, alert: &Alert) {
    let popup_area = centered_rect(60, 30, frame.size());
    let colour = if alert.is_error { Color::Red } else { Color::Green };

    let mut lines = vec![Spans::from("")];
    lines.extend(alert.message.lines().map(|line| Spans::from(line.to_string())));
    lines.push(Spans::from(""));
    lines.push(Spans::from("Press any key to continue"));

    let popup = Paragraph::new(lines)
        .block(Block::default().title(alert.title.as_str()).borders(Borders::ALL))
        .style(Style::default().fg(colour).bg(Color::Black))
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

pub fn render_confirm<B: Backend>(frame: &mut Frame<B>, title: &str, message: &str) {
    let popup_area = centered_rect(50, 20, frame.size());

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(message.to_string()),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title(title).borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black))
    .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
