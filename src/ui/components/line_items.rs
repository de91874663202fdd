use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::billing::{InvoiceDraft, LineField};

/// Editor for the priced rows of an [`InvoiceDraft`].
///
/// Browsing: Up/Down move, A adds, E edits, D deletes, R drops a manual VAT.
/// Editing walks the row's fields in order; Enter/Tab applies the field and
/// moves on, Esc abandons the field being typed.
pub struct LineItemsState {
    pub table_state: TableState,
    editing: Option<(usize, LineField, String)>,
    item_label: &'static str,
}

impl LineItemsState {
    pub fn new(item_label: &'static str, len: usize) -> Self {
        let mut table_state = TableState::default();
        if len > 0 {
            table_state.select(Some(0));
        }
        Self {
            table_state,
            editing: None,
            item_label,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = self.table_state.selected().map(|i| (i + 1) % len).unwrap_or(0);
        self.table_state.select(Some(i));
    }

    fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map(|i| if i == 0 { len - 1 } else { i - 1 })
            .unwrap_or(0);
        self.table_state.select(Some(i));
    }

    pub fn add_line(&mut self, draft: &mut InvoiceDraft) {
        let index = draft.add_line();
        self.table_state.select(Some(index));
        self.begin_edit(draft, index, LineField::Description);
    }

    pub fn edit_selected(&mut self, draft: &InvoiceDraft) {
        if let Some(index) = self.selected() {
            self.begin_edit(draft, index, LineField::Description);
        }
    }

    fn begin_edit(&mut self, draft: &InvoiceDraft, index: usize, field: LineField) {
        if let Some(line) = draft.lines().get(index) {
            self.editing = Some((index, field, line.field_text(field)));
        }
    }

    pub fn delete_selected(&mut self, draft: &mut InvoiceDraft) {
        let Some(index) = self.selected() else {
            return;
        };
        draft.remove_line(index);
        let len = draft.lines().len();
        if len == 0 {
            self.table_state.select(None);
        } else if index >= len {
            self.table_state.select(Some(len - 1));
        }
        self.editing = None;
    }

    pub fn reset_selected_vat(&mut self, draft: &mut InvoiceDraft) {
        if let Some(index) = self.selected() {
            draft.reset_line_vat(index);
        }
    }

    /// Apply the field being typed and move to the next one, finishing the
    /// row after the last field.
    pub fn commit_field(&mut self, draft: &mut InvoiceDraft) {
        if let Some((index, field, value)) = self.editing.take() {
            let unchanged = draft
                .lines()
                .get(index)
                .is_some_and(|line| line.field_text(field) == value);
            if !unchanged {
                draft.edit_line(index, field, &value);
            }
            if let Some(next) = field.next() {
                self.begin_edit(draft, index, next);
            }
        }
    }

    /// Route a key while the line editor has focus. Returns false when the
    /// key was not used so the caller can treat it (Esc leaves the editor).
    pub fn handle_key(&mut self, draft: &mut InvoiceDraft, key: KeyCode) -> bool {
        if let Some((_, _, value)) = self.editing.as_mut() {
            match key {
                KeyCode::Enter | KeyCode::Tab => self.commit_field(draft),
                KeyCode::Esc => self.editing = None,
                KeyCode::Char(c) => value.push(c),
                KeyCode::Backspace => {
                    value.pop();
                }
                _ => {}
            }
            return true;
        }

        let len = draft.lines().len();
        match key {
            KeyCode::Up => self.previous(len),
            KeyCode::Down => self.next(len),
            KeyCode::Char('a') => self.add_line(draft),
            KeyCode::Char('e') | KeyCode::Enter => self.edit_selected(draft),
            KeyCode::Char('d') => self.delete_selected(draft),
            KeyCode::Char('r') => self.reset_selected_vat(draft),
            _ => return false,
        }
        true
    }
}

pub fn render_line_items<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut LineItemsState,
    draft: &InvoiceDraft,
    area: Rect,
    focused: bool,
) {
    let header_cells = [state.item_label, "Unit Price", "Qty", "VAT", "Total"]
        .into_iter()
        .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let editing = state.editing.as_ref();
    let rows = draft.lines().iter().enumerate().map(|(i, line)| {
        let cell_text = |field: LineField, shown: String| match editing {
            Some((idx, f, value)) if *idx == i && *f == field => format!("{}|", value),
            _ => shown,
        };
        let vat = if line.vat_manually_set {
            format!("{:.2} (manual)", line.vat)
        } else {
            format!("{:.2}", line.vat)
        };
        Row::new(vec![
            Cell::from(cell_text(LineField::Description, line.description.clone())),
            Cell::from(cell_text(LineField::UnitPrice, format!("{:.2}", line.unit_price))),
            Cell::from(cell_text(LineField::Quantity, line.quantity.to_string())),
            Cell::from(cell_text(LineField::Vat, vat)),
            Cell::from(format!("{:.2}", line.sub_total)),
        ])
    });

    let title = match editing {
        Some((_, field, _)) => format!("Lines (editing {})", field.label()),
        None if focused => "Lines (selected)".to_string(),
        None => "Lines".to_string(),
    };
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(border_style))
        .highlight_style(if focused {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        })
        .widths(&[
            Constraint::Percentage(36),
            Constraint::Percentage(16),
            Constraint::Percentage(8),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ]);

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

/// Totals block shown under the lines.
pub fn render_totals<B: Backend>(frame: &mut Frame<B>, draft: &InvoiceDraft, area: Rect) {
    let totals = draft.totals();
    let completion = draft
        .completion_date()
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| "-".to_string());

    let status_style = match draft.status() {
        crate::models::WorkStatus::Done => Style::default().fg(Color::Green),
        crate::models::WorkStatus::Progress => Style::default().fg(Color::Yellow),
    };

    let text = vec![
        Spans::from(format!(
            "Total: AED {:.2}   Discount: AED {:.2}   Due: AED {:.2}",
            totals.total_amount,
            draft.discount(),
            totals.due_amount
        )),
        Spans::from(format!(
            "Paid: AED {:.2}   Pending: AED {:.2}",
            draft.paid_amount(),
            totals.pending_amount
        )),
        Spans::from(vec![
            Span::raw("Status: "),
            Span::styled(draft.status().as_str(), status_style.add_modifier(Modifier::BOLD)),
            Span::raw(format!("   Completed: {}", completion)),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(Block::default().title("Totals").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
