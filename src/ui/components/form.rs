use chrono::NaiveDate;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::ui::components::date_input::DateInputState;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FieldKind {
    Text,
    /// Masked on screen.
    Secret,
    /// Non-negative decimal.
    Amount,
    /// `YYYY-MM-DD`, edited with [`DateInputState`]. Delete clears it.
    Date,
    /// Enter/Left/Right cycle through the options instead of typing.
    Choice(&'static [&'static str]),
}

#[derive(Clone, Debug)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub required: bool,
}

impl FormField {
    pub fn text(label: &'static str) -> Self {
        Self::of(label, FieldKind::Text)
    }

    pub fn secret(label: &'static str) -> Self {
        Self::of(label, FieldKind::Secret)
    }

    pub fn amount(label: &'static str) -> Self {
        Self::of(label, FieldKind::Amount)
    }

    pub fn date(label: &'static str) -> Self {
        Self::of(label, FieldKind::Date)
    }

    pub fn choice(label: &'static str, options: &'static [&'static str]) -> Self {
        let mut field = Self::of(label, FieldKind::Choice(options));
        field.value = options.first().map(|o| o.to_string()).unwrap_or_default();
        field
    }

    fn of(label: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            kind,
            value: String::new(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            FieldKind::Choice(_) => format!("< {} >", self.value),
            _ => self.value.clone(),
        }
    }
}

/// A vertical list of labelled fields with one field under the cursor.
pub struct FormState {
    pub fields: Vec<FormField>,
    pub current_field: usize,
    pub editing: bool,
    date_state: Option<DateInputState>,
}

impl FormState {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            current_field: 0,
            editing: false,
            date_state: None,
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value.into();
        }
    }

    pub fn date_value(&self, index: usize) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.value(index), "%Y-%m-%d").ok()
    }

    fn current(&self) -> Option<&FormField> {
        self.fields.get(self.current_field)
    }

    pub fn current_kind(&self) -> Option<FieldKind> {
        self.current().map(|f| f.kind)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.current_field = (self.current_field + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.current_field = (self.current_field + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Start or finish editing the current field. Choice fields never enter
    /// edit mode; they advance to the next option instead.
    pub fn toggle_editing(&mut self) {
        match self.current_kind() {
            Some(FieldKind::Choice(_)) => self.cycle_choice(true),
            Some(FieldKind::Date) => {
                if self.editing {
                    if let Some(date) = self.date_state.take() {
                        let text = date.date.format("%Y-%m-%d").to_string();
                        self.set_value(self.current_field, text);
                    }
                    self.editing = false;
                } else {
                    let start = self
                        .date_value(self.current_field)
                        .unwrap_or_else(|| chrono::Local::now().date_naive());
                    self.date_state = Some(DateInputState::new(start));
                    self.editing = true;
                }
            }
            Some(_) => self.editing = !self.editing,
            None => {}
        }
    }

    /// Leave edit mode. Text edits are already applied; a date in progress is dropped.
    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.date_state = None;
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        let index = self.current_field;
        let Some(field) = self.fields.get_mut(index) else {
            return;
        };
        if let FieldKind::Choice(options) = field.kind {
            if options.is_empty() {
                return;
            }
            let position = options.iter().position(|o| *o == field.value).unwrap_or(0);
            let next = if forward {
                (position + 1) % options.len()
            } else {
                (position + options.len() - 1) % options.len()
            };
            field.value = options[next].to_string();
        }
    }

    /// Clear an optional date field.
    pub fn clear_current(&mut self) {
        let index = self.current_field;
        if let Some(field) = self.fields.get_mut(index) {
            if field.kind == FieldKind::Date && !field.required {
                field.value.clear();
            }
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        if let Some(date) = self.date_state.as_mut() {
            date.handle_input(key);
            return;
        }

        let index = self.current_field;
        let Some(field) = self.fields.get_mut(index) else {
            return;
        };
        match key {
            KeyCode::Char(c) => {
                let accepted = match field.kind {
                    FieldKind::Amount => c.is_ascii_digit() || (c == '.' && !field.value.contains('.')),
                    _ => true,
                };
                if accepted {
                    field.value.push(c);
                }
            }
            KeyCode::Backspace => {
                field.value.pop();
            }
            _ => {}
        }
    }

    /// Labels of required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.value.trim().is_empty())
            .map(|f| f.label)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

pub fn render_form<B: Backend>(frame: &mut Frame<B>, state: &FormState, area: Rect, title: &str) {
    let items: Vec<ListItem> = state
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let marker = if field.required { "*" } else { "" };
            let name = format!("{}{}: ", field.label, marker);
            let content = if i == state.current_field && state.editing {
                let value = match &state.date_state {
                    Some(date) => date.get_display_string(),
                    None => format!("{}|", field.display()),
                };
                Spans::from(vec![
                    Span::styled(name, Style::default().fg(Color::Yellow)),
                    Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
                ])
            } else {
                let style = if i == state.current_field {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![Span::styled(name, style), Span::raw(field.display())])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(form_list, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: &[&str] = &["Cash", "Card"];

    fn form() -> FormState {
        FormState::new(vec![
            FormField::text("Name").required(),
            FormField::amount("Amount"),
            FormField::choice("Method", METHODS),
            FormField::date("Expiry"),
        ])
    }

    #[test]
    fn amount_fields_accept_one_decimal_point() {
        let mut state = form();
        state.next_field();
        state.toggle_editing();
        for c in "12.5.0x".chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
        assert_eq!(state.value(1), "12.50");
    }

    #[test]
    fn choice_cycles_without_editing() {
        let mut state = form();
        state.current_field = 2;
        assert_eq!(state.value(2), "Cash");
        state.toggle_editing();
        assert!(!state.editing);
        assert_eq!(state.value(2), "Card");
        state.cycle_choice(true);
        assert_eq!(state.value(2), "Cash");
    }

    #[test]
    fn date_edit_commits_iso_text() {
        let mut state = form();
        state.current_field = 3;
        state.set_value(3, "2024-05-01");
        state.toggle_editing();
        for c in "2026".chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
        state.toggle_editing();
        assert_eq!(state.value(3), "2026-05-01");

        state.clear_current();
        assert_eq!(state.date_value(3), None);
    }

    #[test]
    fn required_fields_are_reported() {
        let mut state = form();
        assert_eq!(state.missing_fields(), vec!["Name"]);
        state.set_value(0, "Ali");
        assert!(state.is_valid());
    }
}
