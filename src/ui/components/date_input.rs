use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Digit-by-digit editor for one calendar date.
///
/// Digits fill the active part (four for the year, two for month and day);
/// Left/Right switch parts. A part that would produce an invalid date is
/// ignored.
pub struct DateInputState {
    pub date: NaiveDate,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            date_part: DatePart::Year,
            current_date_input: String::new(),
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_date_input.push(c);
                let wanted = match self.date_part {
                    DatePart::Year => 4,
                    DatePart::Month | DatePart::Day => 2,
                };
                if self.current_date_input.len() == wanted {
                    self.commit_part();
                    self.current_date_input.clear();
                }
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn commit_part(&mut self) {
        let Ok(value) = self.current_date_input.parse::<u32>() else {
            return;
        };
        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());

        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => {
                clamped(value as i32, month, day)
            }
            DatePart::Month if (1..=12).contains(&value) => clamped(year, value, day),
            DatePart::Day => NaiveDate::from_ymd_opt(year, month, value),
            _ => None,
        };
        if let Some(date) = candidate {
            self.date = date;
            if self.date_part != DatePart::Day {
                self.next_date_part();
            }
        }
    }

    pub fn get_display_string(&self) -> String {
        let year = format!("{:04}", self.date.year());
        let month = format!("{:02}", self.date.month());
        let day = format!("{:02}", self.date.day());

        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }
}

// Keep the day inside the target month (31 January -> February gives the 28th/29th).
fn clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_a_full_date() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        type_digits(&mut state, "2025");
        assert_eq!(state.date_part, DatePart::Month);
        type_digits(&mut state, "03");
        type_digits(&mut state, "09");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
    }

    #[test]
    fn month_change_clamps_day() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        state.next_date_part();
        type_digits(&mut state, "02");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn invalid_day_is_ignored() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
        state.previous_date_part();
        type_digits(&mut state, "30");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
        assert!(state.get_display_string().ends_with("[DD]"));
    }
}
