mod employee;
mod expense;
mod part_order;
mod service_line;
mod user;
mod vehicle;
pub mod wire;

use serde::{Deserialize, Serialize};

pub use employee::{EmiratesId, Employee, Passport, WorkDetails};
pub use expense::Expense;
pub use part_order::PartOrder;
pub use service_line::{ServiceLine, part_lines};
pub use user::{Credentials, LoginResponse, Registration, User};
pub use vehicle::{PAYMENT_METHODS, Vehicle};

/// Work status of an invoice, settled or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkStatus {
    #[default]
    Progress,
    Done,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Progress => "PROGRESS",
            WorkStatus::Done => "DONE",
        }
    }
}

// Anything other than "done" reads as in progress.
impl<'de> Deserialize<'de> for WorkStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("done") => WorkStatus::Done,
            _ => WorkStatus::Progress,
        })
    }
}
