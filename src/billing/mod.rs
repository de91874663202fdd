//! Client-side invoice arithmetic and reporting.

pub mod invoice;
pub mod line;
pub mod monthly;
pub mod search;

pub use invoice::{InvoiceDraft, Totals};
pub use line::{LineField, auto_vat};
pub use monthly::{MonthKey, MonthSummary, YearSeries};
pub use search::{SearchHit, search};
