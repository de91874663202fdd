use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "expense", default, deserialize_with = "wire::text::deserialize")]
    pub description: String,
    #[serde(default, with = "wire::amount")]
    pub amount: Decimal,
}
