use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ServiceLine, WorkStatus, wire};

/// Accepted payment methods, in the order the wizard cycles through them.
pub const PAYMENT_METHODS: [&str; 4] = ["Cash", "Credit Card", "Debit Card", "Bank Transfer"];

/// A customer vehicle work order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::text::deserialize", skip_serializing_if = "String::is_empty")]
    pub vehicle_id: String,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub vehicle_reg_no: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub brand: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub vehicle_model: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub mileage: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub payment_method: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub vehicle_analysis: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub spare_parts: String,
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    #[serde(default, with = "wire::amount")]
    pub discount: Decimal,
    #[serde(default, with = "wire::amount")]
    pub paid_amount: Decimal,
    #[serde(default, with = "wire::amount")]
    pub total_amount: Decimal,
    #[serde(default, with = "wire::amount")]
    pub due_amount: Decimal,
    #[serde(default, with = "wire::amount")]
    pub pending_amount: Decimal,
    #[serde(default)]
    pub status_of_work: WorkStatus,
    #[serde(default, with = "wire::day")]
    pub completion_date: Option<NaiveDate>,
}

impl Vehicle {
    /// Brand and model joined for list display.
    pub fn brand_and_model(&self) -> String {
        format!("{} {}", self.brand, self.vehicle_model).trim().to_string()
    }
}
