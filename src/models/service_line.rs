use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wire;

/// One priced row on a work order or part order.
///
/// Serializes with the vehicle-service field names; part orders go through
/// [`part_lines`] which renames `serviceType` to `item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    #[serde(rename = "serviceType", default, deserialize_with = "wire::text::deserialize")]
    pub description: String,
    #[serde(rename = "amount", default, with = "wire::amount")]
    pub unit_price: Decimal,
    #[serde(default = "default_quantity", with = "wire::quantity")]
    pub quantity: i64,
    #[serde(default, with = "wire::amount")]
    pub vat: Decimal,
    #[serde(default)]
    pub vat_manually_set: bool,
    #[serde(rename = "totalPrice", default, with = "wire::amount")]
    pub sub_total: Decimal,
}

fn default_quantity() -> i64 {
    1
}

impl Default for ServiceLine {
    fn default() -> Self {
        Self {
            description: String::new(),
            unit_price: Decimal::ZERO,
            quantity: default_quantity(),
            vat: Decimal::ZERO,
            vat_manually_set: false,
            sub_total: Decimal::ZERO,
        }
    }
}

/// `#[serde(with = "part_lines")]` for `Vec<ServiceLine>` stored under part-order names.
pub mod part_lines {
    use super::*;
    use serde::{Deserializer, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct PartRow {
        #[serde(default, deserialize_with = "wire::text::deserialize")]
        item: String,
        #[serde(default, with = "wire::amount")]
        amount: Decimal,
        #[serde(default = "default_quantity", with = "wire::quantity")]
        quantity: i64,
        #[serde(default, with = "wire::amount")]
        vat: Decimal,
        #[serde(default)]
        vat_manually_set: bool,
        #[serde(default, with = "wire::amount")]
        total_price: Decimal,
    }

    pub fn serialize<S: Serializer>(lines: &[ServiceLine], serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<PartRow> = lines
            .iter()
            .map(|line| PartRow {
                item: line.description.clone(),
                amount: line.unit_price,
                quantity: line.quantity,
                vat: line.vat,
                vat_manually_set: line.vat_manually_set,
                total_price: line.sub_total,
            })
            .collect();
        rows.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ServiceLine>, D::Error> {
        let rows = Option::<Vec<PartRow>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(rows
            .into_iter()
            .map(|row| ServiceLine {
                description: row.item,
                unit_price: row.amount,
                quantity: row.quantity,
                vat: row.vat,
                vat_manually_set: row.vat_manually_set,
                sub_total: row.total_price,
            })
            .collect())
    }
}
