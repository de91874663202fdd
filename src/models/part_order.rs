use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ServiceLine, WorkStatus, part_lines, wire};

/// A spare-parts order placed with a supplier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartOrder {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub supplier: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub target_vehicle: String,
    #[serde(default, with = "part_lines")]
    pub parts: Vec<ServiceLine>,
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

impl PartOrder {
    /// Plain-text item list, one `item: quantity` per line.
    pub fn item_list(&self) -> String {
        self.parts
            .iter()
            .map(|part| format!("{}: {}", part.description, part.quantity))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `wa.me` link that opens a chat with the supplier prefilled with the item list.
    pub fn whatsapp_link(&self) -> String {
        let number: String = self.phone.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("https://wa.me/{}?text={}", number, urlencoding::encode(&self.item_list()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parts_use_item_field_names() {
        let json = r#"{
            "_id": "p1",
            "supplier": "Gulf Spares",
            "phone": 971500000000,
            "parts": [{"item": "Brake Pad", "amount": "45.5", "quantity": 2, "totalPrice": 91}]
        }"#;
        let order: PartOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.phone, "971500000000");
        assert_eq!(order.parts[0].description, "Brake Pad");
        assert_eq!(order.parts[0].unit_price, dec!(45.5));

        let back = serde_json::to_value(&order).unwrap();
        assert_eq!(back["parts"][0]["item"], "Brake Pad");
        assert!(back["parts"][0].get("serviceType").is_none());
    }

    #[test]
    fn whatsapp_link_encodes_item_list() {
        let order = PartOrder {
            phone: "+971 50 123".into(),
            parts: vec![
                ServiceLine { description: "Oil Filter".into(), quantity: 2, ..Default::default() },
                ServiceLine { description: "Wiper".into(), quantity: 1, ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(
            order.whatsapp_link(),
            "https://wa.me/97150123?text=Oil%20Filter%3A%202%0AWiper%3A%201"
        );
    }

    #[test]
    fn whatsapp_link_escapes_reserved_characters() {
        let order = PartOrder {
            phone: "0501".into(),
            parts: vec![ServiceLine { description: "Belt A/C & Fan?".into(), quantity: 1, ..Default::default() }],
            ..Default::default()
        };
        assert_eq!(
            order.whatsapp_link(),
            "https://wa.me/0501?text=Belt%20A%2FC%20%26%20Fan%3F%3A%201"
        );
    }
}
