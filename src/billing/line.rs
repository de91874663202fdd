//! Per-row VAT and subtotal calculation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::models::ServiceLine;
use crate::models::wire::{parse_amount, parse_quantity};

/// VAT rate applied to automatically computed lines.
pub const VAT_RATE: Decimal = dec!(0.05);

/// Shop price list used to prefill a service's unit price.
pub const SERVICE_PRESETS: [(&str, Decimal); 5] = [
    ("Oil Change", dec!(300)),
    ("Tire Rotation", dec!(200)),
    ("Brake Inspection", dec!(150)),
    ("Battery Check", dec!(100)),
    ("Engine Tune-up", dec!(500)),
];

/// The editable columns of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Description,
    UnitPrice,
    Quantity,
    Vat,
}

impl LineField {
    pub const ALL: [LineField; 4] = [
        LineField::Description,
        LineField::UnitPrice,
        LineField::Quantity,
        LineField::Vat,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LineField::Description => "Description",
            LineField::UnitPrice => "Unit Price",
            LineField::Quantity => "Quantity",
            LineField::Vat => "VAT",
        }
    }

    pub fn next(&self) -> Option<LineField> {
        match self {
            LineField::Description => Some(LineField::UnitPrice),
            LineField::UnitPrice => Some(LineField::Quantity),
            LineField::Quantity => Some(LineField::Vat),
            LineField::Vat => None,
        }
    }
}

/// `round(0.05 * unit_price * quantity, 2)`.
pub fn auto_vat(unit_price: Decimal, quantity: i64) -> Decimal {
    (VAT_RATE * unit_price * Decimal::from(quantity))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn preset_price(description: &str) -> Option<Decimal> {
    let wanted = description.trim();
    SERVICE_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, price)| *price)
}

impl ServiceLine {
    /// Blank row with quantity 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute `vat` (unless overridden) and `sub_total` from the current fields.
    pub fn recompute(&mut self) {
        if !self.vat_manually_set {
            self.vat = auto_vat(self.unit_price, self.quantity);
        }
        self.sub_total = self.unit_price * Decimal::from(self.quantity) + self.vat;
    }

    /// Apply a raw text edit to one field and recompute the derived values.
    pub fn apply_edit(&mut self, field: LineField, input: &str) {
        match field {
            LineField::Description => {
                self.description = input.to_string();
                if let Some(price) = preset_price(input) {
                    self.unit_price = price;
                }
            }
            LineField::UnitPrice => self.unit_price = parse_amount(input),
            LineField::Quantity => self.quantity = parse_quantity(input),
            LineField::Vat => {
                self.vat = parse_amount(input);
                self.vat_manually_set = true;
            }
        }
        self.recompute();
    }

    /// Drop a manual VAT override and go back to the computed rate.
    pub fn reset_vat(&mut self) {
        self.vat_manually_set = false;
        self.recompute();
    }

    /// Current text of a field, as shown in an edit box.
    pub fn field_text(&self, field: LineField) -> String {
        match field {
            LineField::Description => self.description.clone(),
            LineField::UnitPrice => self.unit_price.normalize().to_string(),
            LineField::Quantity => self.quantity.to_string(),
            LineField::Vat => self.vat.normalize().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: &str) -> ServiceLine {
        let mut line = ServiceLine::new();
        line.apply_edit(LineField::UnitPrice, price);
        line.apply_edit(LineField::Quantity, quantity);
        line
    }

    #[test]
    fn vat_follows_price_and_quantity() {
        let line = line("100", "2");
        assert_eq!(line.vat, dec!(10));
        assert_eq!(line.sub_total, dec!(210));
    }

    #[test]
    fn vat_rounds_to_cents() {
        let line = line("33.33", "1");
        // 1.6665 rounds half away from zero
        assert_eq!(line.vat, dec!(1.67));
        assert_eq!(line.sub_total, dec!(35.00));
    }

    #[test]
    fn manual_vat_survives_price_changes() {
        let mut line = line("100", "2");
        line.apply_edit(LineField::Vat, "3");
        assert!(line.vat_manually_set);
        assert_eq!(line.sub_total, dec!(203));

        line.apply_edit(LineField::UnitPrice, "50");
        assert_eq!(line.vat, dec!(3));
        assert_eq!(line.sub_total, dec!(103));

        line.reset_vat();
        assert!(!line.vat_manually_set);
        assert_eq!(line.vat, dec!(5));
        assert_eq!(line.sub_total, dec!(105));
    }

    #[test]
    fn zero_quantity_leaves_only_vat() {
        let mut line = line("100", "0");
        assert_eq!(line.sub_total, dec!(0));

        line.apply_edit(LineField::Vat, "4.5");
        assert_eq!(line.sub_total, dec!(4.5));
    }

    #[test]
    fn garbage_input_reads_as_zero() {
        let line = line("abc", "");
        assert_eq!(line.unit_price, Decimal::ZERO);
        assert_eq!(line.quantity, 0);
        assert_eq!(line.sub_total, Decimal::ZERO);
    }

    #[test]
    fn preset_descriptions_fill_price() {
        let mut line = ServiceLine::new();
        line.apply_edit(LineField::Description, "oil change");
        assert_eq!(line.unit_price, dec!(300));
        assert_eq!(line.vat, dec!(15));
        assert_eq!(line.sub_total, dec!(315));

        line.apply_edit(LineField::Description, "Custom welding");
        assert_eq!(line.unit_price, dec!(300));
    }

    #[test]
    fn subtotal_identity_holds_for_a_grid() {
        for price in ["0", "0.01", "19.99", "250", "1234.56"] {
            for quantity in 0..5 {
                let line = line(price, &quantity.to_string());
                assert_eq!(line.vat, auto_vat(line.unit_price, quantity));
                assert_eq!(
                    line.sub_total,
                    line.unit_price * Decimal::from(quantity) + line.vat
                );
            }
        }
    }
}
