//! Invoice totals for work orders and part orders.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::billing::line::LineField;
use crate::models::wire::parse_amount;
use crate::models::{PartOrder, ServiceLine, Vehicle, WorkStatus};

/// Derived amounts of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub total_amount: Decimal,
    pub due_amount: Decimal,
    pub pending_amount: Decimal,
}

impl Totals {
    /// Sum the (already recomputed) lines, then take off discount, then payment.
    pub fn compute(lines: &[ServiceLine], discount: Decimal, paid_amount: Decimal) -> Self {
        let total_amount: Decimal = lines.iter().map(|line| line.sub_total).sum();
        let due_amount = total_amount - discount;
        let pending_amount = due_amount - paid_amount;
        Self {
            total_amount,
            due_amount,
            pending_amount,
        }
    }

    pub fn status(&self) -> WorkStatus {
        if self.pending_amount.is_zero() && self.total_amount > Decimal::ZERO {
            WorkStatus::Done
        } else {
            WorkStatus::Progress
        }
    }
}

/// An invoice being edited in a form.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    lines: Vec<ServiceLine>,
    discount: Decimal,
    paid_amount: Decimal,
    totals: Totals,
    status: WorkStatus,
    completion_date: Option<NaiveDate>,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceDraft {
    /// Fresh invoice with a single empty line.
    pub fn new() -> Self {
        Self::from_parts(vec![ServiceLine::new()], Decimal::ZERO, Decimal::ZERO, None)
    }

    /// Rebuild a draft from stored values. The stored completion date is kept.
    pub fn from_parts(
        lines: Vec<ServiceLine>,
        discount: Decimal,
        paid_amount: Decimal,
        completion_date: Option<NaiveDate>,
    ) -> Self {
        let mut draft = Self {
            lines,
            discount,
            paid_amount,
            totals: Totals::default(),
            status: WorkStatus::Progress,
            completion_date,
        };
        draft.recompute_on(completion_date.unwrap_or_else(today));
        draft
    }

    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self::from_parts(
            vehicle.services.clone(),
            vehicle.discount,
            vehicle.paid_amount,
            vehicle.completion_date,
        )
    }

    pub fn from_part_order(order: &PartOrder) -> Self {
        Self::from_parts(
            order.parts.clone(),
            order.discount,
            order.paid_amount,
            order.completion_date,
        )
    }

    pub fn lines(&self) -> &[ServiceLine] {
        &self.lines
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn paid_amount(&self) -> Decimal {
        self.paid_amount
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn status(&self) -> WorkStatus {
        self.status
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_date
    }

    pub fn add_line(&mut self) -> usize {
        self.lines.push(ServiceLine::new());
        self.recompute();
        self.lines.len() - 1
    }

    pub fn remove_line(&mut self, index: usize) -> Option<ServiceLine> {
        if index >= self.lines.len() {
            return None;
        }
        let removed = self.lines.remove(index);
        self.recompute();
        Some(removed)
    }

    pub fn edit_line(&mut self, index: usize, field: LineField, input: &str) {
        if let Some(line) = self.lines.get_mut(index) {
            line.apply_edit(field, input);
            self.recompute();
        }
    }

    pub fn reset_line_vat(&mut self, index: usize) {
        if let Some(line) = self.lines.get_mut(index) {
            line.reset_vat();
            self.recompute();
        }
    }

    pub fn set_discount(&mut self, input: &str) {
        self.discount = parse_amount(input);
        self.recompute();
    }

    pub fn set_paid_amount(&mut self, input: &str) {
        self.paid_amount = parse_amount(input);
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.recompute_on(today());
    }

    /// Recompute lines, totals and status. `on` is the date recorded if the
    /// invoice becomes settled and has no completion date yet.
    pub fn recompute_on(&mut self, on: NaiveDate) {
        for line in &mut self.lines {
            line.recompute();
        }
        self.totals = Totals::compute(&self.lines, self.discount, self.paid_amount);
        self.status = self.totals.status();
        if self.status == WorkStatus::Done && self.completion_date.is_none() {
            self.completion_date = Some(on);
        }
    }

    /// Copy lines and derived amounts onto a work order before submission.
    pub fn write_to_vehicle(&self, vehicle: &mut Vehicle) {
        vehicle.services = self.lines.clone();
        vehicle.discount = self.discount;
        vehicle.paid_amount = self.paid_amount;
        vehicle.total_amount = self.totals.total_amount;
        vehicle.due_amount = self.totals.due_amount;
        vehicle.pending_amount = self.totals.pending_amount;
        vehicle.status_of_work = self.status;
        vehicle.completion_date = self.completion_date;
    }

    pub fn write_to_part_order(&self, order: &mut PartOrder) {
        order.parts = self.lines.clone();
        order.discount = self.discount;
        order.paid_amount = self.paid_amount;
        order.total_amount = self.totals.total_amount;
        order.due_amount = self.totals.due_amount;
        order.pending_amount = self.totals.pending_amount;
        order.status_of_work = self.status;
        order.completion_date = self.completion_date;
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
