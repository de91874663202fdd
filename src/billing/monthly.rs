//! Month/year bucketing for the dashboard and the month-filtered lists.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{Expense, PartOrder, Vehicle};

/// Growth applied to last month's revenue to get this month's target.
pub const TARGET_GROWTH: Decimal = dec!(1.25);

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// A record that belongs to a calendar month and carries an amount.
pub trait MonthlyRecord {
    fn recorded_at(&self) -> Option<DateTime<Utc>>;
    fn amount(&self) -> Decimal;
}

impl MonthlyRecord for Vehicle {
    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.due_amount
    }
}

impl MonthlyRecord for PartOrder {
    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.due_amount
    }
}

impl MonthlyRecord for Expense {
    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

/// A selected month; `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }

    pub fn current() -> Self {
        let now = Local::now();
        Self::new(now.year(), now.month())
    }

    /// Whether `at` falls in this month on the local calendar.
    pub fn contains(&self, at: Option<DateTime<Utc>>) -> bool {
        self.contains_in(at, &Local)
    }

    pub fn contains_in<Tz: TimeZone>(&self, at: Option<DateTime<Utc>>, tz: &Tz) -> bool {
        at.map(|dt| {
            let local = dt.with_timezone(tz);
            local.year() == self.year && local.month() == self.month
        })
        .unwrap_or(false)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

/// Records dated in `key`, in their original order.
pub fn in_month<T: MonthlyRecord>(records: &[T], key: MonthKey) -> Vec<&T> {
    records
        .iter()
        .filter(|record| key.contains(record.recorded_at()))
        .collect()
}

pub fn sum_amounts<'a, T: MonthlyRecord + 'a>(records: impl IntoIterator<Item = &'a T>) -> Decimal {
    records.into_iter().map(|record| record.amount()).sum()
}

/// Revenue and target per month of one year. Index 0 is January.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSeries {
    pub year: i32,
    pub revenue: [Decimal; 12],
    pub target: [Decimal; 12],
}

impl YearSeries {
    pub fn compute<T: MonthlyRecord>(invoices: &[T], year: i32) -> Self {
        Self::compute_in(invoices, year, &Local)
    }

    /// Bucket by the calendar of `tz`.
    pub fn compute_in<T: MonthlyRecord, Tz: TimeZone>(invoices: &[T], year: i32, tz: &Tz) -> Self {
        let mut revenue = [Decimal::ZERO; 12];
        for invoice in invoices {
            if let Some(at) = invoice.recorded_at() {
                let local = at.with_timezone(tz);
                if local.year() == year {
                    revenue[local.month0() as usize] += invoice.amount();
                }
            }
        }

        let mut target = [Decimal::ZERO; 12];
        for month in 1..12 {
            target[month] = revenue[month - 1] * TARGET_GROWTH;
        }

        Self {
            year,
            revenue,
            target,
        }
    }
}

/// Figures for the dashboard's summary cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthSummary {
    pub revenue: Decimal,
    pub expense: Decimal,
    pub vehicle_count: usize,
}

impl MonthSummary {
    pub fn compute(vehicles: &[Vehicle], expenses: &[Expense], key: MonthKey) -> Self {
        let month_vehicles = in_month(vehicles, key);
        Self {
            revenue: sum_amounts(month_vehicles.iter().copied()),
            expense: sum_amounts(in_month(expenses, key)),
            vehicle_count: month_vehicles.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wire::parse_date;
    use chrono::FixedOffset;

    fn vehicle(date: &str, due: Decimal) -> Vehicle {
        Vehicle {
            date: parse_date(date),
            due_amount: due,
            ..Default::default()
        }
    }

    fn expense(date: &str, amount: Decimal) -> Expense {
        Expense {
            date: parse_date(date),
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn targets_trail_previous_month() {
        let vehicles = vec![
            vehicle("2024-01-10", dec!(1000)),
            vehicle("2024-01-20", dec!(200)),
            vehicle("2024-02-03", dec!(400)),
            vehicle("2024-04-30T23:59:00Z", dec!(80)),
            vehicle("2023-12-31", dec!(9999)),
            vehicle("", dec!(5)),
        ];
        let series = YearSeries::compute_in(&vehicles, 2024, &Utc);

        assert_eq!(series.revenue[0], dec!(1200));
        assert_eq!(series.revenue[1], dec!(400));
        assert_eq!(series.revenue[2], Decimal::ZERO);
        assert_eq!(series.revenue[3], dec!(80));

        assert_eq!(series.target[0], Decimal::ZERO);
        assert_eq!(series.target[1], dec!(1500));
        assert_eq!(series.target[2], dec!(500));
        assert_eq!(series.target[3], Decimal::ZERO);
        assert_eq!(series.target[4], dec!(100));
        for i in 1..12 {
            assert_eq!(series.target[i], series.revenue[i - 1] * TARGET_GROWTH);
        }
    }

    #[test]
    fn month_summary_counts_only_selected_month() {
        let vehicles = vec![
            vehicle("2024-03-05T12:00:00Z", dec!(300)),
            vehicle("2024-03-15T12:00:00Z", dec!(150.5)),
            vehicle("2024-04-10T12:00:00Z", dec!(999)),
        ];
        let expenses = vec![
            expense("2024-03-12T12:00:00Z", dec!(40)),
            expense("2025-03-12T12:00:00Z", dec!(60)),
        ];
        let summary = MonthSummary::compute(&vehicles, &expenses, MonthKey::new(2024, 3));
        assert_eq!(summary.revenue, dec!(450.5));
        assert_eq!(summary.expense, dec!(40));
        assert_eq!(summary.vehicle_count, 2);
    }

    #[test]
    fn late_evening_utc_counts_in_the_local_next_month() {
        let dubai = FixedOffset::east_opt(4 * 3600).unwrap();
        let vehicles = vec![vehicle("2024-04-30T21:00:00.000Z", dec!(100))];

        assert!(MonthKey::new(2024, 5).contains_in(vehicles[0].date, &dubai));
        assert!(!MonthKey::new(2024, 4).contains_in(vehicles[0].date, &dubai));
        assert!(MonthKey::new(2024, 4).contains_in(vehicles[0].date, &Utc));

        let series = YearSeries::compute_in(&vehicles, 2024, &dubai);
        assert_eq!(series.revenue[3], Decimal::ZERO);
        assert_eq!(series.revenue[4], dec!(100));
        assert_eq!(series.target[5], dec!(125));
    }

    #[test]
    fn midnight_on_the_first_belongs_to_the_new_month() {
        let first = parse_date("2024-05-01T00:00:00Z");
        assert!(MonthKey::new(2024, 5).contains_in(first, &Utc));
        assert!(!MonthKey::new(2024, 4).contains_in(first, &Utc));

        let one_second_before = parse_date("2024-04-30T23:59:59Z");
        assert!(MonthKey::new(2024, 4).contains_in(one_second_before, &Utc));

        // West of UTC the same instant is still April.
        let azores = FixedOffset::west_opt(3600).unwrap();
        assert!(MonthKey::new(2024, 4).contains_in(first, &azores));
    }

    #[test]
    fn year_boundary_follows_the_local_calendar() {
        let dubai = FixedOffset::east_opt(4 * 3600).unwrap();
        let new_year = vec![vehicle("2023-12-31T22:30:00Z", dec!(70))];
        assert_eq!(YearSeries::compute_in(&new_year, 2023, &dubai).revenue[11], Decimal::ZERO);
        assert_eq!(YearSeries::compute_in(&new_year, 2024, &dubai).revenue[0], dec!(70));
        assert!(MonthKey::new(2024, 1).contains_in(new_year[0].date, &dubai));
    }

    #[test]
    fn month_key_wraps_years() {
        let december = MonthKey::new(2023, 12);
        assert_eq!(december.next(), MonthKey::new(2024, 1));
        assert_eq!(MonthKey::new(2024, 1).previous(), december);
        assert_eq!(december.label(), "December 2023");
    }
}
