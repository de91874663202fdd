//! Free-text search across every record kind.

use crate::models::{Employee, Expense, PartOrder, Vehicle};

/// One search result, tagged with the kind of record it came from.
#[derive(Debug, Clone)]
pub enum SearchHit {
    Vehicle(Vehicle),
    Expense(Expense),
    Employee(Employee),
    Order(PartOrder),
}

impl SearchHit {
    pub fn kind(&self) -> &'static str {
        match self {
            SearchHit::Vehicle(_) => "vehicle",
            SearchHit::Expense(_) => "expense",
            SearchHit::Employee(_) => "employee",
            SearchHit::Order(_) => "order",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SearchHit::Vehicle(v) => &v.id,
            SearchHit::Expense(e) => &e.id,
            SearchHit::Employee(e) => &e.id,
            SearchHit::Order(o) => &o.id,
        }
    }

    /// One-line description for the results table.
    pub fn summary(&self) -> String {
        match self {
            SearchHit::Vehicle(v) => format!(
                "{} | {} | {} | {}",
                v.customer_name,
                v.vehicle_reg_no,
                v.brand_and_model(),
                v.phone
            ),
            SearchHit::Expense(e) => format!("{} | AED {}", e.description, e.amount),
            SearchHit::Employee(e) => format!(
                "{} | {} | {} | {}",
                e.name, e.work.designation, e.work.department, e.phone
            ),
            SearchHit::Order(o) => format!(
                "{} | {} | {} part(s) | {}",
                o.supplier,
                o.target_vehicle,
                o.parts.len(),
                o.phone
            ),
        }
    }
}

/// Case-insensitive query, prepared once per search.
struct Needle {
    raw: String,
    lower: String,
}

impl Needle {
    fn new(query: &str) -> Self {
        let raw = query.trim().to_string();
        let lower = raw.to_lowercase();
        Self { raw, lower }
    }

    fn text(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.lower)
    }

    // Phone numbers and ids are matched verbatim.
    fn exact(&self, haystack: &str) -> bool {
        haystack.contains(&self.raw)
    }
}

fn vehicle_matches(needle: &Needle, vehicle: &Vehicle) -> bool {
    needle.exact(&vehicle.vehicle_id)
        || needle.text(&vehicle.vehicle_reg_no)
        || needle.text(&vehicle.customer_name)
        || needle.exact(&vehicle.phone)
        || needle.text(&vehicle.brand)
        || needle.text(&vehicle.vehicle_model)
        || vehicle
            .services
            .iter()
            .any(|service| needle.text(&service.description))
}

fn expense_matches(needle: &Needle, expense: &Expense) -> bool {
    needle.text(&expense.description)
}

fn employee_matches(needle: &Needle, employee: &Employee) -> bool {
    needle.text(&employee.name)
        || needle.exact(&employee.phone)
        || needle.text(&employee.nationality)
        || needle.text(&employee.work.department)
        || needle.text(&employee.work.designation)
        || needle.text(&employee.passport.passport_no)
        || needle.text(&employee.emirates_id.number)
}

fn order_matches(needle: &Needle, order: &PartOrder) -> bool {
    needle.exact(&order.phone)
        || needle.text(&order.supplier)
        || needle.text(&order.target_vehicle)
        || order.parts.iter().any(|part| needle.text(&part.description))
}

/// Search every collection. Hits come back grouped by kind: vehicles,
/// expenses, employees, then orders. A blank query finds nothing.
pub fn search(
    query: &str,
    vehicles: &[Vehicle],
    expenses: &[Expense],
    employees: &[Employee],
    orders: &[PartOrder],
) -> Vec<SearchHit> {
    let needle = Needle::new(query);
    if needle.raw.is_empty() {
        return Vec::new();
    }

    let vehicles = vehicles
        .iter()
        .filter(|v| vehicle_matches(&needle, v))
        .cloned()
        .map(SearchHit::Vehicle);
    let expenses = expenses
        .iter()
        .filter(|e| expense_matches(&needle, e))
        .cloned()
        .map(SearchHit::Expense);
    let employees = employees
        .iter()
        .filter(|e| employee_matches(&needle, e))
        .cloned()
        .map(SearchHit::Employee);
    let orders = orders
        .iter()
        .filter(|o| order_matches(&needle, o))
        .cloned()
        .map(SearchHit::Order);

    vehicles.chain(expenses).chain(employees).chain(orders).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceLine;

    fn vehicle_with_service(name: &str, service: &str) -> Vehicle {
        Vehicle {
            id: format!("v-{}", name),
            customer_name: name.into(),
            phone: "0501234567".into(),
            vehicle_reg_no: "SHJ 4411".into(),
            brand: "Toyota".into(),
            vehicle_model: "Corolla".into(),
            services: vec![ServiceLine {
                description: service.into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn oil_finds_oil_change_services() {
        let vehicles = vec![
            vehicle_with_service("Ahmed", "Oil Change"),
            vehicle_with_service("Sara", "Brake Inspection"),
        ];
        let hits = search("Oil", &vehicles, &[], &[], &[]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind(), "vehicle");
        assert_eq!(hits[0].id(), "v-Ahmed");

        let lower = search("oil", &vehicles, &[], &[], &[]);
        assert_eq!(lower.len(), 1);
    }

    #[test]
    fn hits_span_all_kinds_in_order() {
        let vehicles = vec![vehicle_with_service("Brake Shop Client", "Wash")];
        let expenses = vec![Expense {
            description: "Brake fluid restock".into(),
            ..Default::default()
        }];
        let mut employee = Employee {
            name: "Ravi".into(),
            ..Default::default()
        };
        employee.work.designation = "Brake technician".into();
        let orders = vec![PartOrder {
            supplier: "Gulf Spares".into(),
            parts: vec![ServiceLine {
                description: "brake pad".into(),
                ..Default::default()
            }],
            ..Default::default()
        }];

        let hits = search("BRAKE", &vehicles, &expenses, &[employee], &orders);
        let kinds: Vec<_> = hits.iter().map(SearchHit::kind).collect();
        assert_eq!(kinds, vec!["vehicle", "expense", "employee", "order"]);
    }

    #[test]
    fn phone_matches_verbatim() {
        let vehicles = vec![vehicle_with_service("Ahmed", "Oil Change")];
        assert_eq!(search("123456", &vehicles, &[], &[], &[]).len(), 1);
        assert!(search("999", &vehicles, &[], &[], &[]).is_empty());
    }

    #[test]
    fn blank_query_finds_nothing() {
        let vehicles = vec![vehicle_with_service("Ahmed", "Oil Change")];
        assert!(search("   ", &vehicles, &[], &[], &[]).is_empty());
    }
}
