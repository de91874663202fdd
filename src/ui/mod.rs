pub mod account;
pub mod components;
pub mod dashboard;
pub mod employee_wizard;
pub mod employees;
pub mod expense_wizard;
pub mod expenses;
pub mod login;
pub mod part_order_wizard;
pub mod part_orders;
pub mod vehicle_wizard;
pub mod vehicles;
