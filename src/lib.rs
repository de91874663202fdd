pub mod api;
pub mod billing;
pub mod config;
pub mod models;
pub mod print;
pub mod telemetry;
pub mod ui;
