pub mod date_input;
pub mod form;
pub mod line_items;
pub mod month_bar;
pub mod popup;
pub mod selection;
