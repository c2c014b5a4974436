pub mod filter;
pub mod handlers;
pub mod models;
pub mod related;
pub mod service;

pub use handlers::{create_expense, daily_totals, list_expenses, search_expenses, update_expense};
