pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{create_payment_method, list_payment_methods, payment_method_stats};
