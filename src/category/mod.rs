pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{category_stats, create_category, list_categories, update_category};
