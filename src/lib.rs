pub mod aggregation;
pub mod auth;
pub mod category;
pub mod config;
pub mod errors;
pub mod expense;
pub mod extractors;
pub mod health;
pub mod openapi;
pub mod ownership;
pub mod pagination;
pub mod payment_method;
pub mod store;

use actix_web::web;

/// Register every HTTP route. Literal paths are registered before `{id}` paths.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        // Expense endpoints
        .service(expense::list_expenses)
        .service(expense::search_expenses)
        .service(expense::daily_totals)
        .service(expense::create_expense)
        .service(expense::update_expense)
        // Category endpoints
        .service(category::list_categories)
        .service(category::category_stats)
        .service(category::create_category)
        .service(category::update_category)
        // Payment method endpoints
        .service(payment_method::list_payment_methods)
        .service(payment_method::payment_method_stats)
        .service(payment_method::create_payment_method);
}
