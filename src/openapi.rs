use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::aggregation::{DailyTotal, MetaTotals};
use crate::category::models::{
    CategoryResponse, CategoryStat, CreateCategoryDto, UpdateCategoryDto,
};
use crate::errors::ErrorResponse;
use crate::expense::models::{
    DailyTotalsResponse, ExpenseDraft, ExpenseListResponse, ExpenseResponse,
    ExpenseSearchResponse,
};
use crate::expense::related::RelatedItems;
use crate::health::HealthResponse;
use crate::pagination::Pagination;
use crate::payment_method::models::{
    CreatePaymentMethodDto, PaymentMethodResponse, PaymentMethodStat,
};

/// Security scheme modifier for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Expense Ledger API",
        version = "1.0.0",
        description = "Expense listing, reporting and aggregation per owner"
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Expenses", description = "Expense listing, search, daily totals and writes"),
        (name = "Categories", description = "Categories, budgets and per-category spending"),
        (name = "Payment Methods", description = "Payment methods and per-method spending")
    ),
    paths(
        crate::health::health_check,
        // Expense endpoints
        crate::expense::handlers::list_expenses,
        crate::expense::handlers::search_expenses,
        crate::expense::handlers::daily_totals,
        crate::expense::handlers::create_expense,
        crate::expense::handlers::update_expense,
        // Category endpoints
        crate::category::handlers::list_categories,
        crate::category::handlers::category_stats,
        crate::category::handlers::create_category,
        crate::category::handlers::update_category,
        // Payment method endpoints
        crate::payment_method::handlers::list_payment_methods,
        crate::payment_method::handlers::payment_method_stats,
        crate::payment_method::handlers::create_payment_method,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            // Expense schemas
            ExpenseResponse,
            ExpenseDraft,
            ExpenseListResponse,
            ExpenseSearchResponse,
            DailyTotalsResponse,
            DailyTotal,
            MetaTotals,
            Pagination,
            RelatedItems,
            // Category schemas
            CategoryResponse,
            CategoryStat,
            CreateCategoryDto,
            UpdateCategoryDto,
            // Payment method schemas
            PaymentMethodResponse,
            PaymentMethodStat,
            CreatePaymentMethodDto,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
