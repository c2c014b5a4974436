use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::related::RelatedItems;
use crate::aggregation::{DailyTotal, MetaTotals};
use crate::category::models::CategoryResponse;
use crate::pagination::Pagination;
use crate::payment_method::models::PaymentMethodResponse;

/// Validate that amount is zero or positive
fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        return Err(ValidationError::new("amount_must_not_be_negative"));
    }
    Ok(())
}

/// Database model for expenses
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub payment_method_id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub expense_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An expense together with whatever its references resolved to.
/// A reference that no longer resolves to an entity of the same owner is `None`.
#[derive(Debug, Clone)]
pub struct ExpenseWithRefs {
    pub expense: Expense,
    pub category: Option<CategoryResponse>,
    pub payment_method: Option<PaymentMethodResponse>,
}

/// Expense information returned in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    /// Unique expense identifier
    pub id: Uuid,
    /// Category this expense is booked against
    pub category_id: Uuid,
    /// Payment method used
    pub payment_method_id: Uuid,
    /// Short description
    #[schema(example = "Groceries")]
    pub title: String,
    /// Amount spent
    #[schema(example = 250.00)]
    pub amount: Decimal,
    /// When the expense happened
    pub expense_date: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            category_id: e.category_id,
            payment_method_id: e.payment_method_id,
            title: e.title,
            amount: e.amount,
            expense_date: e.expense_date,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Request body for creating or replacing an expense
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    /// Category (must belong to the caller)
    pub category_id: Uuid,

    /// Payment method (must belong to the caller)
    pub payment_method_id: Uuid,

    /// Title (1-200 characters)
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[schema(example = "Groceries")]
    pub title: String,

    /// Amount (zero or positive)
    #[validate(custom(
        function = "validate_non_negative_amount",
        message = "Amount must not be negative"
    ))]
    #[schema(example = 250.00)]
    pub amount: Decimal,

    /// When the expense happened
    pub expense_date: DateTime<Utc>,
}

/// Query parameters for listing expenses
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseListQuery {
    /// First calendar day included (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Last calendar day included (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-01-31")]
    pub end_date: Option<NaiveDate>,
    /// Filter by category
    pub category_id: Option<Uuid>,
    /// Filter by payment method
    pub payment_method_id: Option<Uuid>,

    /// Page number, starting at 1
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    #[param(example = 1)]
    pub page: Option<i64>,

    /// Items per page (1-100)
    #[validate(range(min = 1, max = 100, message = "Page size must be 1-100"))]
    #[param(example = 10)]
    pub page_size: Option<i64>,
}

/// Query parameters shared by the aggregate endpoints (no pagination)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilterQuery {
    /// First calendar day included (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Last calendar day included (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-01-31")]
    pub end_date: Option<NaiveDate>,
    /// Filter by category
    pub category_id: Option<Uuid>,
    /// Filter by payment method
    pub payment_method_id: Option<Uuid>,
}

/// Query parameters for title search
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseSearchQuery {
    /// Case-insensitive fragment of the title
    #[validate(length(min = 1, max = 200, message = "Search text must be 1-200 characters"))]
    #[param(example = "groc")]
    pub title: String,
}

/// Paginated listing with related entities and filter-wide totals
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListResponse {
    /// Expenses on the requested page, newest first
    pub data: Vec<ExpenseResponse>,
    pub pagination: Pagination,
    /// Categories and payment methods referenced by `data`
    pub related_items: RelatedItems,
    /// Count and sum over every matching expense, not just this page
    pub meta: MetaTotals,
}

/// Per-day buckets with the totals they add up to
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotalsResponse {
    pub data: Vec<DailyTotal>,
    pub meta: MetaTotals,
}

/// Title search results
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSearchResponse {
    pub data: Vec<ExpenseResponse>,
    pub related_items: RelatedItems,
}

/// Path parameters for expense ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpenseIdPath {
    /// Expense UUID
    pub id: Uuid,
}
