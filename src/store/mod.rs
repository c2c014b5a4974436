//! Storage contract consumed by the services.
//!
//! Every method takes the owner explicitly and must scope all reads and
//! writes to that owner. Writes that involve several statements (reference
//! checks followed by an insert or update) are atomic: they either commit as
//! a whole or leave the store untouched.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::aggregation::{DailyTotal, MetaTotals};
use crate::category::models::{Category, CategoryRollup};
use crate::errors::AppError;
use crate::expense::filter::{ExpenseFilter, ReportingOffset};
use crate::expense::models::{Expense, ExpenseDraft, ExpenseWithRefs};
use crate::payment_method::models::{PaymentMethod, PaymentMethodStat};

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Connectivity check behind `GET /health`
    async fn ping(&self) -> Result<(), AppError>;

    // ---- categories ----

    async fn insert_category(
        &self,
        owner_id: Uuid,
        name: &str,
        budget: Decimal,
    ) -> Result<Category, AppError>;

    /// All categories of the owner, ordered by name
    async fn list_categories(&self, owner_id: Uuid) -> Result<Vec<Category>, AppError>;

    /// Apply the provided fields; `Ok(None)` when the id is missing or foreign.
    async fn update_category(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        name: Option<&str>,
        budget: Option<Decimal>,
    ) -> Result<Option<Category>, AppError>;

    /// One row per owned category, including categories without matches.
    /// Ordered by total amount descending, then id ascending.
    async fn category_rollups(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<CategoryRollup>, AppError>;

    // ---- payment methods ----

    async fn insert_payment_method(
        &self,
        owner_id: Uuid,
        name: &str,
    ) -> Result<PaymentMethod, AppError>;

    /// All payment methods of the owner, ordered by name
    async fn list_payment_methods(&self, owner_id: Uuid) -> Result<Vec<PaymentMethod>, AppError>;

    /// One row per owned payment method, including those without matches.
    /// Same ordering as `category_rollups`.
    async fn payment_method_rollups(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<PaymentMethodStat>, AppError>;

    // ---- expenses ----

    async fn meta_totals(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<MetaTotals, AppError>;

    /// Matching expenses newest first (`expense_date`, then `created_at`, then id),
    /// with their references resolved.
    async fn list_expenses(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExpenseWithRefs>, AppError>;

    /// Sparse per-day buckets, ascending by day
    async fn daily_totals(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        reporting: ReportingOffset,
    ) -> Result<Vec<DailyTotal>, AppError>;

    /// Latest expense per distinct title containing `needle` (case-insensitive),
    /// ordered by title.
    async fn search_expenses(
        &self,
        owner_id: Uuid,
        needle: &str,
    ) -> Result<Vec<ExpenseWithRefs>, AppError>;

    /// Verify both references belong to the owner, then insert.
    async fn insert_expense(
        &self,
        owner_id: Uuid,
        draft: &ExpenseDraft,
    ) -> Result<Expense, AppError>;

    /// Verify the target and both references belong to the owner, then replace.
    async fn update_expense(
        &self,
        owner_id: Uuid,
        expense_id: Uuid,
        draft: &ExpenseDraft,
    ) -> Result<Expense, AppError>;
}
