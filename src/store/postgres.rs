use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::ExpenseStore;
use crate::aggregation::{DailyTotal, MetaTotals};
use crate::category::models::{Category, CategoryResponse, CategoryRollup};
use crate::errors::AppError;
use crate::expense::filter::{ExpenseFilter, ReportingOffset};
use crate::expense::models::{Expense, ExpenseDraft, ExpenseWithRefs};
use crate::ownership::{require_reference, require_target, Reference, Target};
use crate::payment_method::models::{PaymentMethod, PaymentMethodResponse, PaymentMethodStat};

/// Predicate shared by the listing and every aggregate.
/// Binds: $1 owner, $2 start (inclusive), $3 end (exclusive), $4 category, $5 payment method.
macro_rules! expense_predicate {
    () => {
        r#"
            e.owner_id = $1
            AND ($2::timestamptz IS NULL OR e.expense_date >= $2)
            AND ($3::timestamptz IS NULL OR e.expense_date < $3)
            AND ($4::uuid IS NULL OR e.category_id = $4)
            AND ($5::uuid IS NULL OR e.payment_method_id = $5)
        "#
    };
}

macro_rules! expense_with_refs_columns {
    () => {
        r#"
            e.id, e.owner_id, e.category_id, e.payment_method_id, e.title, e.amount,
            e.expense_date, e.created_at, e.updated_at,
            c.id AS joined_category_id, c.name AS category_name, c.budget AS category_budget,
            p.id AS joined_payment_method_id, p.name AS payment_method_name
        "#
    };
}

const EXPENSE_COLUMNS: &str = "id, owner_id, category_id, payment_method_id, title, amount, \
                               expense_date, created_at, updated_at";

/// Flat row produced by the listing's LEFT JOINs
#[derive(Debug, FromRow)]
struct ExpenseRefRow {
    id: Uuid,
    owner_id: Uuid,
    category_id: Uuid,
    payment_method_id: Uuid,
    title: String,
    amount: Decimal,
    expense_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    joined_category_id: Option<Uuid>,
    category_name: Option<String>,
    category_budget: Option<Decimal>,
    joined_payment_method_id: Option<Uuid>,
    payment_method_name: Option<String>,
}

impl From<ExpenseRefRow> for ExpenseWithRefs {
    fn from(row: ExpenseRefRow) -> Self {
        let category = match (row.joined_category_id, row.category_name, row.category_budget) {
            (Some(id), Some(name), Some(budget)) => Some(CategoryResponse { id, name, budget }),
            _ => None,
        };
        let payment_method = match (row.joined_payment_method_id, row.payment_method_name) {
            (Some(id), Some(name)) => Some(PaymentMethodResponse { id, name }),
            _ => None,
        };

        Self {
            expense: Expense {
                id: row.id,
                owner_id: row.owner_id,
                category_id: row.category_id,
                payment_method_id: row.payment_method_id,
                title: row.title,
                amount: row.amount,
                expense_date: row.expense_date,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            category,
            payment_method,
        }
    }
}

/// Escape LIKE wildcards so the search text matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// PostgreSQL-backed store over externally managed tables
/// (see `tests/migrations` for the expected layout).
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn reference_owned(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reference: Reference,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, AppError> {
        let sql = match reference {
            Reference::Category => {
                "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND owner_id = $2)"
            }
            Reference::PaymentMethod => {
                "SELECT EXISTS(SELECT 1 FROM payment_methods WHERE id = $1 AND owner_id = $2)"
            }
        };

        sqlx::query_scalar::<_, bool>(sql)
            .bind(id)
            .bind(owner_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(AppError::from)
    }

    async fn verify_references(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        owner_id: Uuid,
        draft: &ExpenseDraft,
    ) -> Result<(), AppError> {
        let category_owned =
            Self::reference_owned(tx, Reference::Category, draft.category_id, owner_id).await?;
        require_reference(Reference::Category, draft.category_id, owner_id, category_owned)?;

        let payment_method_owned = Self::reference_owned(
            tx,
            Reference::PaymentMethod,
            draft.payment_method_id,
            owner_id,
        )
        .await?;
        require_reference(
            Reference::PaymentMethod,
            draft.payment_method_id,
            owner_id,
            payment_method_owned,
        )
    }
}

#[async_trait]
impl ExpenseStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_category(
        &self,
        owner_id: Uuid,
        name: &str,
        budget: Decimal,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (owner_id, name, budget)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, budget, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(budget)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn list_categories(&self, owner_id: Uuid) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, owner_id, name, budget, created_at, updated_at
            FROM categories
            WHERE owner_id = $1
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn update_category(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        name: Option<&str>,
        budget: Option<Decimal>,
    ) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($3, name),
                budget = COALESCE($4, budget),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, budget, created_at, updated_at
            "#,
        )
        .bind(category_id)
        .bind(owner_id)
        .bind(name)
        .bind(budget)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn category_rollups(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<CategoryRollup>, AppError> {
        sqlx::query_as::<_, CategoryRollup>(concat!(
            r#"
            SELECT c.id, c.name, c.budget,
                   COALESCE(SUM(e.amount), 0) AS total_amount,
                   COUNT(e.id) AS count
            FROM categories c
            LEFT JOIN expenses e ON e.category_id = c.id AND "#,
            expense_predicate!(),
            r#"
            WHERE c.owner_id = $1
            GROUP BY c.id, c.name, c.budget
            ORDER BY total_amount DESC, c.id ASC
            "#
        ))
        .bind(owner_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.category_id)
        .bind(filter.payment_method_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn insert_payment_method(
        &self,
        owner_id: Uuid,
        name: &str,
    ) -> Result<PaymentMethod, AppError> {
        sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn list_payment_methods(&self, owner_id: Uuid) -> Result<Vec<PaymentMethod>, AppError> {
        sqlx::query_as::<_, PaymentMethod>(
            r#"
            SELECT id, owner_id, name, created_at
            FROM payment_methods
            WHERE owner_id = $1
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn payment_method_rollups(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<PaymentMethodStat>, AppError> {
        sqlx::query_as::<_, PaymentMethodStat>(concat!(
            r#"
            SELECT p.id, p.name,
                   COALESCE(SUM(e.amount), 0) AS total_amount,
                   COUNT(e.id) AS count
            FROM payment_methods p
            LEFT JOIN expenses e ON e.payment_method_id = p.id AND "#,
            expense_predicate!(),
            r#"
            WHERE p.owner_id = $1
            GROUP BY p.id, p.name
            ORDER BY total_amount DESC, p.id ASC
            "#
        ))
        .bind(owner_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.category_id)
        .bind(filter.payment_method_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn meta_totals(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<MetaTotals, AppError> {
        sqlx::query_as::<_, MetaTotals>(concat!(
            r#"
            SELECT COALESCE(SUM(e.amount), 0) AS total_amount,
                   COUNT(*) AS total_count
            FROM expenses e
            WHERE "#,
            expense_predicate!()
        ))
        .bind(owner_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.category_id)
        .bind(filter.payment_method_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn list_expenses(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExpenseWithRefs>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseRefRow>(concat!(
            "SELECT ",
            expense_with_refs_columns!(),
            r#"
            FROM expenses e
            LEFT JOIN categories c ON c.id = e.category_id AND c.owner_id = $1
            LEFT JOIN payment_methods p ON p.id = e.payment_method_id AND p.owner_id = $1
            WHERE "#,
            expense_predicate!(),
            r#"
            ORDER BY e.expense_date DESC, e.created_at DESC, e.id DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(owner_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.category_id)
        .bind(filter.payment_method_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn daily_totals(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        reporting: ReportingOffset,
    ) -> Result<Vec<DailyTotal>, AppError> {
        sqlx::query_as::<_, DailyTotal>(concat!(
            r#"
            SELECT ((e.expense_date AT TIME ZONE 'UTC') + make_interval(secs => $6::float8))::date AS day,
                   COALESCE(SUM(e.amount), 0) AS total_amount,
                   COUNT(*) AS count
            FROM expenses e
            WHERE "#,
            expense_predicate!(),
            r#"
            GROUP BY day
            ORDER BY day ASC
            "#
        ))
        .bind(owner_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.category_id)
        .bind(filter.payment_method_id)
        .bind(f64::from(reporting.seconds()))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn search_expenses(
        &self,
        owner_id: Uuid,
        needle: &str,
    ) -> Result<Vec<ExpenseWithRefs>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseRefRow>(concat!(
            "SELECT DISTINCT ON (e.title) ",
            expense_with_refs_columns!(),
            r#"
            FROM expenses e
            LEFT JOIN categories c ON c.id = e.category_id AND c.owner_id = $1
            LEFT JOIN payment_methods p ON p.id = e.payment_method_id AND p.owner_id = $1
            WHERE e.owner_id = $1
              AND e.title ILIKE '%' || $2 || '%'
            ORDER BY e.title, e.expense_date DESC, e.created_at DESC, e.id DESC
            "#
        ))
        .bind(owner_id)
        .bind(escape_like(needle))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_expense(
        &self,
        owner_id: Uuid,
        draft: &ExpenseDraft,
    ) -> Result<Expense, AppError> {
        // Dropping `tx` on an early return rolls it back
        let mut tx = self
            .pool
            .begin()
            .await?;

        Self::verify_references(&mut tx, owner_id, draft).await?;

        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"
            INSERT INTO expenses
                (owner_id, category_id, payment_method_id, title, amount, expense_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(draft.category_id)
        .bind(draft.payment_method_id)
        .bind(&draft.title)
        .bind(draft.amount)
        .bind(draft.expense_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await?;

        Ok(expense)
    }

    async fn update_expense(
        &self,
        owner_id: Uuid,
        expense_id: Uuid,
        draft: &ExpenseDraft,
    ) -> Result<Expense, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await?;

        // 1. Lock the target row; a foreign id looks exactly like a missing one
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM expenses WHERE id = $1 AND owner_id = $2 FOR UPDATE",
        )
        .bind(expense_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;
        require_target(Target::Expense, locked)?;

        // 2. Both references must belong to the same owner
        Self::verify_references(&mut tx, owner_id, draft).await?;

        // 3. Replace
        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"
            UPDATE expenses SET
                category_id = $3,
                payment_method_id = $4,
                title = $5,
                amount = $6,
                expense_date = $7,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(expense_id)
        .bind(owner_id)
        .bind(draft.category_id)
        .bind(draft.payment_method_id)
        .bind(&draft.title)
        .bind(draft.amount)
        .bind(draft.expense_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await?;

        Ok(expense)
    }
}
