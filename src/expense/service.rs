use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use super::filter::{ExpenseFilter, ReportingOffset};
use super::models::{
    DailyTotalsResponse, Expense, ExpenseDraft, ExpenseFilterQuery, ExpenseListQuery,
    ExpenseListResponse, ExpenseSearchResponse,
};
use super::related::RelatedItems;
use crate::errors::AppError;
use crate::pagination::{PageRequest, Pagination};
use crate::store::ExpenseStore;

/// Service layer for expense listing, per-day rollups and writes.
pub struct ExpenseService;

impl ExpenseService {
    /// One page of expenses plus pagination, related entities and totals.
    ///
    /// Totals and the page are read by separate queries under the same filter;
    /// they are not one snapshot, so concurrent writes may briefly skew them.
    pub async fn list_expenses(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        query: &ExpenseListQuery,
        reporting: ReportingOffset,
    ) -> Result<ExpenseListResponse, AppError> {
        let page = PageRequest::new(query.page, query.page_size)?;
        let filter = ExpenseFilter::from_list_query(query, reporting);

        debug!(
            %owner_id,
            ?filter,
            page = page.page(),
            page_size = page.limit(),
            "listing expenses"
        );

        let (meta, rows) = futures::try_join!(
            store.meta_totals(owner_id, &filter),
            store.list_expenses(owner_id, &filter, page.limit(), page.offset()),
        )?;

        let pagination = Pagination::calculate(meta.total_count, page);
        let (expenses, related_items) = RelatedItems::resolve(rows);

        Ok(ExpenseListResponse {
            data: expenses.into_iter().map(Into::into).collect(),
            pagination,
            related_items,
            meta,
        })
    }

    /// Per-day buckets and the totals for the same filter; fails as a whole.
    pub async fn daily_totals(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        query: &ExpenseFilterQuery,
        reporting: ReportingOffset,
    ) -> Result<DailyTotalsResponse, AppError> {
        let filter = ExpenseFilter::from_filter_query(query, reporting);
        debug!(%owner_id, ?filter, "computing daily totals");

        let (meta, data) = futures::try_join!(
            store.meta_totals(owner_id, &filter),
            store.daily_totals(owner_id, &filter, reporting),
        )?;

        Ok(DailyTotalsResponse { data, meta })
    }

    /// Latest expense per distinct title containing `title`.
    pub async fn search_expenses(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        title: &str,
    ) -> Result<ExpenseSearchResponse, AppError> {
        let needle = title.trim();
        if needle.is_empty() {
            return Err(AppError::ValidationError(
                "Search text cannot be empty".to_string(),
            ));
        }

        let rows = store.search_expenses(owner_id, needle).await?;
        let (expenses, related_items) = RelatedItems::resolve(rows);

        Ok(ExpenseSearchResponse {
            data: expenses.into_iter().map(Into::into).collect(),
            related_items,
        })
    }

    /// Create an expense after verifying both references belong to the owner.
    pub async fn create_expense(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        draft: ExpenseDraft,
    ) -> Result<Expense, AppError> {
        let draft = Self::sanitize(draft)?;
        let expense = store.insert_expense(owner_id, &draft).await?;

        debug!(%owner_id, expense_id = %expense.id, "expense created");
        Ok(expense)
    }

    /// Replace an expense owned by the caller. A foreign or missing id is `NotFound`.
    pub async fn update_expense(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        expense_id: Uuid,
        draft: ExpenseDraft,
    ) -> Result<Expense, AppError> {
        let draft = Self::sanitize(draft)?;
        let expense = store.update_expense(owner_id, expense_id, &draft).await?;

        debug!(%owner_id, %expense_id, "expense updated");
        Ok(expense)
    }

    /// Validate the draft and trim its title
    fn sanitize(mut draft: ExpenseDraft) -> Result<ExpenseDraft, AppError> {
        draft.validate()?;

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AppError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        draft.title = title.to_string();

        Ok(draft)
    }
}
