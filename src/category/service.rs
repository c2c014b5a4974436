use tracing::debug;
use uuid::Uuid;

use super::models::{Category, CategoryStat, CreateCategoryDto, UpdateCategoryDto};
use crate::errors::AppError;
use crate::expense::filter::{ExpenseFilter, ReportingOffset};
use crate::expense::models::ExpenseFilterQuery;
use crate::ownership::{require_target, Target};
use crate::store::ExpenseStore;

/// Service layer for category business logic.
pub struct CategoryService;

impl CategoryService {
    /// All categories for the owner, ordered by name
    pub async fn list(store: &dyn ExpenseStore, owner_id: Uuid) -> Result<Vec<Category>, AppError> {
        store.list_categories(owner_id).await
    }

    /// Create a new category
    pub async fn create(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        dto: &CreateCategoryDto,
    ) -> Result<Category, AppError> {
        let name = Self::clean_name(&dto.name)?;
        store.insert_category(owner_id, &name, dto.budget).await
    }

    /// Update an existing category; a foreign or missing id is `NotFound`
    pub async fn update(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        category_id: Uuid,
        dto: &UpdateCategoryDto,
    ) -> Result<Category, AppError> {
        let name = dto.name.as_deref().map(Self::clean_name).transpose()?;

        let updated = store
            .update_category(owner_id, category_id, name.as_deref(), dto.budget)
            .await?;
        require_target(Target::Category, updated)
    }

    /// Per-category count and sum for every owned category, with budget comparison.
    /// Rows keep the store's ranking.
    pub async fn stats(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        query: &ExpenseFilterQuery,
        reporting: ReportingOffset,
    ) -> Result<Vec<CategoryStat>, AppError> {
        let filter = ExpenseFilter::from_filter_query(query, reporting);
        debug!(%owner_id, ?filter, "computing category stats");

        let rows = store.category_rollups(owner_id, &filter).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Trim and sanitize name
    fn clean_name(raw: &str) -> Result<String, AppError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        Ok(name.to_string())
    }
}
