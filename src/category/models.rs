use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::aggregation::Rollup;

/// Validate that a Decimal is non-negative
fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("must be non-negative"));
    }
    Ok(())
}

/// Database entity for categories
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub budget: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category information returned in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Unique category identifier
    pub id: Uuid,
    /// Category name
    #[schema(example = "Food")]
    pub name: String,
    /// Planned spend; expenses may exceed it
    #[schema(example = 500.00)]
    pub budget: Decimal,
}

impl From<Category> for CategoryResponse {
    fn from(cat: Category) -> Self {
        Self {
            id: cat.id,
            name: cat.name,
            budget: cat.budget,
        }
    }
}

/// Category with the count and sum of matching expenses (zero when none match)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CategoryRollup {
    pub id: Uuid,
    pub name: String,
    pub budget: Decimal,
    pub total_amount: Decimal,
    pub count: i64,
}

impl Rollup for CategoryRollup {
    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    fn count(&self) -> i64 {
        self.count
    }
}

/// Per-category spending compared against budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub id: Uuid,
    #[schema(example = "Food")]
    pub name: String,
    #[schema(example = 500.00)]
    pub budget: Decimal,
    /// Sum of matching expenses
    #[schema(example = 150.00)]
    pub total_amount: Decimal,
    /// Number of matching expenses
    #[schema(example = 2)]
    pub count: i64,
    /// budget - totalAmount (negative when over budget)
    #[schema(example = 350.00)]
    pub remaining_amount: Decimal,
}

impl From<CategoryRollup> for CategoryStat {
    fn from(row: CategoryRollup) -> Self {
        Self {
            remaining_amount: row.budget - row.total_amount,
            id: row.id,
            name: row.name,
            budget: row.budget,
            total_amount: row.total_amount,
            count: row.count,
        }
    }
}

/// Request body for creating a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    /// Category name (1-50 characters)
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[schema(example = "Food")]
    pub name: String,

    /// Planned spend (defaults to 0)
    #[validate(custom(function = "validate_non_negative", message = "Budget must be non-negative"))]
    #[serde(default)]
    #[schema(example = 500.00)]
    pub budget: Decimal,
}

/// Request body for updating a category (PATCH - all fields optional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    /// Category name
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[schema(example = "Food & Dining")]
    pub name: Option<String>,

    /// Planned spend
    #[schema(example = 600.00)]
    pub budget: Option<Decimal>,
}

impl UpdateCategoryDto {
    /// Validate decimal fields
    pub fn validate_decimals(&self) -> Result<(), ValidationError> {
        if let Some(budget) = &self.budget {
            validate_non_negative(budget)?;
        }
        Ok(())
    }
}

/// Path parameters for category ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryIdPath {
    /// Category UUID
    pub id: Uuid,
}
