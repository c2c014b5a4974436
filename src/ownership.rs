//! Ownership checks applied by every store before a write commits.
//!
//! Reads are scoped by an `owner_id = $owner` predicate inside each query;
//! writes go through the helpers below so a bad reference and a missing
//! update target are reported with distinct errors.

use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

/// Entities an expense may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Category,
    PaymentMethod,
}

impl Reference {
    pub fn label(&self) -> &'static str {
        match self {
            Reference::Category => "Category",
            Reference::PaymentMethod => "Payment method",
        }
    }
}

/// Entities that can be the target of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Expense,
    Category,
}

impl Target {
    pub fn label(&self) -> &'static str {
        match self {
            Target::Expense => "Expense",
            Target::Category => "Category",
        }
    }
}

/// Fail with `OwnershipError` unless the referenced entity exists for this owner.
pub fn require_reference(
    reference: Reference,
    id: Uuid,
    owner_id: Uuid,
    owned: bool,
) -> Result<(), AppError> {
    if owned {
        return Ok(());
    }

    warn!(
        %owner_id,
        referenced_id = %id,
        "rejected write: {} not owned by caller",
        reference.label()
    );
    Err(AppError::OwnershipError(format!(
        "{} not found or access denied",
        reference.label()
    )))
}

/// Turn a missing update target into `NotFound`.
pub fn require_target<T>(target: Target, found: Option<T>) -> Result<T, AppError> {
    found.ok_or_else(|| AppError::NotFound(format!("{} not found", target.label())))
}
