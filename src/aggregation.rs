//! Shapes shared by the rollups and the ordering contract for per-entity stats.
//!
//! Every rollup is computed under the same [`ExpenseFilter`](crate::expense::filter::ExpenseFilter)
//! as the listing, so `MetaTotals::total_count` equals the sum of the per-day
//! counts and the sum of the per-category counts for that filter.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Count and sum over a filtered expense set, independent of pagination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaTotals {
    #[schema(example = 1250.50)]
    pub total_amount: Decimal,
    #[schema(example = 42)]
    pub total_count: i64,
}

impl MetaTotals {
    pub fn add(&mut self, amount: Decimal) {
        self.total_amount += amount;
        self.total_count += 1;
    }
}

/// One calendar day (in the reporting offset) with at least one matching expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    #[schema(value_type = String, example = "2025-01-10")]
    pub day: NaiveDate,
    #[schema(example = 180.00)]
    pub total_amount: Decimal,
    #[schema(example = 3)]
    pub count: i64,
}

/// A per-entity rollup row (category or payment method).
pub trait Rollup {
    fn entity_id(&self) -> Uuid;
    fn total_amount(&self) -> Decimal;
    fn count(&self) -> i64;
}

/// Order rollups by total amount descending, ties broken by id ascending.
pub fn rank_by_total<T: Rollup>(rows: &mut [T]) {
    rows.sort_by(|a, b| {
        b.total_amount()
            .cmp(&a.total_amount())
            .then_with(|| a.entity_id().cmp(&b.entity_id()))
    });
}

/// Sum of counts across rollup rows.
pub fn total_count<T: Rollup>(rows: &[T]) -> i64 {
    rows.iter().map(Rollup::count).sum()
}

/// Order day buckets ascending.
pub fn sort_days(days: &mut [DailyTotal]) {
    days.sort_by_key(|d| d.day);
}
