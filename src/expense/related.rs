use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use super::models::{Expense, ExpenseWithRefs};
use crate::category::models::CategoryResponse;
use crate::payment_method::models::PaymentMethodResponse;

/// Lookup tables for the entities referenced by a set of expenses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItems {
    /// Category id -> category
    pub categories: BTreeMap<Uuid, CategoryResponse>,
    /// Payment method id -> payment method
    pub payment_methods: BTreeMap<Uuid, PaymentMethodResponse>,
}

impl RelatedItems {
    /// Split joined rows into the plain expense list (order preserved) and
    /// de-duplicated lookup tables. References that did not resolve are
    /// simply absent from the tables.
    pub fn resolve(rows: Vec<ExpenseWithRefs>) -> (Vec<Expense>, Self) {
        let mut related = Self::default();
        let mut expenses = Vec::with_capacity(rows.len());

        for row in rows {
            if let Some(category) = row.category {
                related.categories.entry(category.id).or_insert(category);
            }
            if let Some(payment_method) = row.payment_method {
                related
                    .payment_methods
                    .entry(payment_method.id)
                    .or_insert(payment_method);
            }
            expenses.push(row.expense);
        }

        (expenses, related)
    }
}
