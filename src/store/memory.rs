use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::ExpenseStore;
use crate::aggregation::{rank_by_total, sort_days, DailyTotal, MetaTotals};
use crate::category::models::{Category, CategoryRollup};
use crate::errors::AppError;
use crate::expense::filter::{ExpenseFilter, ReportingOffset};
use crate::expense::models::{Expense, ExpenseDraft, ExpenseWithRefs};
use crate::ownership::{require_reference, require_target, Reference, Target};
use crate::payment_method::models::{PaymentMethod, PaymentMethodStat};

#[derive(Debug, Default)]
struct Tables {
    categories: HashMap<Uuid, Category>,
    payment_methods: HashMap<Uuid, PaymentMethod>,
    expenses: HashMap<Uuid, Expense>,
}

impl Tables {
    fn category_owned(&self, id: Uuid, owner_id: Uuid) -> bool {
        self.categories
            .get(&id)
            .is_some_and(|c| c.owner_id == owner_id)
    }

    fn payment_method_owned(&self, id: Uuid, owner_id: Uuid) -> bool {
        self.payment_methods
            .get(&id)
            .is_some_and(|p| p.owner_id == owner_id)
    }

    fn verify_references(&self, owner_id: Uuid, draft: &ExpenseDraft) -> Result<(), AppError> {
        require_reference(
            Reference::Category,
            draft.category_id,
            owner_id,
            self.category_owned(draft.category_id, owner_id),
        )?;
        require_reference(
            Reference::PaymentMethod,
            draft.payment_method_id,
            owner_id,
            self.payment_method_owned(draft.payment_method_id, owner_id),
        )
    }

    fn matching<'a>(
        &'a self,
        owner_id: Uuid,
        filter: &'a ExpenseFilter,
    ) -> impl Iterator<Item = &'a Expense> + 'a {
        self.expenses
            .values()
            .filter(move |e| e.owner_id == owner_id && filter.matches(e))
    }

    /// Left-join style resolution, scoped to the expense's owner
    fn with_refs(&self, expense: &Expense) -> ExpenseWithRefs {
        let category = self
            .categories
            .get(&expense.category_id)
            .filter(|c| c.owner_id == expense.owner_id)
            .cloned()
            .map(Into::into);
        let payment_method = self
            .payment_methods
            .get(&expense.payment_method_id)
            .filter(|p| p.owner_id == expense.owner_id)
            .cloned()
            .map(Into::into);

        ExpenseWithRefs {
            expense: expense.clone(),
            category,
            payment_method,
        }
    }
}

/// Newest first, ties broken the same way as the SQL listing
fn newest_first(a: &Expense, b: &Expense) -> std::cmp::Ordering {
    b.expense_date
        .cmp(&a.expense_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Store kept entirely in process memory.
///
/// Each operation holds the table lock for its whole duration, which makes
/// multi-step writes atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an expense row as-is, bypassing reference checks.
    /// Lets callers reproduce rows written before a reference went away.
    pub fn insert_raw_expense(&self, expense: Expense) -> Result<(), AppError> {
        self.write()?.expenses.insert(expense.id, expense);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|e| AppError::StorageError(format!("store lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|e| AppError::StorageError(format!("store lock poisoned: {e}")))
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }

    async fn insert_category(
        &self,
        owner_id: Uuid,
        name: &str,
        budget: Decimal,
    ) -> Result<Category, AppError> {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            budget,
            created_at: now,
            updated_at: now,
        };

        self.write()?
            .categories
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self, owner_id: Uuid) -> Result<Vec<Category>, AppError> {
        let tables = self.read()?;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn update_category(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        name: Option<&str>,
        budget: Option<Decimal>,
    ) -> Result<Option<Category>, AppError> {
        let mut tables = self.write()?;
        let Some(category) = tables
            .categories
            .get_mut(&category_id)
            .filter(|c| c.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(name) = name {
            category.name = name.to_string();
        }
        if let Some(budget) = budget {
            category.budget = budget;
        }
        category.updated_at = Utc::now();

        Ok(Some(category.clone()))
    }

    async fn category_rollups(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<CategoryRollup>, AppError> {
        let tables = self.read()?;

        let mut totals: HashMap<Uuid, MetaTotals> = HashMap::new();
        for expense in tables.matching(owner_id, filter) {
            totals
                .entry(expense.category_id)
                .or_default()
                .add(expense.amount);
        }

        let mut rows: Vec<CategoryRollup> = tables
            .categories
            .values()
            .filter(|c| c.owner_id == owner_id)
            .map(|c| {
                let meta = totals.get(&c.id).copied().unwrap_or_default();
                CategoryRollup {
                    id: c.id,
                    name: c.name.clone(),
                    budget: c.budget,
                    total_amount: meta.total_amount,
                    count: meta.total_count,
                }
            })
            .collect();
        rank_by_total(&mut rows);
        Ok(rows)
    }

    async fn insert_payment_method(
        &self,
        owner_id: Uuid,
        name: &str,
    ) -> Result<PaymentMethod, AppError> {
        let payment_method = PaymentMethod {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };

        self.write()?
            .payment_methods
            .insert(payment_method.id, payment_method.clone());
        Ok(payment_method)
    }

    async fn list_payment_methods(&self, owner_id: Uuid) -> Result<Vec<PaymentMethod>, AppError> {
        let tables = self.read()?;
        let mut payment_methods: Vec<PaymentMethod> = tables
            .payment_methods
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        payment_methods.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(payment_methods)
    }

    async fn payment_method_rollups(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<PaymentMethodStat>, AppError> {
        let tables = self.read()?;

        let mut totals: HashMap<Uuid, MetaTotals> = HashMap::new();
        for expense in tables.matching(owner_id, filter) {
            totals
                .entry(expense.payment_method_id)
                .or_default()
                .add(expense.amount);
        }

        let mut rows: Vec<PaymentMethodStat> = tables
            .payment_methods
            .values()
            .filter(|p| p.owner_id == owner_id)
            .map(|p| {
                let meta = totals.get(&p.id).copied().unwrap_or_default();
                PaymentMethodStat {
                    id: p.id,
                    name: p.name.clone(),
                    total_amount: meta.total_amount,
                    count: meta.total_count,
                }
            })
            .collect();
        rank_by_total(&mut rows);
        Ok(rows)
    }

    async fn meta_totals(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<MetaTotals, AppError> {
        let tables = self.read()?;
        let mut meta = MetaTotals::default();
        for expense in tables.matching(owner_id, filter) {
            meta.add(expense.amount);
        }
        Ok(meta)
    }

    async fn list_expenses(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExpenseWithRefs>, AppError> {
        let tables = self.read()?;
        let mut matched: Vec<&Expense> = tables.matching(owner_id, filter).collect();
        matched.sort_by(|a, b| newest_first(a, b));

        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|e| tables.with_refs(e))
            .collect())
    }

    async fn daily_totals(
        &self,
        owner_id: Uuid,
        filter: &ExpenseFilter,
        reporting: ReportingOffset,
    ) -> Result<Vec<DailyTotal>, AppError> {
        let tables = self.read()?;

        let mut buckets: BTreeMap<_, MetaTotals> = BTreeMap::new();
        for expense in tables.matching(owner_id, filter) {
            buckets
                .entry(reporting.day_of(expense.expense_date))
                .or_default()
                .add(expense.amount);
        }

        let mut days: Vec<DailyTotal> = buckets
            .into_iter()
            .map(|(day, meta)| DailyTotal {
                day,
                total_amount: meta.total_amount,
                count: meta.total_count,
            })
            .collect();
        sort_days(&mut days);
        Ok(days)
    }

    async fn search_expenses(
        &self,
        owner_id: Uuid,
        needle: &str,
    ) -> Result<Vec<ExpenseWithRefs>, AppError> {
        let tables = self.read()?;
        let needle = needle.to_lowercase();

        // Latest expense per exact title, keyed by title for ordering
        let mut latest: BTreeMap<&str, &Expense> = BTreeMap::new();
        for expense in tables
            .expenses
            .values()
            .filter(|e| e.owner_id == owner_id && e.title.to_lowercase().contains(&needle))
        {
            latest
                .entry(expense.title.as_str())
                .and_modify(|current| {
                    if newest_first(expense, *current).is_lt() {
                        *current = expense;
                    }
                })
                .or_insert(expense);
        }

        Ok(latest.into_values().map(|e| tables.with_refs(e)).collect())
    }

    async fn insert_expense(
        &self,
        owner_id: Uuid,
        draft: &ExpenseDraft,
    ) -> Result<Expense, AppError> {
        let mut tables = self.write()?;
        tables.verify_references(owner_id, draft)?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            owner_id,
            category_id: draft.category_id,
            payment_method_id: draft.payment_method_id,
            title: draft.title.clone(),
            amount: draft.amount,
            expense_date: draft.expense_date,
            created_at: now,
            updated_at: now,
        };
        tables.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn update_expense(
        &self,
        owner_id: Uuid,
        expense_id: Uuid,
        draft: &ExpenseDraft,
    ) -> Result<Expense, AppError> {
        let mut tables = self.write()?;

        let found = tables
            .expenses
            .get(&expense_id)
            .filter(|e| e.owner_id == owner_id)
            .map(|e| e.id);
        require_target(Target::Expense, found)?;
        tables.verify_references(owner_id, draft)?;

        let expense = require_target(Target::Expense, tables.expenses.get_mut(&expense_id))?;
        expense.category_id = draft.category_id;
        expense.payment_method_id = draft.payment_method_id;
        expense.title = draft.title.clone();
        expense.amount = draft.amount;
        expense.expense_date = draft.expense_date;
        expense.updated_at = Utc::now();

        Ok(expense.clone())
    }
}
