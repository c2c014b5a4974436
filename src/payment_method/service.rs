use tracing::debug;
use uuid::Uuid;

use super::models::{CreatePaymentMethodDto, PaymentMethod, PaymentMethodStat};
use crate::errors::AppError;
use crate::expense::filter::{ExpenseFilter, ReportingOffset};
use crate::expense::models::ExpenseFilterQuery;
use crate::store::ExpenseStore;

pub struct PaymentMethodService;

impl PaymentMethodService {
    pub async fn list(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
    ) -> Result<Vec<PaymentMethod>, AppError> {
        store.list_payment_methods(owner_id).await
    }

    pub async fn create(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        dto: &CreatePaymentMethodDto,
    ) -> Result<PaymentMethod, AppError> {
        let name = dto.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        store.insert_payment_method(owner_id, name).await
    }

    /// Same ordering contract as category stats.
    pub async fn stats(
        store: &dyn ExpenseStore,
        owner_id: Uuid,
        query: &ExpenseFilterQuery,
        reporting: ReportingOffset,
    ) -> Result<Vec<PaymentMethodStat>, AppError> {
        let filter = ExpenseFilter::from_filter_query(query, reporting);
        debug!(%owner_id, ?filter, "computing payment method stats");

        store.payment_method_rollups(owner_id, &filter).await
    }
}
