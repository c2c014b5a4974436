use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::aggregation::Rollup;

/// Database entity for payment methods
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Payment method information returned in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodResponse {
    pub id: Uuid,
    #[schema(example = "Credit card")]
    pub name: String,
}

impl From<PaymentMethod> for PaymentMethodResponse {
    fn from(pm: PaymentMethod) -> Self {
        Self {
            id: pm.id,
            name: pm.name,
        }
    }
}

/// Per-payment-method spending (zero when nothing matches)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodStat {
    pub id: Uuid,
    #[schema(example = "Credit card")]
    pub name: String,
    #[schema(example = 180.00)]
    pub total_amount: Decimal,
    #[schema(example = 3)]
    pub count: i64,
}

impl Rollup for PaymentMethodStat {
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

/// Request body for creating a payment method
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentMethodDto {
    /// Name (1-50 characters)
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[schema(example = "Credit card")]
    pub name: String,
}
