use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::expense::filter::ReportingOffset;
use crate::expense::models::ExpenseFilterQuery;
use crate::extractors::Owner;
use crate::store::ExpenseStore;

use super::models::{CreatePaymentMethodDto, PaymentMethodResponse, PaymentMethodStat};
use super::service::PaymentMethodService;

/// GET /payment-methods - List payment methods for the authenticated user
#[utoipa::path(
    get,
    path = "/payment-methods",
    tag = "Payment Methods",
    responses(
        (status = 200, description = "Payment methods ordered by name", body = Vec<PaymentMethodResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/payment-methods")]
pub async fn list_payment_methods(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
) -> Result<HttpResponse, AppError> {
    let payment_methods = PaymentMethodService::list(store.get_ref(), owner.id).await?;

    let response: Vec<PaymentMethodResponse> =
        payment_methods.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /payment-methods/stats - Spending per payment method
#[utoipa::path(
    get,
    path = "/payment-methods/stats",
    tag = "Payment Methods",
    params(ExpenseFilterQuery),
    responses(
        (status = 200, description = "One row per payment method, highest spend first", body = Vec<PaymentMethodStat>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/payment-methods/stats")]
pub async fn payment_method_stats(
    store: web::Data<dyn ExpenseStore>,
    reporting: web::Data<ReportingOffset>,
    owner: Owner,
    query: web::Query<ExpenseFilterQuery>,
) -> Result<HttpResponse, AppError> {
    let stats =
        PaymentMethodService::stats(store.get_ref(), owner.id, &query, **reporting).await?;

    Ok(HttpResponse::Ok().json(stats))
}

/// POST /payment-methods - Create a payment method
#[utoipa::path(
    post,
    path = "/payment-methods",
    tag = "Payment Methods",
    request_body = CreatePaymentMethodDto,
    responses(
        (status = 201, description = "Payment method created", body = PaymentMethodResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/payment-methods")]
pub async fn create_payment_method(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
    body: web::Json<CreatePaymentMethodDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let payment_method =
        PaymentMethodService::create(store.get_ref(), owner.id, &body).await?;

    Ok(HttpResponse::Created().json(PaymentMethodResponse::from(payment_method)))
}
