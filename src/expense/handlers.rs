use actix_web::{get, post, put, web, HttpResponse};
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::Owner;
use crate::store::ExpenseStore;

use super::filter::ReportingOffset;
use super::models::{
    DailyTotalsResponse, ExpenseDraft, ExpenseFilterQuery, ExpenseIdPath, ExpenseListQuery,
    ExpenseListResponse, ExpenseResponse, ExpenseSearchQuery, ExpenseSearchResponse,
};
use super::service::ExpenseService;

/// GET /expenses - List expenses with filters, pagination, related items and totals
#[utoipa::path(
    get,
    path = "/expenses",
    tag = "Expenses",
    params(ExpenseListQuery),
    responses(
        (status = 200, description = "Paginated list of expenses", body = ExpenseListResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/expenses")]
pub async fn list_expenses(
    store: web::Data<dyn ExpenseStore>,
    reporting: web::Data<ReportingOffset>,
    owner: Owner,
    query: web::Query<ExpenseListQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;

    let response =
        ExpenseService::list_expenses(store.get_ref(), owner.id, &query, **reporting).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /expenses/search - Latest expense per distinct matching title
#[utoipa::path(
    get,
    path = "/expenses/search",
    tag = "Expenses",
    params(ExpenseSearchQuery),
    responses(
        (status = 200, description = "Matching expenses", body = ExpenseSearchResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/expenses/search")]
pub async fn search_expenses(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
    query: web::Query<ExpenseSearchQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;

    let response =
        ExpenseService::search_expenses(store.get_ref(), owner.id, &query.title).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /expenses/stats/total-per-day - Per-day totals for the filter
#[utoipa::path(
    get,
    path = "/expenses/stats/total-per-day",
    tag = "Expenses",
    params(ExpenseFilterQuery),
    responses(
        (status = 200, description = "Per-day totals, ascending by day", body = DailyTotalsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/expenses/stats/total-per-day")]
pub async fn daily_totals(
    store: web::Data<dyn ExpenseStore>,
    reporting: web::Data<ReportingOffset>,
    owner: Owner,
    query: web::Query<ExpenseFilterQuery>,
) -> Result<HttpResponse, AppError> {
    let response =
        ExpenseService::daily_totals(store.get_ref(), owner.id, &query, **reporting).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /expenses - Create an expense
#[utoipa::path(
    post,
    path = "/expenses",
    tag = "Expenses",
    request_body = ExpenseDraft,
    responses(
        (status = 201, description = "Expense created", body = ExpenseResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 422, description = "Category or payment method not owned by caller", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/expenses")]
pub async fn create_expense(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
    body: web::Json<ExpenseDraft>,
) -> Result<HttpResponse, AppError> {
    let expense =
        ExpenseService::create_expense(store.get_ref(), owner.id, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(ExpenseResponse::from(expense)))
}

/// PUT /expenses/{id} - Replace an expense
#[utoipa::path(
    put,
    path = "/expenses/{id}",
    tag = "Expenses",
    params(ExpenseIdPath),
    request_body = ExpenseDraft,
    responses(
        (status = 200, description = "Expense updated", body = ExpenseResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 422, description = "Category or payment method not owned by caller", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/expenses/{id}")]
pub async fn update_expense(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
    path: web::Path<ExpenseIdPath>,
    body: web::Json<ExpenseDraft>,
) -> Result<HttpResponse, AppError> {
    let expense = ExpenseService::update_expense(
        store.get_ref(),
        owner.id,
        path.id,
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ExpenseResponse::from(expense)))
}
