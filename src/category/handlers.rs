use actix_web::{get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::expense::filter::ReportingOffset;
use crate::expense::models::ExpenseFilterQuery;
use crate::extractors::Owner;
use crate::store::ExpenseStore;

use super::models::{
    CategoryIdPath, CategoryResponse, CategoryStat, CreateCategoryDto, UpdateCategoryDto,
};
use super::service::CategoryService;

/// GET /categories - List all categories for the authenticated user
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<CategoryResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/categories")]
pub async fn list_categories(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
) -> Result<HttpResponse, AppError> {
    let categories = CategoryService::list(store.get_ref(), owner.id).await?;

    let response: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /categories/stats - Spending per category compared against budget
#[utoipa::path(
    get,
    path = "/categories/stats",
    tag = "Categories",
    params(ExpenseFilterQuery),
    responses(
        (status = 200, description = "One row per category, highest spend first", body = Vec<CategoryStat>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/categories/stats")]
pub async fn category_stats(
    store: web::Data<dyn ExpenseStore>,
    reporting: web::Data<ReportingOffset>,
    owner: Owner,
    query: web::Query<ExpenseFilterQuery>,
) -> Result<HttpResponse, AppError> {
    let stats =
        CategoryService::stats(store.get_ref(), owner.id, &query, **reporting).await?;

    Ok(HttpResponse::Ok().json(stats))
}

/// POST /categories - Create a new category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "Categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/categories")]
pub async fn create_category(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
    body: web::Json<CreateCategoryDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let category = CategoryService::create(store.get_ref(), owner.id, &body).await?;

    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// PATCH /categories/{id} - Update a category
#[utoipa::path(
    patch,
    path = "/categories/{id}",
    tag = "Categories",
    params(CategoryIdPath),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[patch("/categories/{id}")]
pub async fn update_category(
    store: web::Data<dyn ExpenseStore>,
    owner: Owner,
    path: web::Path<CategoryIdPath>,
    body: web::Json<UpdateCategoryDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    body.validate_decimals()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let category =
        CategoryService::update(store.get_ref(), owner.id, path.id, &body).await?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}
