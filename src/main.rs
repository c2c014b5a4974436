use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use expense_ledger::config::AppConfig;
use expense_ledger::openapi::ApiDoc;
use expense_ledger::store::{ExpenseStore, PgStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    // Configure connection pool with production-ready settings
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to create pool: {e}");
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
        })?;

    let store: Arc<dyn ExpenseStore> = Arc::new(PgStore::new(pool));
    let store = web::Data::from(store);
    let reporting = web::Data::new(config.reporting_offset);
    let jwt_secret = web::Data::new(config.jwt_secret.clone());
    let allowed_origins = config.allowed_origins.clone();

    info!(
        host = %config.host,
        port = config.port,
        reporting_offset = config.reporting_offset.seconds(),
        "Starting server"
    );

    HttpServer::new(move || {
        let allowed_origins = allowed_origins.clone();

        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origin_str = origin.to_str().unwrap_or("");
                allowed_origins.iter().any(|allowed| allowed == origin_str)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Middleware (order matters: outer to inner)
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Shared state
            .app_data(store.clone())
            .app_data(reporting.clone())
            .app_data(jwt_secret.clone())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .configure(expense_ledger::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
