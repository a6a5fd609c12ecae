use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use hcms::config;
use hcms::services::retention::RetentionSweeper;
use hcms::services::upload::UploadConfig;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        hcms::handlers::auth::login,
        hcms::handlers::auth::activate,
        // Complaint routes
        hcms::handlers::complaint::submit_complaint,
        hcms::handlers::complaint::my_complaints,
        hcms::handlers::complaint::list_active,
        hcms::handlers::complaint::list_history,
        hcms::handlers::complaint::update_status,
        hcms::handlers::complaint::delete_complaint,
        // Roster routes
        hcms::handlers::roster::upload_students,
    ),
    components(
        schemas(
            hcms::error::AppError,
            hcms::response::MessageResponse,
            // Auth
            hcms::handlers::auth::LoginRequest,
            hcms::handlers::auth::LoginResponse,
            hcms::handlers::auth::ActivateRequest,
            // Complaints
            hcms::handlers::complaint::ComplaintResponse,
            hcms::handlers::complaint::ComplaintWithStudentResponse,
            hcms::handlers::complaint::StudentRef,
            hcms::handlers::complaint::UpdateStatusRequest,
            // Roster
            hcms::handlers::roster::ImportResponse,
        )
    ),
    tags(
        (name = "auth", description = "Login and account activation"),
        (name = "complaints", description = "Complaint lifecycle operations"),
        (name = "roster", description = "Student roster import"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hcms=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;
    hcms::utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting Hostel Complaint API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    hcms::migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    // Opt-in provisioning; a no-op when an admin already exists
    hcms::services::bootstrap_admin::ensure_bootstrap_admin(&db).await?;

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let upload_config = UploadConfig {
        upload_dir: upload_dir.clone(),
    };

    let retention_config = config::retention::RetentionConfig::from_env();
    if retention_config.enabled {
        tracing::info!(
            window_days = retention_config.window_days,
            "Retention sweeper running"
        );
        RetentionSweeper::new(db.clone(), retention_config, upload_config.clone()).spawn();
    } else {
        tracing::warn!("Retention sweeper disabled, resolved complaints are kept forever");
    }

    let app = create_app(&upload_dir)
        .layer(Extension(db))
        .layer(Extension(upload_config));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<hcms::config::jwt::JwtConfig> {
    // JWT config — validated and cached
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    // Upload directory — create if needed
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    std::fs::create_dir_all(&upload_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create upload directory '{}': {}", upload_dir, e)
    })?;

    Ok(jwt_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app(upload_dir: &str) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(hcms::routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Hostel Complaint API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
