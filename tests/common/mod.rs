#![allow(dead_code)]

use hcms::models::{normalize_roll, user, ComplaintStatus, Role};
use reqwest::Client;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        if std::env::var("JWT_SECRET").is_err() {
            std::env::set_var(
                "JWT_SECRET",
                "integration_test_secret_that_is_at_least_32_chars",
            );
        }
        let config = hcms::config::jwt::JwtConfig::from_env().unwrap();
        let _ = hcms::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.addr, path)
    }
}

/// Spin up the app against the test database on a random port.
/// Returns None (and the suite skips) when no database is configured.
pub async fn spawn_app() -> Option<TestApp> {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        hcms::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    cleanup_tables(&db).await;

    let upload_config = hcms::services::upload::UploadConfig {
        upload_dir: "./test_uploads".to_string(),
    };

    let app = axum::Router::new()
        .merge(hcms::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    Some(TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    })
}

async fn cleanup_tables(db: &DatabaseConnection) {
    for table in ["complaints", "users"] {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Insert a student as the roster import would: inactive, no password.
pub async fn seed_student(db: &DatabaseConnection, roll: &str) -> i32 {
    insert_user(db, roll, Role::Student, None, false).await
}

/// Insert a student that has already activated with `password`.
pub async fn seed_active_student(db: &DatabaseConnection, roll: &str, password: &str) -> i32 {
    let hash = hcms::utils::hash_password(password).unwrap();
    insert_user(db, roll, Role::Student, Some(hash), true).await
}

pub async fn seed_admin(db: &DatabaseConnection, roll: &str, password: &str) -> i32 {
    let hash = hcms::utils::hash_password(password).unwrap();
    insert_user(db, roll, Role::Admin, Some(hash), true).await
}

async fn insert_user(
    db: &DatabaseConnection,
    roll: &str,
    role: Role,
    password_hash: Option<String>,
    is_active: bool,
) -> i32 {
    let now = chrono::Utc::now().naive_utc();
    let model = user::ActiveModel {
        roll_number: sea_orm::ActiveValue::Set(normalize_roll(roll)),
        name: sea_orm::ActiveValue::Set(None),
        room_number: sea_orm::ActiveValue::Set(Some("B12".to_string())),
        mobile: sea_orm::ActiveValue::Set(None),
        gender: sea_orm::ActiveValue::Set(None),
        password_hash: sea_orm::ActiveValue::Set(password_hash),
        role: sea_orm::ActiveValue::Set(role.as_str().to_string()),
        is_active: sea_orm::ActiveValue::Set(is_active),
        created_at: sea_orm::ActiveValue::Set(now),
        updated_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };
    model.insert(db).await.expect("Failed to seed user").id
}

/// Insert a complaint directly, bypassing the API. `age_days` backdates
/// both timestamps so retention behavior can be exercised.
pub async fn seed_complaint(
    db: &DatabaseConnection,
    student_id: i32,
    status: ComplaintStatus,
    age_days: i64,
    image_path: Option<String>,
) -> i32 {
    use hcms::models::complaint;

    let stamp = chrono::Utc::now().naive_utc() - chrono::Duration::days(age_days);
    let model = complaint::ActiveModel {
        title: sea_orm::ActiveValue::Set("No water".to_string()),
        category: sea_orm::ActiveValue::Set("water".to_string()),
        description: sea_orm::ActiveValue::Set("No water since morning".to_string()),
        room_number: sea_orm::ActiveValue::Set("B12".to_string()),
        location: sea_orm::ActiveValue::Set("Hostel".to_string()),
        image_path: sea_orm::ActiveValue::Set(image_path),
        status: sea_orm::ActiveValue::Set(status.as_str().to_string()),
        student_id: sea_orm::ActiveValue::Set(student_id),
        created_at: sea_orm::ActiveValue::Set(stamp),
        updated_at: sea_orm::ActiveValue::Set(stamp),
        ..Default::default()
    };
    model.insert(db).await.expect("Failed to seed complaint").id
}

/// Log in via the API and return the bearer token.
pub async fn login(app: &TestApp, roll: &str, password: &str) -> String {
    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "rollNumber": roll, "password": password }))
        .send()
        .await
        .expect("Failed to call login");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse login response");
    assert_eq!(status, 200, "login failed for '{}': {}", roll, body);

    body["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string()
}

/// Submit a complaint through the multipart endpoint.
pub async fn submit_complaint(app: &TestApp, token: &str, title: &str) -> reqwest::Response {
    let form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("category", "water")
        .text("description", "No water since morning")
        .text("roomNumber", "B12")
        .text("location", "Hostel");

    app.client
        .post(app.url("/complaints"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to submit complaint")
}
