mod common;

use serde_json::Value;

async fn upload_csv(app: &common::TestApp, token: &str, csv: &'static str) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(csv.as_bytes())
        .file_name("students.csv")
        .mime_str("text/csv")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    app.client
        .post(app.url("/upload-students"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to upload roster")
}

#[tokio::test]
async fn import_replaces_roster() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_active_student(&app.db, "OLD001", "old-secret").await;
    common::seed_admin(&app.db, "WARDEN10", "admin-secret").await;
    let admin = common::login(&app, "WARDEN10", "admin-secret").await;

    let resp = upload_csv(
        &app,
        &admin,
        "name,rollNumber,password,gender,roomNumber,mobile\n\
         Asha,21bcs001,welcome1,F,B12,9999900001\n\
         Ravi,21bcs002,welcome2,M,B14,9999900002\n",
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 2);

    // The old roster is gone
    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "rollNumber": "OLD001", "password": "old-secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Imported students exist but are inactive until they set a password
    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "rollNumber": "21BCS001", "password": "welcome1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["needsActivation"], true);

    // Imported accounts carry no password hash until activation
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    let imported = hcms::models::User::find()
        .filter(hcms::models::user::Column::RollNumber.eq("21BCS001"))
        .one(&app.db)
        .await
        .unwrap()
        .expect("imported student missing");
    assert!(imported.password_hash.is_none());
    assert!(!imported.is_active);

    // The admin account survives a roster replace
    common::login(&app, "WARDEN10", "admin-secret").await;
}

#[tokio::test]
async fn import_with_no_valid_rows_keeps_roster() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_active_student(&app.db, "OLD002", "old-secret").await;
    common::seed_admin(&app.db, "WARDEN11", "admin-secret").await;
    let admin = common::login(&app, "WARDEN11", "admin-secret").await;

    let resp = upload_csv(
        &app,
        &admin,
        "rollNumber,password,roomNumber\n,missing-roll,B12\n21bcs009,,B13\n",
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "No valid student rows");

    // The destructive replace never started: the old student still logs in
    common::login(&app, "OLD002", "old-secret").await;
}

#[tokio::test]
async fn import_skips_incomplete_rows() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_admin(&app.db, "WARDEN12", "admin-secret").await;
    let admin = common::login(&app, "WARDEN12", "admin-secret").await;

    let resp = upload_csv(
        &app,
        &admin,
        "rollNumber,password,roomNumber\n\
         21bcs001,welcome1,B12\n\
         21bcs002,welcome2,\n\
         21bcs003,welcome3,B15\n",
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn import_missing_column_fails() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_admin(&app.db, "WARDEN13", "admin-secret").await;
    let admin = common::login(&app, "WARDEN13", "admin-secret").await;

    let resp = upload_csv(&app, &admin, "name,rollNumber,roomNumber\nAsha,21bcs001,B12\n").await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn import_requires_admin() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_active_student(&app.db, "21BCS020", "secret123").await;
    let student = common::login(&app, "21BCS020", "secret123").await;

    let resp = upload_csv(
        &app,
        &student,
        "rollNumber,password,roomNumber\n21bcs001,welcome1,B12\n",
    )
    .await;
    assert_eq!(resp.status(), 403);
}
