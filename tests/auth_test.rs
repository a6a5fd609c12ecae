mod common;

use serde_json::Value;

#[tokio::test]
async fn login_unknown_user_fails() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "rollNumber": "NOBODY", "password": "whatever" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn login_before_activation_signals_activation() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_student(&app.db, "21BCS001").await;

    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "rollNumber": "21BCS001", "password": "anything" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["needsActivation"], true);
}

#[tokio::test]
async fn activate_then_login_round_trip() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_student(&app.db, "21BCS002").await;

    let resp = app
        .client
        .post(app.url("/activate"))
        .json(&serde_json::json!({ "rollNumber": "21bcs002", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // New password works and yields a student token
    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "rollNumber": "21BCS002", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["role"], "student");
    assert!(!body["token"].as_str().unwrap().is_empty());

    // A wrong or blank password no longer gets in
    for bad in ["", "something-else"] {
        let resp = app
            .client
            .post(app.url("/login"))
            .json(&serde_json::json!({ "rollNumber": "21BCS002", "password": bad }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }
}

#[tokio::test]
async fn activate_twice_fails() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_student(&app.db, "21BCS003").await;

    let activate = |password: &str| {
        let body = serde_json::json!({ "rollNumber": "21BCS003", "password": password.to_string() });
        app.client.post(app.url("/activate")).json(&body).send()
    };

    assert_eq!(activate("secret123").await.unwrap().status(), 200);

    let resp = activate("other-secret").await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or already activated");
}

#[tokio::test]
async fn activate_unknown_roll_fails() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let resp = app
        .client
        .post(app.url("/activate"))
        .json(&serde_json::json!({ "rollNumber": "NOBODY", "password": "secret123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn login_roll_is_case_insensitive() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    common::seed_active_student(&app.db, "21BCS004", "secret123").await;

    let token = common::login(&app, "  21bcs004 ", "secret123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn protected_routes_require_token() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    for path in ["/my-complaints", "/complaints", "/complaints/history"] {
        let resp = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 401, "no-token GET {} should be 401", path);
    }

    let resp = app
        .client
        .get(app.url("/my-complaints"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid token");
}
