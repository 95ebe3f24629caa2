//! Bearer token extraction and verification at the gate

mod helpers;

use axum::http::StatusCode;
use helpers::{spawn_app, JWT_SECRET};
use iam_core::{TokenCodec, UserId};
use iam_web::auth::JwtCodec;
use serde_json::json;

const INVALID_TOKEN: &str = "The access token is not valid";

fn permission_body() -> serde_json::Value {
    json!({ "name": "permission_test", "description": "a description" })
}

#[tokio::test]
async fn missing_or_malformed_header_is_rejected() {
    let app = spawn_app().await;
    let token = app.superadmin_token().await;

    let missing = app
        .send_raw("POST", "/permissions", Some(permission_body()), None)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), INVALID_TOKEN);

    for header in [
        "".to_string(),
        "Bearer".to_string(),
        token.clone(),
        format!("bearer {}", token),
        format!("Basic {}", token),
        format!("Bearer {} extra", token),
    ] {
        let response = app
            .send_raw("POST", "/permissions", Some(permission_body()), Some(&header))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{header:?}");
        assert_eq!(response.message(), INVALID_TOKEN, "{header:?}");
    }

    // Nothing was created by the rejected requests
    assert_eq!(
        app.get("/permissions").await.body["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["name"] == "permission_test")
            .count(),
        0
    );
}

#[tokio::test]
async fn forged_tokens_are_rejected() {
    let app = spawn_app().await;

    let other_secret = JwtCodec::new(b"some-other-secret").issue(UserId(1)).unwrap();
    for token in [other_secret.as_str(), "garbage", "a.b.c"] {
        let response = app
            .send("POST", "/permissions", Some(permission_body()), Some(token))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{token}");
        assert_eq!(response.message(), INVALID_TOKEN, "{token}");
    }
}

#[tokio::test]
async fn tokens_signed_with_configured_secret_pass_the_gate() {
    let app = spawn_app().await;
    let superadmin = app
        .state
        .directory
        .get_by_username(helpers::SUPERADMIN, false)
        .await
        .unwrap();

    // Any token carrying the id and the right signature is accepted
    let token = JwtCodec::new(JWT_SECRET.as_bytes())
        .issue(superadmin.id)
        .unwrap();
    let response = app
        .send("POST", "/permissions", Some(permission_body()), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
}

#[tokio::test]
async fn gate_runs_before_body_validation() {
    let app = spawn_app().await;
    let response = app
        .send_raw("POST", "/permissions", Some(json!("not an object")), None)
        .await;
    assert_eq!(response.message(), INVALID_TOKEN);
}

#[tokio::test]
async fn reads_do_not_require_a_token() {
    let app = spawn_app().await;

    for uri in ["/permissions", "/permissions/1", "/users", "/users/superadmin"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
    }
    assert_eq!(
        app.get("/users/superadmin/permissions").await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn a_garbage_header_on_an_open_route_is_ignored() {
    let app = spawn_app().await;
    let response = app
        .send_raw("GET", "/users", None, Some("Bearer not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
