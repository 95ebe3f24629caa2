//! Permission endpoints, including protected system permissions

mod helpers;

use axum::http::StatusCode;
use helpers::spawn_app;
use serde_json::json;

#[tokio::test]
async fn create_get_update_delete() {
    let app = spawn_app().await;
    let token = app.superadmin_token().await;

    let created = app.create_permission(&token, "permission_test").await;
    assert_eq!(created.status, StatusCode::CREATED);
    let permission = &created.body["permission"];
    assert_eq!(permission["deletable"], true);
    assert_eq!(permission["editable"], true);
    let id = permission["id"].as_i64().unwrap();
    assert_eq!(
        created.location(),
        Some(format!("/permissions/{}", id).as_str())
    );

    let fetched = app.get(&format!("/permissions/{}", id)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["permission"]["name"], "permission_test");

    let updated = app
        .send(
            "PUT",
            &format!("/permissions/{}", id),
            Some(json!({ "name": "renamed_test" })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    assert_eq!(updated.body["permission"]["name"], "renamed_test");
    assert_eq!(updated.body["permission"]["description"], "a description");

    let deleted = app
        .send("DELETE", &format!("/permissions/{}", id), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({}));

    let gone = app.get(&format!("/permissions/{}", id)).await;
    assert_eq!(gone.status, StatusCode::BAD_REQUEST);
    assert_eq!(gone.message(), "The permission does not exist");
}

#[tokio::test]
async fn system_permissions_are_protected() {
    let app = spawn_app().await;
    let token = app.superadmin_token().await;

    let listed = app.get("/permissions").await;
    let system = listed.body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "delete_permission")
        .cloned()
        .unwrap();
    assert_eq!(system["deletable"], false);
    assert_eq!(system["editable"], false);
    let uri = format!("/permissions/{}", system["id"]);

    let update = app
        .send(
            "PUT",
            &uri,
            Some(json!({ "description": "a new description" })),
            Some(&token),
        )
        .await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);
    assert_eq!(update.message(), "The permission cannot be edited");

    let delete = app.send("DELETE", &uri, None, Some(&token)).await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
    assert_eq!(delete.message(), "The permission cannot be deleted");

    assert_eq!(app.get(&uri).await.body["permission"], system);
}

#[tokio::test]
async fn duplicate_and_invalid_names_are_rejected() {
    let app = spawn_app().await;
    let token = app.superadmin_token().await;

    assert_eq!(
        app.create_permission(&token, "permission_test").await.status,
        StatusCode::CREATED
    );
    assert_eq!(
        app.create_permission(&token, "permission_test").await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.create_permission(&token, "create_permission").await.status,
        StatusCode::BAD_REQUEST
    );

    let too_long = "x".repeat(26);
    for bad in ["abc", "has space", "dash-name", too_long.as_str()] {
        let response = app.create_permission(&token, bad).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{bad}");
    }

    let short_description = app
        .send(
            "POST",
            "/permissions",
            Some(json!({ "name": "valid_name", "description": "short" })),
            Some(&token),
        )
        .await;
    assert_eq!(short_description.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rename_onto_existing_name_conflicts() {
    let app = spawn_app().await;
    let token = app.superadmin_token().await;

    app.create_permission(&token, "first_one").await;
    let second = app.create_permission(&token, "second_one").await;
    let id = second.body["permission"]["id"].as_i64().unwrap();

    let response = app
        .send(
            "PUT",
            &format!("/permissions/{}", id),
            Some(json!({ "name": "first_one" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Keeping the same name while changing the description is fine
    let response = app
        .send(
            "PUT",
            &format!("/permissions/{}", id),
            Some(json!({ "name": "second_one", "description": "another description" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn mutations_require_matching_permission() {
    let app = spawn_app().await;
    let admin = app.superadmin_token().await;
    let (token, _) = app.new_user("meli", "meli").await;

    let created = app.create_permission(&admin, "permission_test").await;
    let uri = format!("/permissions/{}", created.body["permission"]["id"]);

    // update_permission alone does not allow deleting
    app.grant(&admin, "meli", "update_permission").await;
    let update = app
        .send("PUT", &uri, Some(json!({ "name": "renamed_test" })), Some(&token))
        .await;
    assert_eq!(update.status, StatusCode::OK);

    let delete = app.send("DELETE", &uri, None, Some(&token)).await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        delete.message(),
        "You do not have sufficient permissions to perform this action"
    );
}

#[tokio::test]
async fn non_numeric_permission_id_is_rejected() {
    let app = spawn_app().await;
    let response = app.get("/permissions/abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "The permission id must be a number");
}
