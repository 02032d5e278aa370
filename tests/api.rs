//! End-to-end tests for the evolution API, driven through the router.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use schemaflow_evolution::config::Settings;
use schemaflow_evolution::routes::create_router;
use schemaflow_evolution::state::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    let settings = Settings::default();
    create_router(Arc::new(AppState::new(&settings)), &settings)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn record(app: &Router, source: Uuid, columns: Value) -> Value {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/sources/{}/versions", source),
        Some(json!({ "columns": columns })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["version"].clone()
}

fn columns_of(body: &Value) -> Vec<(String, String)> {
    body["diff"]["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["column"].as_str().unwrap().to_string(),
                r["change"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn health_check_responds() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn default_diff_compares_two_newest_versions() {
    let app = app();
    let source = Uuid::new_v4();

    record(&app, source, json!([{ "name": "id", "type": "int" }])).await;
    let v2 = record(
        &app,
        source,
        json!([
            { "name": "id", "type": "int" },
            { "name": "age", "type": "int", "nullable": true }
        ]),
    )
    .await;
    let v3 = record(
        &app,
        source,
        json!([
            { "name": "id", "type": "string" },
            { "name": "age", "type": "int", "nullable": false },
            { "name": "email", "type": "string" }
        ]),
    )
    .await;

    let (status, body) = send(&app, "GET", &format!("/api/sources/{}/diff", source), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    assert_eq!(body["pair"]["left"], v2["id"]);
    assert_eq!(body["pair"]["right"], v3["id"]);
    assert_eq!(body["diff"]["fromVersion"], 2);
    assert_eq!(body["diff"]["toVersion"], 3);
    assert_eq!(
        columns_of(&body),
        vec![
            ("email".to_string(), "added".to_string()),
            ("id".to_string(), "type_changed".to_string()),
            ("age".to_string(), "constraint_changed".to_string()),
        ]
    );
    assert_eq!(
        body["diff"]["summary"],
        json!({
            "added": 1,
            "removed": 0,
            "typeChanged": 1,
            "constraintChanged": 1,
            "unchanged": 0,
            "breaking": 2
        })
    );
    assert_eq!(body["diff"]["hasBreakingChanges"], true);
}

#[tokio::test]
async fn swap_and_show_unchanged_are_honoured() {
    let app = app();
    let source = Uuid::new_v4();

    record(&app, source, json!([{ "name": "id", "type": "int" }, { "name": "email", "type": "string" }])).await;
    record(&app, source, json!([{ "name": "id", "type": "int" }])).await;

    let (_, forward) = send(&app, "GET", &format!("/api/sources/{}/diff", source), None).await;
    assert_eq!(columns_of(&forward), vec![("email".to_string(), "removed".to_string())]);

    let (status, swapped) = send(
        &app,
        "GET",
        &format!("/api/sources/{}/diff?swap=true&showUnchanged=true", source),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        columns_of(&swapped),
        vec![
            ("email".to_string(), "added".to_string()),
            ("id".to_string(), "unchanged".to_string()),
        ]
    );
    assert_eq!(swapped["diff"]["summary"]["breaking"], 0);
}

#[tokio::test]
async fn single_version_needs_a_second() {
    let app = app();
    let source = Uuid::new_v4();
    record(&app, source, json!([{ "name": "id", "type": "int" }])).await;

    let (status, body) = send(&app, "GET", &format!("/api/sources/{}/diff", source), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SELECTION");
    assert_eq!(body["message"], "Need a second schema version to compare against");
}

#[tokio::test]
async fn same_version_on_both_sides_is_rejected() {
    let app = app();
    let source = Uuid::new_v4();
    let v1 = record(&app, source, json!([{ "name": "id", "type": "int" }])).await;
    record(&app, source, json!([{ "name": "id", "type": "int" }])).await;

    let id = v1["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/sources/{}/diff?left={}&right={}", source, id, id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SELECTION");
}

#[tokio::test]
async fn duplicate_columns_are_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sources/{}/versions", Uuid::new_v4()),
        Some(json!({ "columns": [{ "name": "id", "type": "int" }, { "name": "id", "type": "int" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn empty_column_name_is_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sources/{}/versions", Uuid::new_v4()),
        Some(json!({ "columns": [{ "name": "", "type": "int" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn versions_listing_and_lookup() {
    let app = app();
    let source = Uuid::new_v4();
    let v1 = record(&app, source, json!([{ "name": "id", "type": "int" }])).await;
    let v2 = record(&app, source, json!([])).await;

    let (status, list) = send(&app, "GET", &format!("/api/sources/{}/versions", source), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["versions"][0]["versionNumber"], 2);
    assert_eq!(list["versions"][0]["columnCount"], 0);
    assert_eq!(list["versions"][1]["versionNumber"], 1);
    assert_eq!(list["defaultPair"], json!({ "left": v1["id"], "right": v2["id"] }));

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/api/sources/{}/versions/{}", source, v1["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["version"], v1);

    let (status, by_number) =
        send(&app, "GET", &format!("/api/sources/{}/versions/number/2", source), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_number["version"], v2);

    let (status, _) =
        send(&app, "GET", &format!("/api/sources/{}/versions/{}", source, Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn prune_keeps_newest_versions() {
    let app = app();
    let source = Uuid::new_v4();
    for _ in 0..3 {
        record(&app, source, json!([{ "name": "id", "type": "int" }])).await;
    }

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sources/{}/prune", source),
        Some(json!({ "keep": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "removed": 2, "remaining": 1 }));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sources/{}/prune", source),
        Some(json!({ "keep": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inline_compare_handles_missing_sides() {
    let app = app();

    let (status, body) = send(&app, "POST", "/api/diff", Some(json!({ "left": null, "right": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diff"]["records"], json!([]));
    assert_eq!(body["diff"]["summary"]["added"], 0);

    let (status, body) = send(
        &app,
        "POST",
        "/api/diff",
        Some(json!({
            "left": { "columns": [
                { "name": "email", "type": "string", "constraints": ["unique", "not_null"] },
                { "name": "phone", "type": "string" }
            ]},
            "right": { "columns": [
                { "name": "email", "type": "string", "constraints": ["not_null", "unique"] }
            ]},
            "showUnchanged": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        columns_of(&body),
        vec![
            ("phone".to_string(), "removed".to_string()),
            ("email".to_string(), "unchanged".to_string()),
        ]
    );
    assert_eq!(body["diff"]["records"][0]["breaking"], true);
    assert_eq!(body["diff"]["records"][0]["label"], "Removed");
    assert_eq!(body["diff"]["summary"]["removed"], 1);
    assert_eq!(body["diff"]["summary"]["breaking"], 1);
}
