use std::sync::Arc;
use std::time::Duration;

use api::{AppConfig, AppState, build_router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use report_core::{Classifier, KeywordCollaborator, ReportService, store::MemoryStore};
use serde_json::{Value, json};
use tower::ServiceExt;

fn config() -> AppConfig {
    AppConfig {
        api_address: "127.0.0.1:0".into(),
        database_url: None,
        ai_timeout: Duration::from_secs(5),
        auto_route: false,
        org_directory_file: None,
        notify_webhook_url: None,
    }
}

fn app_with(classifier: Classifier) -> Router {
    let service = ReportService::new(Arc::new(MemoryStore::new()), classifier);
    build_router(Arc::new(AppState::new(config(), service, None, "memory")))
}

fn keyword_app() -> Router {
    app_with(Classifier::new(
        Arc::new(KeywordCollaborator::new()),
        Duration::from_secs(5),
    ))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(req.body(body).expect("request builder should not fail"))
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body must be readable");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn submit(app: &Router, title: &str, description: &str) -> Value {
    let (status, body) = call(
        app,
        "POST",
        "/reports",
        Some(json!({ "title": title, "description": description })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn anonymous_submission_is_redacted_and_trackable() {
    let app = app_with(Classifier::disabled());
    let data = submit(&app, "Pothole", "123-45-6789 large pothole").await;
    assert_eq!(data["status"], "submitted");
    let id = data["report_id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, "GET", &format!("/reports/{id}/status"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "submitted");
    assert_eq!(body["data"]["category"], "uncategorized");
    assert_eq!(body["data"]["urgency"], "medium");
    assert!(body["data"].get("description").is_none());
}

#[tokio::test]
async fn missing_fields_and_bad_json_are_validation_errors() {
    let app = keyword_app();

    let (status, body) = call(&app, "POST", "/reports", Some(json!({ "description": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "ValidationError");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reports")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"title\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["kind"], "ValidationError");
}

#[tokio::test]
async fn lifecycle_over_http() {
    let app = keyword_app();
    let data = submit(&app, "Pothole", "Deep pothole on Main Street").await;
    assert_eq!(data["status"], "classified");
    assert_eq!(data["category"], "infrastructure");
    let id = data["report_id"].as_str().unwrap().to_string();
    let uri = format!("/reports/{id}/status");

    let (status, body) = call(&app, "PATCH", &uri, Some(json!({ "status": "resolved" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "InvalidTransition");
    assert_eq!(body["error"]["details"][0]["path"], "status");

    let (status, body) = call(&app, "PATCH", &uri, Some(json!({ "status": "routed" }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["organization"], "Municipal Public Works");

    for step in ["in-progress", "resolved"] {
        let (status, body) = call(&app, "PATCH", &uri, Some(json!({ "status": step }))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], step);
    }

    let (_, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(body["data"]["status"], "resolved");

    let (status, body) = call(&app, "PATCH", &uri, Some(json!({ "status": "closed" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["path"], "status");

    let (status, body) = call(
        &app,
        "GET",
        "/organizations/Municipal%20Public%20Works/reports?limit=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], id);
}

#[tokio::test]
async fn unknown_ids_and_organizations_are_not_found() {
    let app = keyword_app();
    let (status, body) = call(&app, "GET", "/reports/nope/status", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "NotFound");

    let (status, body) = call(&app, "GET", "/organizations/Nobody/reports", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "NotFound");
}

#[tokio::test]
async fn duplicates_show_up_in_analytics() {
    let app = keyword_app();
    let first = submit(&app, "Burst pipe", "Water pipe burst near Central Market").await;
    let second = submit(&app, "Burst  pipe", "water pipe burst near Central Market ").await;
    assert_eq!(second["duplicate_of"], first["report_id"]);

    let (status, body) = call(&app, "GET", "/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    let m = &body["data"];
    assert_eq!(m["totalReports"], 2);
    assert_eq!(m["uniqueReports"], 1);
    assert_eq!(m["duplicateReports"], 1);
    assert_eq!(m["avgResolutionTime"], 0.0);
}

#[tokio::test]
async fn public_listing_is_redacted_and_filtered() {
    let app = keyword_app();
    let data = submit(&app, "Contact me at jane@example.com", "Broken streetlight near Park Lane").await;
    let id = data["report_id"].as_str().unwrap().to_string();
    let uri = format!("/reports/{id}/status");
    for step in ["routed", "in-progress"] {
        let (status, body) = call(&app, "PATCH", &uri, Some(json!({ "status": step }))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
    submit(&app, "Garbage pile", "Nobody collects the trash").await;

    let (status, body) = call(&app, "GET", "/public/reports", None).await;
    assert_eq!(status, StatusCode::OK);
    let reports = body["data"]["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(!reports[0]["title"].as_str().unwrap().contains("jane@example.com"));
    assert_eq!(body["data"]["page_size"], 25);
    assert!(body["data"]["next_offset"].is_null());

    let (_, body) = call(&app, "GET", "/public/reports?status=resolved", None).await;
    assert!(body["data"]["reports"].as_array().unwrap().is_empty());

    let (_, body) = call(&app, "GET", "/public/reports?search=STREETLIGHT", None).await;
    assert_eq!(body["data"]["reports"].as_array().unwrap().len(), 1);

    let (status, body) = call(&app, "GET", "/public/reports?status=submitted", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "ValidationError");
}

#[tokio::test]
async fn insights_never_fail() {
    let app = app_with(Classifier::disabled());
    let (status, body) = call(&app, "POST", "/analytics/insights", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body["data"]["insights"].as_str().unwrap();
    assert!(text.contains("unavailable"), "{text}");

    let app = keyword_app();
    let (status, body) = call(
        &app,
        "POST",
        "/analytics/insights",
        Some(json!({ "metrics": { "totalReports": 3, "uniqueReports": 3 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["data"]["insights"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn directory_and_health() {
    let app = keyword_app();
    let (status, body) = call(&app, "GET", "/organizations", None).await;
    assert_eq!(status, StatusCode::OK);
    let orgs = body["data"].as_array().unwrap();
    assert_eq!(orgs.len(), 5);
    assert!(orgs.iter().all(|o| o.get("type").is_some()));

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
    assert_eq!(body["data"]["collaborator"], "keyword");
    assert!(body["data"].get("llm").is_none());
}
