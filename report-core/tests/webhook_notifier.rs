use std::sync::Arc;
use std::time::Duration;

use report_core::store::{MemoryStore, ReportStore};
use report_core::{
    Classifier, DEFAULT_AI_TIMEOUT, KeywordCollaborator, NewReport, Notifier, NotifyError,
    OrganizationDirectory, ReportService, ReportStatus, StaticDirectory, WebhookNotifier,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn burst_pipe() -> NewReport {
    NewReport {
        title: "Burst water pipe".into(),
        description: "Water pipe leak flooding the road near Moi Avenue".into(),
        ..Default::default()
    }
}

fn service_with(webhook: WebhookNotifier) -> ReportService {
    ReportService::new(
        Arc::new(MemoryStore::new()),
        Classifier::new(Arc::new(KeywordCollaborator::new()), DEFAULT_AI_TIMEOUT),
    )
    .with_notifier(Arc::new(webhook))
}

#[tokio::test]
async fn routing_posts_to_the_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/routing"))
        .and(body_partial_json(json!({
            "to": "water@city.gov",
            "organization": "City Water Department",
            "category": "water",
            "urgency": "low",
            "locations": ["Moi Avenue"]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let webhook =
        WebhookNotifier::new(&format!("{}/hooks/routing", server.uri()), Duration::from_secs(2))
            .unwrap();
    let svc = service_with(webhook);
    let out = svc.submit_report(burst_pipe()).await.unwrap();

    let change = svc
        .update_status(&out.report_id, ReportStatus::Routed)
        .await
        .unwrap();
    assert_eq!(change.organization.as_deref(), Some("City Water Department"));

    // later steps do not notify again
    svc.update_status(&out.report_id, ReportStatus::InProgress)
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_delivery_does_not_block_routing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("relay down"))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service_with(WebhookNotifier::new(&server.uri(), Duration::from_secs(2)).unwrap());
    let out = svc.submit_report(burst_pipe()).await.unwrap();

    let change = svc
        .update_status(&out.report_id, ReportStatus::Routed)
        .await
        .unwrap();
    assert_eq!(change.status, ReportStatus::Routed);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("relay down"))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let svc = ReportService::new(store.clone(), Classifier::disabled());
    let out = svc.submit_report(burst_pipe()).await.unwrap();
    let report = store.find_by_id(&out.report_id).await.unwrap().unwrap();
    let org = StaticDirectory::builtin()
        .find("City Water Department")
        .unwrap();

    let webhook = WebhookNotifier::new(&server.uri(), Duration::from_secs(2)).unwrap();
    let err = webhook.report_routed(&report, &org).await.unwrap_err();
    assert!(matches!(
        err,
        NotifyError::Rejected { status: 503, ref snippet } if snippet == "relay down"
    ));
}
