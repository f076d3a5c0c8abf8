//! Webhook receiver tests
//!
//! Drives the full server router with realistic deliveries.

mod common;

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use vemix_web::config::VertexConfig;
use vemix_web::cors::{cors_layer, cors_layer_permissive};
use vemix_web::handlers::{app_router, ServiceInfo};
use vemix_web::veo::ProxyState;
use vemix_web::webhook::{
    CreditGrant, CreditPolicy, EventProcessor, RenewalHandler, WebhookState, WEBHOOK_PATH,
};
use vemix_web::EventType;

/// Records every grant it receives
#[derive(Default)]
struct RecordingHandler {
    grants: Mutex<Vec<CreditGrant>>,
    fail: bool,
}

#[async_trait::async_trait]
impl RenewalHandler for RecordingHandler {
    async fn on_renewal(&self, grant: &CreditGrant) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("credit store unavailable");
        }
        self.grants.lock().unwrap().push(grant.clone());
        Ok(())
    }
}

fn app_with_cors(handler: Arc<RecordingHandler>, cors: CorsLayer) -> Router {
    let processor = EventProcessor::new(handler, CreditPolicy::default());
    let vertex = VertexConfig::default().with_base_url("http://127.0.0.1:9");
    app_router(
        Arc::new(WebhookState::new(processor)),
        Arc::new(ProxyState::new(vertex).unwrap()),
        ServiceInfo::default(),
        cors,
    )
}

fn app(handler: Arc<RecordingHandler>) -> Router {
    app_with_cors(handler, cors_layer_permissive())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(WEBHOOK_PATH)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_weekly_renewal_grants_ten_credits() {
    let handler = Arc::new(RecordingHandler::default());
    let (status, body) = send(
        app(handler.clone()),
        post(&common::payload(EventType::Renewal, "com.vemix.weekly")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");
    assert_eq!(body["event_id"], "evt_renewal");
    assert_eq!(body["credits_granted"], 10);

    let grants = handler.grants.lock().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].app_user_id, "C4FD158C-48A9-4BEC-9E00-3364D7E7DDFF");
    assert_eq!(grants[0].product_id, "com.vemix.weekly");
    assert_eq!(grants[0].credits, 10);
    assert_eq!(grants[0].renewal_number, Some(2));
}

#[tokio::test]
async fn test_yearly_renewal_grants_sixty_credits() {
    let handler = Arc::new(RecordingHandler::default());
    let (status, body) = send(
        app(handler.clone()),
        post(&common::payload(EventType::Renewal, "com.vemix.yearly")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credits_granted"], 60);
    assert_eq!(handler.grants.lock().unwrap()[0].credits, 60);
}

#[tokio::test]
async fn test_unknown_product_grants_nothing() {
    let handler = Arc::new(RecordingHandler::default());
    let (status, body) = send(
        app(handler.clone()),
        post(&common::payload(EventType::Renewal, "com.vemix.monthly")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");
    assert_eq!(body["credits_granted"], 0);
    assert!(handler.grants.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_event_types_are_ignored() {
    for event_type in EventType::ALL {
        if event_type == EventType::Renewal {
            continue;
        }

        let handler = Arc::new(RecordingHandler::default());
        let (status, body) = send(
            app(handler.clone()),
            post(&common::payload(event_type, "com.vemix.weekly")),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{}", event_type);
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["event_type"], event_type.as_str());
        assert!(handler.grants.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_handler_failure_is_internal_error() {
    let handler = Arc::new(RecordingHandler {
        fail: true,
        ..RecordingHandler::default()
    });
    let (status, body) = send(
        app(handler),
        post(&common::payload(EventType::Renewal, "com.vemix.weekly")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_malformed_renewal_rejected() {
    let mut payload = common::payload(EventType::Renewal, "com.vemix.weekly");
    payload["event"].as_object_mut().unwrap().remove("product_id");

    let handler = Arc::new(RecordingHandler::default());
    let (status, body) = send(app(handler.clone()), post(&payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("product_id"));
    assert!(handler.grants.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_route() {
    let (status, body) = send(
        app(Arc::new(RecordingHandler::default())),
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_info_route() {
    let (status, body) = send(
        app(Arc::new(RecordingHandler::default())),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert_eq!(body["service"], "Vertex AI Veo Proxy");
    assert_eq!(body["supported_models"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_cross_origin_delivery_allowed() {
    let request = Request::builder()
        .method("POST")
        .uri(WEBHOOK_PATH)
        .header("origin", "https://dashboard.example.com")
        .header("content-type", "application/json")
        .body(Body::from(
            common::payload(EventType::Renewal, "com.vemix.weekly").to_string(),
        ))
        .unwrap();

    let response = app(Arc::new(RecordingHandler::default()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_strict_cors_rejects_foreign_origin() {
    let request = |origin: &str| {
        Request::builder()
            .method("POST")
            .uri(WEBHOOK_PATH)
            .header("origin", origin)
            .header("content-type", "application/json")
            .body(Body::from(
                common::payload(EventType::Renewal, "com.vemix.weekly").to_string(),
            ))
            .unwrap()
    };

    let response = app_with_cors(Arc::new(RecordingHandler::default()), cors_layer())
        .oneshot(request("https://dashboard.example.com"))
        .await
        .unwrap();
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());

    let response = app_with_cors(Arc::new(RecordingHandler::default()), cors_layer())
        .oneshot(request("http://localhost:5173"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_proxy_routes_mounted() {
    let request = Request::builder()
        .method("POST")
        .uri("/check-operation")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(app(Arc::new(RecordingHandler::default())), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "operationName is required");
}
