use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use resume_client::{ClientConfig, GeneratedResume, RestErrorKind, ResumeService};
use sonic_rs::{JsonValueTrait, Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct AppState {
    hits: Arc<AtomicUsize>,
}

#[tokio::test]
async fn e2e_generate_resume_roundtrip() {
    let server = TestServer::start(Router::new().route("/api/v1/resume/generate", post(echo_handler))).await;
    let service = ResumeService::from_config(&ClientConfig::new(server.base_url.clone()));

    let body = service
        .generate_resume("Senior backend engineer, 5 years Go")
        .await
        .expect("local server should answer");

    assert_eq!(
        body,
        json!({"resume": "Senior backend engineer, 5 years Go"})
    );
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn e2e_typed_response() {
    let server = TestServer::start(Router::new().route("/api/v1/resume/generate", post(echo_handler))).await;
    let service = ResumeService::from_config(&ClientConfig::new(format!("{}/", server.base_url)));

    let generated: GeneratedResume = service
        .generate_resume_as("Data engineer")
        .await
        .expect("typed response should parse");

    assert_eq!(generated.resume, "Data engineer");
}

#[tokio::test]
async fn e2e_service_unavailable_is_not_retried() {
    let server =
        TestServer::start(Router::new().route("/api/v1/resume/generate", post(unavailable_handler))).await;
    let service = ResumeService::from_config(&ClientConfig::new(server.base_url.clone()));

    let err = service
        .generate_resume("anything")
        .await
        .expect_err("503 should fail the call");

    assert_eq!(err.kind(), RestErrorKind::Rejected);
    assert_eq!(err.status(), Some(503));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn e2e_connection_refused_is_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let service = ResumeService::from_config(&ClientConfig::new(format!("http://{addr}")));
    let err = service
        .generate_resume("anything")
        .await
        .expect_err("closed port should refuse the connection");

    assert_eq!(err.kind(), RestErrorKind::Connect);
}

struct TestServer {
    base_url: String,
    state: AppState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(router: Router<AppState>) -> Self {
        let state = AppState::default();
        let app = router.with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            task,
        }
    }

    fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn echo_handler(State(state): State<AppState>, body: Bytes) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let request: Value = match sonic_rs::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid json".to_string()),
    };
    let description = request["userDescription"].as_str().unwrap_or_default();
    let response = sonic_rs::to_string(&json!({ "resume": description }))
        .unwrap_or_default();
    (StatusCode::OK, response)
}

async fn unavailable_handler(State(state): State<AppState>) -> (StatusCode, &'static str) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::SERVICE_UNAVAILABLE, "service unavailable")
}
