//! End-to-end dispatch tests.
//!
//! Raw requests go through the real route table and `Dispatcher::dispatch`,
//! backed by the mock provider and the in-memory adapters.

use std::sync::Arc;

use assistant_gateway::adapters::ai::MockAssistantProvider;
use assistant_gateway::adapters::http::{CorsPolicy, Dispatcher};
use assistant_gateway::adapters::observability::RecordingErrorReporter;
use assistant_gateway::adapters::{InMemoryAccountStore, InMemoryThreadRepository};
use assistant_gateway::application::{build_registry, GatewayServices, PollerSettings, ProviderSource};
use assistant_gateway::domain::assistant::RunStatus;
use assistant_gateway::domain::foundation::ThreadId;
use assistant_gateway::ports::{AssistantProvider, AssistantSpec, ThreadRepository};
use http::{Request, Response, StatusCode};
use serde_json::{json, Value};

struct Gateway {
    dispatcher: Dispatcher,
    provider: MockAssistantProvider,
    threads: Arc<InMemoryThreadRepository>,
    reporter: Arc<RecordingErrorReporter>,
}

fn gateway_with(providers: ProviderSource, provider: MockAssistantProvider) -> Gateway {
    let threads = Arc::new(InMemoryThreadRepository::new());
    let reporter = Arc::new(RecordingErrorReporter::new());

    let services = GatewayServices {
        providers,
        accounts: Arc::new(InMemoryAccountStore::new()),
        threads: threads.clone(),
        reporter: reporter.clone(),
        assistant: AssistantSpec {
            name: "Math Tutor".to_string(),
            model: "gpt-4".to_string(),
            instructions: "You are a personal math tutor.".to_string(),
            tools: vec!["code_interpreter".to_string()],
        },
        run_instructions: None,
        poller: PollerSettings::default(),
    };
    let registry = build_registry(services).unwrap();
    let dispatcher = Dispatcher::new(
        registry,
        CorsPolicy::new().with_origins(["https://app.test"]),
        reporter.clone(),
    );

    Gateway {
        dispatcher,
        provider,
        threads,
        reporter,
    }
}

fn gateway(provider: MockAssistantProvider) -> Gateway {
    gateway_with(ProviderSource::shared(Arc::new(provider.clone())), provider)
}

fn get(path: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("Origin", "https://app.test")
        .body(Vec::new())
        .unwrap()
}

fn post(path: &str, body: Value) -> Request<Vec<u8>> {
    let payload = body.to_string().into_bytes();
    Request::builder()
        .method("POST")
        .uri(path)
        .header("Origin", "https://app.test")
        .header("Content-Type", "application/json")
        .header("Content-Length", payload.len().to_string())
        .body(payload)
        .unwrap()
}

fn json_body(response: &Response<Vec<u8>>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn text_body(response: &Response<Vec<u8>>) -> String {
    String::from_utf8(response.body().clone()).unwrap()
}

fn assert_cors(response: &Response<Vec<u8>>) {
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://app.test"
    );
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn ping_returns_epoch_millis() {
    let gw = gateway(MockAssistantProvider::new());
    let response = gw.dispatcher.dispatch(get("/ping")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let millis: i64 = text_body(&response).parse().unwrap();
    assert!(millis > 1_600_000_000_000);
}

#[tokio::test]
async fn unknown_route_is_404_with_cors() {
    let gw = gateway(MockAssistantProvider::new());
    let response = gw.dispatcher.dispatch(get("/nothing-here")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
    assert!(gw.reporter.is_empty());
}

#[tokio::test]
async fn preflight_answers_any_path() {
    let gw = gateway(MockAssistantProvider::new());
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/thinking")
        .header("Origin", "https://app.test")
        .body(Vec::new())
        .unwrap();
    let response = gw.dispatcher.dispatch(request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(&response);
    assert!(response
        .headers()
        .contains_key("access-control-allow-methods"));
    assert_eq!(gw.provider.call_count(), 0);
}

#[tokio::test]
async fn register_then_login() {
    let gw = gateway(MockAssistantProvider::new());

    let response = gw
        .dispatcher
        .dispatch(post(
            "/register",
            json!({
                "username": "ada",
                "email": "Ada@Example.com",
                "password": "analytical",
                "fullName": "Ada Lovelace"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reply = json_body(&response);
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["user"]["fullName"], "Ada Lovelace");
    assert_eq!(reply["user"]["roles"], json!(["user"]));
    assert!(reply["user"].get("passwordHash").is_none());

    let response = gw
        .dispatcher
        .dispatch(post(
            "/login",
            json!({"email": "ada@example.com", "password": "analytical"}),
        ))
        .await;
    let reply = json_body(&response);
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["message"], "User logged in successfully");

    let response = gw
        .dispatcher
        .dispatch(post(
            "/login",
            json!({"email": "ada@example.com", "password": "difference"}),
        ))
        .await;
    let reply = json_body(&response);
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["message"], "Incorrect password");
}

#[tokio::test]
async fn register_rejections_are_200_with_error_status() {
    let gw = gateway(MockAssistantProvider::new());

    let response = gw
        .dispatcher
        .dispatch(post(
            "/register",
            json!({"username": "bob", "email": "bob@example.com", "password": "short"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reply = json_body(&response);
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["error"], "Password must be at least 7 characters long");

    let response = gw
        .dispatcher
        .dispatch(post("/register", json!({"username": "bob"})))
        .await;
    let reply = json_body(&response);
    assert_eq!(reply["error"], "Missing required fields for registration");
}

#[tokio::test]
async fn malformed_json_body_degrades_instead_of_failing() {
    let gw = gateway(MockAssistantProvider::new());
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("Content-Type", "application/json")
        .header("Content-Length", "6")
        .body(b"{oops}".to_vec())
        .unwrap();
    let response = gw.dispatcher.dispatch(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let reply = json_body(&response);
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["error"], "Missing required fields for login");
}

#[tokio::test]
async fn create_assistant_uses_configured_profile() {
    let gw = gateway(MockAssistantProvider::new());
    let response = gw.dispatcher.dispatch(post("/assistant", json!({}))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let assistant = json_body(&response);
    assert_eq!(assistant["name"], "Math Tutor");
    assert_eq!(assistant["model"], "gpt-4");
    assert_eq!(assistant["tools"], json!(["code_interpreter"]));
}

#[tokio::test]
async fn create_thread_records_owner() {
    let gw = gateway(MockAssistantProvider::new());
    let response = gw
        .dispatcher
        .dispatch(post("/thread", json!({"userId": "user-7"})))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let thread = json_body(&response);
    let thread_id = ThreadId::new(thread["id"].as_str().unwrap()).unwrap();

    let record = gw.threads.find(&thread_id).await.unwrap().unwrap();
    assert_eq!(record.owner.as_deref(), Some("user-7"));
    assert!(record.run_ids.is_empty());
}

#[tokio::test]
async fn thinking_returns_latest_assistant_text() {
    let provider = MockAssistantProvider::new()
        .with_statuses([RunStatus::Queued, RunStatus::InProgress])
        .with_assistant_reply(["The answer is", "42"]);
    let gw = gateway(provider);

    let response = gw
        .dispatcher
        .dispatch(post(
            "/thinking",
            json!({"text": "6 * 7?", "assistantId": "asst_1", "threadId": "thread_1"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(text_body(&response), "The answer is\n42");
    assert_eq!(gw.provider.status_checks(), 3);

    let record = gw
        .threads
        .find(&ThreadId::new("thread_1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.run_ids.len(), 1);
}

#[tokio::test]
async fn thinking_with_blank_ids_is_400() {
    let gw = gateway(MockAssistantProvider::new());
    let response = gw
        .dispatcher
        .dispatch(post(
            "/thinking",
            json!({"text": "hi", "assistantId": "", "threadId": "thread_1"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    assert_eq!(gw.provider.call_count(), 0);
}

#[tokio::test]
async fn per_request_keys_require_bearer_header() {
    let provider = MockAssistantProvider::new();
    let shared = provider.clone();
    let source = ProviderSource::per_request(move |_key| {
        let provider: Arc<dyn AssistantProvider> = Arc::new(shared.clone());
        Ok(provider)
    });
    let gw = gateway_with(source, provider);

    let response = gw.dispatcher.dispatch(post("/thread", json!({}))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&response), json!({"message": "Missing API key"}));
    assert_cors(&response);

    let mut request = post("/thread", json!({}));
    request
        .headers_mut()
        .insert("Authorization", "Bearer".parse().unwrap());
    let response = gw.dispatcher.dispatch(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&response), json!({"message": "Wrong API key"}));

    let mut request = post("/thread", json!({}));
    request
        .headers_mut()
        .insert("Authorization", "Bearer sk-client".parse().unwrap());
    let response = gw.dispatcher.dispatch(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(gw.provider.call_count(), 1);
}
