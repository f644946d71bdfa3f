use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api::{bootstrap, build_router, routes::query::query_response::QueryResponse};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use rag_store::{
    ChatCompletionModel, DocumentStore, PredictRequest, Prediction, RagError, RagHit,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const ANSWER: &str = "Use VectorIndex(...).";

/// In-memory stand-in for the document store: five `VectorIndex` chunks are
/// "retrieved" and the "model" echoes a fixed answer.
#[derive(Default)]
struct MockStore {
    adds: AtomicUsize,
    predicts: AtomicUsize,
    registered: Mutex<Vec<ChatCompletionModel>>,
    last_request: Mutex<Option<PredictRequest>>,
    fail_with: Option<fn() -> RagError>,
    delay: Option<Duration>,
}

impl MockStore {
    fn failing(f: fn() -> RagError) -> Self {
        Self {
            fail_with: Some(f),
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }
}

impl DocumentStore for MockStore {
    fn add(&self, model: ChatCompletionModel) -> BoxFuture<'_, Result<(), RagError>> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.registered.lock().unwrap().push(model);
        Box::pin(async { Ok(()) })
    }

    fn predict(&self, req: PredictRequest) -> BoxFuture<'_, Result<Prediction, RagError>> {
        self.predicts.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(req);
        Box::pin(async move {
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            if let Some(f) = self.fail_with {
                return Err(f());
            }
            let context = (0..5)
                .map(|i| RagHit {
                    score: 1.0 - i as f32 * 0.1,
                    text: format!("chunk {i}: db.add(VectorIndex('my-index', ...))"),
                    payload: json!({ "txt": format!("chunk {i} VectorIndex") }),
                })
                .collect();
            Ok(Prediction {
                output: ANSWER.to_string(),
                context,
            })
        })
    }

    fn collection_exists<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<bool, RagError>> {
        Box::pin(async move {
            match self.fail_with {
                Some(f) => Err(f()),
                None => Ok(collection == "questiondocs"),
            }
        })
    }
}

async fn app(store: Arc<MockStore>, timeout: Duration) -> Router {
    let state = bootstrap(store, "gpt-3.5-turbo", timeout).await.unwrap();
    build_router(state)
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn answers_vector_index_question_end_to_end() {
    let store = Arc::new(MockStore::default());
    let app = app(store.clone(), Duration::from_secs(5)).await;

    let res = app
        .oneshot(post_json(
            r#"{"query":"How do I create a VectorIndex?","collection_name":"anything"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: QueryResponse = serde_json::from_value(json_body(res).await).unwrap();
    assert_eq!(
        body,
        QueryResponse {
            answer: ANSWER.to_string(),
            source_urls: vec!["https://docs.superduperdb.com".to_string()],
        }
    );

    let req = store.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(req.model_name, "gpt-3.5-turbo");
    assert_eq!(req.input, "How do I create a VectorIndex?");
    assert_eq!(req.context_key.as_deref(), Some("txt"));
    let select = req.context_select.unwrap();
    assert_eq!(select.collection, "questiondocs");
    assert_eq!(select.vector_index, "my-index");
    assert_eq!(select.n, 5);
    assert_eq!(
        select.probe.get_str("txt"),
        Some("How do I create a VectorIndex?")
    );
}

#[tokio::test]
async fn collection_name_does_not_change_search_or_sources() {
    let store = Arc::new(MockStore::default());
    let app = app(store.clone(), Duration::from_secs(5)).await;

    for (query, collection) in [("a", "docs"), ("something else entirely", "questiondocs")] {
        let body = json!({ "query": query, "collection_name": collection }).to_string();
        let res = app.clone().oneshot(post_json(&body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = json_body(res).await;
        assert_eq!(v["source_urls"], json!(["https://docs.superduperdb.com"]));

        let req = store.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(req.context_select.unwrap().collection, "questiondocs");
    }
}

#[tokio::test]
async fn malformed_payloads_are_rejected_without_store_calls() {
    let store = Arc::new(MockStore::default());
    let app = app(store.clone(), Duration::from_secs(5)).await;

    let cases = [
        (r#"{"collection_name":"x"}"#, "query"),
        (r#"{"query":"q"}"#, "collection_name"),
        (r#"{"query":42,"collection_name":"x"}"#, "query"),
        (r#"{"query":"q","collection_name":["x"]}"#, "collection_name"),
        (r#"{"query":null,"collection_name":"x"}"#, "query"),
    ];

    for (body, field) in cases {
        let res = app.clone().oneshot(post_json(body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
        let v = json_body(res).await;
        assert_eq!(v["success"], json!(false));
        assert_eq!(v["error"]["code"], json!("VALIDATION_ERROR"));
        assert_eq!(v["error"]["details"][0]["path"], json!(field), "body: {body}");
        assert!(v.get("answer").is_none());
    }

    for body in [
        r#"["How do I create a VectorIndex?","x"]"#,
        r#""How do I create a VectorIndex?""#,
        "42",
    ] {
        let res = app.clone().oneshot(post_json(body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
        let v = json_body(res).await;
        assert_eq!(v["error"]["code"], json!("VALIDATION_ERROR"));
        assert!(v["error"]["details"][0]["path"].is_null(), "body: {body}");
        assert!(v.get("answer").is_none());
    }

    let res = app.clone().oneshot(post_json("{not json")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/query")
                .body(Body::from(r#"{"query":"q","collection_name":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    assert_eq!(store.predicts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_failure_is_5xx_without_answer() {
    let store = Arc::new(MockStore::failing(|| {
        RagError::Qdrant("transport error: connection refused".into())
    }));
    let app = app(store.clone(), Duration::from_secs(5)).await;

    let res = app
        .oneshot(post_json(r#"{"query":"q","collection_name":"x"}"#))
        .await
        .unwrap();

    assert!(res.status().is_server_error());
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let v = json_body(res).await;
    assert!(v.get("answer").is_none());
    assert_eq!(v["error"]["code"], json!("UPSTREAM_ERROR"));
    assert_eq!(store.predicts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_registration_is_a_server_error() {
    let store = Arc::new(MockStore::failing(|| {
        RagError::UnknownModel("gpt-3.5-turbo".into())
    }));
    let app = app(store, Duration::from_secs(5)).await;

    let res = app
        .oneshot(post_json(r#"{"query":"q","collection_name":"x"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(res).await.get("answer").is_none());
}

#[tokio::test]
async fn slow_generation_times_out_with_504() {
    let store = Arc::new(MockStore::slow(Duration::from_millis(500)));
    let app = app(store, Duration::from_millis(20)).await;

    let res = app
        .oneshot(post_json(r#"{"query":"q","collection_name":"x"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(json_body(res).await.get("answer").is_none());
}

#[tokio::test]
async fn binding_is_registered_once_across_requests() {
    let store = Arc::new(MockStore::default());
    let app = app(store.clone(), Duration::from_secs(5)).await;

    for _ in 0..2 {
        let res = app
            .clone()
            .oneshot(post_json(r#"{"query":"q","collection_name":"x"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert_eq!(store.adds.load(Ordering::SeqCst), 1);
    assert_eq!(store.predicts.load(Ordering::SeqCst), 2);
    let registered = store.registered.lock().unwrap();
    assert_eq!(registered[0].identifier, "gpt-3.5-turbo");
    assert!(registered[0].prompt.contains("{context}"));
}

#[tokio::test]
async fn cors_allows_any_origin_with_credentials() {
    let app = app(Arc::new(MockStore::default()), Duration::from_secs(5)).await;

    let res = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/query")
                .header(header::ORIGIN, "https://example.org")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-custom")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(res.status().is_success());
    let h = res.headers();
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://example.org");
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type,x-custom");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = app(Arc::new(MockStore::default()), Duration::from_secs(5)).await;
    let mut req = post_json(r#"{"query":"q","collection_name":"x"}"#);
    req.headers_mut()
        .insert("x-request-id", "abc-123".parse().unwrap());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn health_reports_collection_state() {
    let app = app(Arc::new(MockStore::default()), Duration::from_secs(5)).await;
    let res = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let v = json_body(res).await;
    assert_eq!(v["data"]["collection_exists"], json!(true));
    assert_eq!(v["data"]["model"], json!("gpt-3.5-turbo"));

    let failing = app_failing().await;
    let res = failing
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

async fn app_failing() -> Router {
    app(
        Arc::new(MockStore::failing(|| RagError::Qdrant("down".into()))),
        Duration::from_secs(5),
    )
    .await
}
