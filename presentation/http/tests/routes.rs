use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use graph_gateway_adapter_in_memory::InMemoryGraphModule;
use graph_gateway_core::GraphModule;
use graph_gateway_http::{router, HttpConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const MOUNT: &str = "/_api/gharial";

struct TestApp {
    router: Router,
    module: Arc<InMemoryGraphModule>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(HttpConfig::default())
    }

    fn with_config(config: HttpConfig) -> Self {
        let module = Arc::new(InMemoryGraphModule::new());
        let shared: Arc<dyn GraphModule> = module.clone();
        Self {
            router: router(shared, &config),
            module,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    async fn create_social_graph(&self) {
        let (status, _, _) = self
            .send(
                Method::POST,
                MOUNT,
                Some(json!({
                    "name": "social",
                    "edgeDefinitions": [{"collection": "knows", "from": ["persons"], "to": ["persons"]}]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn create_person(&self, key: &str) {
        let (status, _, _) = self
            .send(
                Method::POST,
                &format!("{}/social/vertex/persons", MOUNT),
                Some(json!({"_key": key, "name": key})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

fn assert_error(body: &Value, code: u16, error_num: u32, message: &str) {
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], code);
    assert_eq!(body["errorNum"], error_num);
    assert_eq!(body["errorMessage"], message);
}

mod graphs {
    use super::*;

    #[tokio::test]
    async fn create_graph_returns_201_with_descriptor() {
        let app = TestApp::new();

        let (status, _, body) = app
            .send(
                Method::POST,
                MOUNT,
                Some(json!({
                    "name": "social",
                    "edgeDefinitions": [{"collection": "knows", "from": ["persons"], "to": ["persons"]}]
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["error"], false);
        assert_eq!(body["code"], 201);
        assert_eq!(body["graph"]["name"], "social");
        assert_eq!(body["graph"]["edgeDefinitions"][0]["collection"], "knows");
        assert!(app.module.has_collection("persons").await);
    }

    #[tokio::test]
    async fn duplicate_graph_is_a_conflict() {
        let app = TestApp::new();
        app.create_social_graph().await;

        let (status, _, body) = app
            .send(Method::POST, MOUNT, Some(json!({"name": "social"})))
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_error(&body, 409, 1925, "graph already exists");
    }

    #[tokio::test]
    async fn missing_graph_name_is_a_bad_request() {
        let app = TestApp::new();

        let (status, _, body) = app.send(Method::POST, MOUNT, Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&body, 400, 1922, "missing graph name");
    }

    #[tokio::test]
    async fn list_and_get_graphs() {
        let app = TestApp::new();
        app.create_social_graph().await;

        let (status, _, body) = app.send(Method::GET, MOUNT, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["graphs"].as_array().unwrap().len(), 1);

        let (status, _, body) = app.send(Method::GET, &format!("{}/social", MOUNT), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["graph"]["name"], "social");

        let (status, _, body) = app.send(Method::GET, &format!("{}/unknown", MOUNT), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error(&body, 404, 1924, "graph not found");
    }

    #[tokio::test]
    async fn drop_graph_drops_collections_by_default() {
        let app = TestApp::new();
        app.create_social_graph().await;

        let (status, _, body) = app.send(Method::DELETE, &format!("{}/social", MOUNT), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": false, "code": 200}));
        assert!(!app.module.has_collection("knows").await);

        let (status, _, body) = app.send(Method::DELETE, &format!("{}/social", MOUNT), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error(&body, 404, 1924, "graph not found");
    }

    #[tokio::test]
    async fn drop_graph_can_keep_collections() {
        let app = TestApp::new();
        app.create_social_graph().await;

        let (status, _, _) = app
            .send(Method::DELETE, &format!("{}/social?dropCollections=false", MOUNT), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(app.module.has_collection("knows").await);
        assert!(app.module.has_collection("persons").await);
    }

    #[tokio::test]
    async fn drop_graph_rejects_malformed_flag_and_keeps_graph() {
        let app = TestApp::new();
        app.create_social_graph().await;

        for value in ["0", "False", "no"] {
            let (status, _, body) = app
                .send(Method::DELETE, &format!("{}/social?dropCollections={}", MOUNT, value), None)
                .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], true);
            assert_eq!(body["errorNum"], 600);
            assert!(app.module.has_collection("knows").await);
            assert!(app.module.has_collection("persons").await);
        }

        let (status, _, body) = app.send(Method::GET, &format!("{}/social", MOUNT), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["graph"]["name"], "social");
    }
}

mod vertices {
    use super::*;

    #[tokio::test]
    async fn vertex_lifecycle() {
        let app = TestApp::new();
        app.create_social_graph().await;
        let collection = format!("{}/social/vertex/persons", MOUNT);

        let (status, headers, body) = app
            .send(Method::POST, &collection, Some(json!({"_key": "alice", "name": "Alice"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], false);
        assert_eq!(body["vertex"]["_id"], "persons/alice");
        let rev = body["vertex"]["_rev"].as_str().unwrap().to_string();
        assert_eq!(headers[header::ETAG], rev.as_str());

        let (status, _, body) = app.send(Method::GET, &format!("{}/alice", collection), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vertex"]["name"], "Alice");

        let (status, _, body) = app
            .send(Method::PUT, &format!("{}/alice", collection), Some(json!({"age": 30})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vertex"]["_oldRev"], rev.as_str());

        let (status, _, _) = app
            .send(Method::PATCH, &format!("{}/alice", collection), Some(json!({"city": "Cologne"})))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = app.send(Method::GET, &format!("{}/alice", collection), None).await;
        assert_eq!(body["vertex"]["age"], 30);
        assert_eq!(body["vertex"]["city"], "Cologne");
        assert!(body["vertex"].get("name").is_none());

        let (status, _, body) = app.send(Method::DELETE, &format!("{}/alice", collection), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vertex"], true);

        let (status, _, body) = app.send(Method::GET, &format!("{}/alice", collection), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error(&body, 404, 1202, "document not found");
    }

    #[tokio::test]
    async fn missing_vertex_is_not_found_for_every_method() {
        let app = TestApp::new();
        app.create_social_graph().await;
        let uri = format!("{}/social/vertex/persons/ghost", MOUNT);

        for (method, body) in [
            (Method::GET, None),
            (Method::PUT, Some(json!({}))),
            (Method::PATCH, Some(json!({}))),
            (Method::DELETE, None),
        ] {
            let (status, _, body) = app.send(method, &uri, body).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_error(&body, 404, 1202, "document not found");
        }
    }

    #[tokio::test]
    async fn vertex_route_rejects_edge_collection() {
        let app = TestApp::new();
        app.create_social_graph().await;

        let (status, _, body) = app
            .send(Method::POST, &format!("{}/social/vertex/knows", MOUNT), Some(json!({})))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorNum"], 1926);
    }

    #[tokio::test]
    async fn vertex_in_unknown_graph() {
        let app = TestApp::new();

        let (status, _, body) = app
            .send(Method::POST, &format!("{}/nope/vertex/persons", MOUNT), Some(json!({})))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error(&body, 404, 1924, "graph not found");
    }

    #[tokio::test]
    async fn malformed_and_non_object_bodies() {
        let app = TestApp::new();
        app.create_social_graph().await;
        let uri = format!("{}/social/vertex/persons", MOUNT);

        let request = Request::builder()
            .method(Method::POST)
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, body) = app.send_request(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], true);
        assert_eq!(body["errorNum"], 600);

        let (status, _, body) = app.send(Method::POST, &uri, Some(json!([1, 2, 3]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&body, 400, 1227, "invalid document type");
    }
}

mod edges {
    use super::*;

    #[tokio::test]
    async fn missing_edge_is_not_found_for_every_method() {
        let app = TestApp::new();
        app.create_social_graph().await;
        let uri = format!("{}/social/edge/knows/ghost", MOUNT);

        for (method, body) in [
            (Method::GET, None),
            (Method::PUT, Some(json!({}))),
            (Method::PATCH, Some(json!({}))),
            (Method::DELETE, None),
        ] {
            let (status, _, body) = app.send(method, &uri, body).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_error(&body, 404, 1202, "document not found");
        }
    }

    #[tokio::test]
    async fn edge_route_rejects_vertex_collection() {
        let app = TestApp::new();
        app.create_social_graph().await;
        app.create_person("alice").await;
        app.create_person("bob").await;

        let (status, _, body) = app
            .send(
                Method::POST,
                &format!("{}/social/edge/persons", MOUNT),
                Some(json!({"_from": "persons/alice", "_to": "persons/bob"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error(&body, 404, 1930, "edge collection not used in graph");

        let (status, _, body) = app
            .send(Method::GET, &format!("{}/social/edge/persons/alice", MOUNT), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorNum"], 1930);
    }

    #[tokio::test]
    async fn edge_without_endpoints_is_an_invalid_edge() {
        let app = TestApp::new();
        app.create_social_graph().await;
        let uri = format!("{}/social/edge/knows", MOUNT);

        for body in [json!({"_from": "persons/alice"}), json!({"_to": "persons/bob"}), json!({})] {
            let (status, _, body) = app.send(Method::POST, &uri, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_error(&body, 400, 1906, "invalid edge");
        }
    }

    #[tokio::test]
    async fn edge_lifecycle() {
        let app = TestApp::new();
        app.create_social_graph().await;
        app.create_person("alice").await;
        app.create_person("bob").await;
        let collection = format!("{}/social/edge/knows", MOUNT);

        let (status, headers, body) = app
            .send(
                Method::POST,
                &collection,
                Some(json!({"_key": "ab", "_from": "persons/alice", "_to": "persons/bob", "since": 2020})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["edge"]["_id"], "knows/ab");
        assert!(headers.contains_key(header::ETAG));

        let (status, _, body) = app.send(Method::GET, &format!("{}/ab", collection), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["edge"]["_from"], "persons/alice");
        assert_eq!(body["edge"]["since"], 2020);

        let (status, _, _) = app
            .send(
                Method::PUT,
                &format!("{}/ab", collection),
                Some(json!({"_from": "persons/bob", "weight": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = app
            .send(Method::PATCH, &format!("{}/ab", collection), Some(json!({"weight": 2})))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = app.send(Method::GET, &format!("{}/ab", collection), None).await;
        assert_eq!(body["edge"]["_from"], "persons/alice");
        assert_eq!(body["edge"]["weight"], 2);
        assert!(body["edge"].get("since").is_none());

        let (status, _, body) = app.send(Method::DELETE, &format!("{}/ab", collection), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["edge"], true);

        let (status, _, body) = app.send(Method::GET, &format!("{}/ab", collection), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error(&body, 404, 1202, "document not found");
    }

    #[tokio::test]
    async fn edge_to_unknown_vertex_is_rejected() {
        let app = TestApp::new();
        app.create_social_graph().await;
        app.create_person("alice").await;

        let (status, _, body) = app
            .send(
                Method::POST,
                &format!("{}/social/edge/knows", MOUNT),
                Some(json!({"_from": "persons/alice", "_to": "persons/nobody"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&body, 400, 1906, "invalid edge");
    }

    #[tokio::test]
    async fn deleting_a_vertex_removes_its_edges() {
        let app = TestApp::new();
        app.create_social_graph().await;
        app.create_person("alice").await;
        app.create_person("bob").await;

        let (_, _, body) = app
            .send(
                Method::POST,
                &format!("{}/social/edge/knows", MOUNT),
                Some(json!({"_from": "persons/alice", "_to": "persons/bob"})),
            )
            .await;
        let edge_key = body["edge"]["_key"].as_str().unwrap().to_string();

        app.send(Method::DELETE, &format!("{}/social/vertex/persons/bob", MOUNT), None)
            .await;

        let (status, _, _) = app
            .send(Method::GET, &format!("{}/social/edge/knows/{}", MOUNT, edge_key), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn add_edge_definition() {
        let app = TestApp::new();
        app.create_social_graph().await;
        let uri = format!("{}/social/edge", MOUNT);

        let (status, _, body) = app
            .send(
                Method::POST,
                &uri,
                Some(json!({"collection": "owns", "from": ["persons"], "to": ["items"]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["graph"]["name"], "social");
        assert_eq!(body["graph"]["edgeDefinitions"].as_array().unwrap().len(), 2);

        let (status, _, body) = app
            .send(Method::POST, &uri, Some(json!({"collection": "likes", "from": ["persons"]})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&body, 400, 1923, "malformed edge definition");

        let (status, _, body) = app
            .send(
                Method::POST,
                &uri,
                Some(json!({"collection": "owns", "from": ["persons"], "to": ["items"]})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorNum"], 1920);

        let (status, _, body) = app
            .send(
                Method::POST,
                &format!("{}/missing/edge", MOUNT),
                Some(json!({"collection": "x", "from": ["a"], "to": ["b"]})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorNum"], 1924);
    }
}

mod ambient {
    use super::*;

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let app = TestApp::new();

        let (status, _, body) = app.send(Method::GET, "/_admin/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health"]["status"], "healthy");
    }

    #[tokio::test]
    async fn unknown_path_uses_error_envelope() {
        let app = TestApp::new();

        let (status, _, body) = app.send(Method::GET, "/nowhere/at/all", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_error(&body, 404, 404, "unknown path");
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = TestApp::new();

        let (_, headers, _) = app.send(Method::GET, MOUNT, None).await;

        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn routes_can_be_mounted_at_the_root() {
        let app = TestApp::with_config(HttpConfig {
            mount_path: "/".to_string(),
            ..HttpConfig::default()
        });

        let (status, _, _) = app.send(Method::POST, "/", Some(json!({"name": "rooted"}))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, body) = app.send(Method::GET, "/rooted", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["graph"]["name"], "rooted");
    }
}
