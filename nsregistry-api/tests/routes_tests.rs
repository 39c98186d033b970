//! HTTP Route Tests
//! Drives the router with tower's oneshot and checks status codes and bodies

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::{admin, alice, bob, TestEnv, CLUSTER_A};
use nsregistry_api::middleware::auth::create_jwt_token;
use nsregistry_api::{routes, AppState};
use nsregistry_common::auth::Principal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "routes-test-secret-routes-test-secret";

fn app(env: &TestEnv) -> Router {
    let state = AppState::new(env.registry.clone(), env.access.clone(), SECRET);
    routes::router(Arc::new(state))
}

fn token(user: &Principal) -> String {
    create_jwt_token(SECRET, user, 1).unwrap()
}

fn request(method: Method, uri: &str, user: Option<&Principal>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let env = TestEnv::new().await;
    let (status, body) = send(app(&env), request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let env = TestEnv::new().await;

    let (status, _) = send(
        app(&env),
        request(Method::GET, "/api/k8s-namespaces/available-list", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bad = Request::builder()
        .uri("/api/k8s-namespaces/available-list")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&env), bad).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_create_then_conflict() {
    let env = TestEnv::new().await;
    let payload = json!({ "namespace": "team-x", "clusterCode": CLUSTER_A });

    let (status, body) = send(
        app(&env),
        request(Method::POST, "/api/k8s-namespaces", Some(&alice()), Some(payload.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["namespace"], "team-x");
    assert_eq!(body["clusterCode"], CLUSTER_A);
    assert_eq!(body["ownerId"], alice().user_id);

    let (status, body) = send(
        app(&env),
        request(Method::POST, "/api/k8s-namespaces", Some(&bob()), Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_create_error_statuses() {
    let env = TestEnv::new().await;

    let (status, _) = send(
        app(&env),
        request(
            Method::POST,
            "/api/k8s-namespaces",
            Some(&admin()),
            Some(json!({ "namespace": "Bad_Name", "clusterCode": CLUSTER_A })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app(&env),
        request(
            Method::POST,
            "/api/k8s-namespaces",
            Some(&admin()),
            Some(json!({ "namespace": "team-x", "clusterCode": 999 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    env.gateway.fail_next_create();
    let (status, body) = send(
        app(&env),
        request(
            Method::POST,
            "/api/k8s-namespaces",
            Some(&admin()),
            Some(json!({ "namespace": "team-x", "clusterCode": CLUSTER_A })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "EXTERNAL_CREATE_FAILED");
}

#[tokio::test]
async fn test_verify() {
    let env = TestEnv::new().await;
    env.registry
        .create_or_register(&admin(), "taken", CLUSTER_A)
        .await
        .unwrap();

    let (status, body) = send(
        app(&env),
        request(
            Method::POST,
            "/api/k8s-namespaces/verify",
            Some(&alice()),
            Some(json!({ "namespace": "taken", "clusterCode": CLUSTER_A })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unique"], false);

    let (_, body) = send(
        app(&env),
        request(
            Method::POST,
            "/api/k8s-namespaces/verify",
            Some(&alice()),
            Some(json!({ "namespace": "free", "clusterCode": CLUSTER_A })),
        ),
    )
    .await;
    assert_eq!(body["unique"], true);

    let (status, _) = send(
        app(&env),
        request(
            Method::POST,
            "/api/k8s-namespaces/verify",
            Some(&alice()),
            Some(json!({ "namespace": "Bad_Name", "clusterCode": CLUSTER_A })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_statuses() {
    let env = TestEnv::new().await;
    let ns = env
        .registry
        .create_or_register(&alice(), "doomed", CLUSTER_A)
        .await
        .unwrap();
    let uri = format!("/api/k8s-namespaces/{}", ns.id);

    let (status, _) = send(app(&env), request(Method::DELETE, &uri, Some(&bob()), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    env.workloads.mark_active(ns.id).await;
    let (status, body) = send(app(&env), request(Method::DELETE, &uri, Some(&alice()), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "IN_USE");

    env.workloads.clear(ns.id).await;
    let (status, _) = send(app(&env), request(Method::DELETE, &uri, Some(&alice()), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(app(&env), request(Method::DELETE, &uri, Some(&alice()), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_paged_list_query_parameters() {
    let env = TestEnv::new().await;
    for name in ["prod-a", "prod-b", "dev-a"] {
        env.registry
            .create_or_register(&admin(), name, CLUSTER_A)
            .await
            .unwrap();
    }

    let (status, body) = send(
        app(&env),
        request(
            Method::GET,
            "/api/k8s-namespaces?searchVal=prod&pageNo=1&pageSize=1",
            Some(&admin()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["pageNo"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        app(&env),
        request(
            Method::GET,
            "/api/k8s-namespaces?pageNo=0&pageSize=10",
            Some(&admin()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grant_queries() {
    let env = TestEnv::new().await;
    let ns = env
        .registry
        .create_or_register(&admin(), "ops", CLUSTER_A)
        .await
        .unwrap();
    env.grants.grant(bob().user_id, ns.id).await;

    let uri = format!("/api/k8s-namespaces/authed-namespace?userId={}", bob().user_id);
    let (status, body) = send(app(&env), request(Method::GET, &uri, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["namespace"], "ops");

    let uri = format!("/api/k8s-namespaces/unauth-namespace?userId={}", alice().user_id);
    let (status, body) = send(app(&env), request(Method::GET, &uri, Some(&admin()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["namespace"], "ops");

    let (status, _) = send(app(&env), request(Method::GET, &uri, Some(&alice()), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(&env),
        request(Method::GET, "/api/k8s-namespaces/available-list", Some(&bob()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["namespace"], "ops");
}
