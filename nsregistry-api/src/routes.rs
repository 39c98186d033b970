//! HTTP routes for the namespace registry

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use nsregistry_common::{
    K8sNamespace, NamespaceListQuery, NamespaceRequest, Page, UserIdQuery,
    VerifyNamespaceResponse,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::middleware::auth::{auth_middleware, AuthUser};
use crate::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/api/k8s-namespaces", get(list_namespaces))
        .route("/api/k8s-namespaces", post(create_namespace))
        .route("/api/k8s-namespaces/verify", post(verify_namespace))
        .route("/api/k8s-namespaces/available-list", get(available_namespaces))
        .route("/api/k8s-namespaces/unauth-namespace", get(unauthorized_namespaces))
        .route("/api/k8s-namespaces/authed-namespace", get(authorized_namespaces))
        .route("/api/k8s-namespaces/:id", delete(delete_namespace))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_namespaces(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<NamespaceListQuery>,
) -> Result<Json<Page<K8sNamespace>>, ApiError> {
    let page = state
        .access
        .paged_list(
            &user.principal(),
            query.search_val.as_deref(),
            query.page_no,
            query.page_size,
        )
        .await?;
    Ok(Json(page))
}

async fn create_namespace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NamespaceRequest>,
) -> Result<(StatusCode, Json<K8sNamespace>), ApiError> {
    let namespace = state
        .registry
        .create_or_register(&user.principal(), &payload.namespace, payload.cluster_code)
        .await?;
    Ok((StatusCode::CREATED, Json(namespace)))
}

async fn verify_namespace(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NamespaceRequest>,
) -> Result<Json<VerifyNamespaceResponse>, ApiError> {
    let unique = state
        .registry
        .verify_unique(&payload.namespace, payload.cluster_code)
        .await?;
    Ok(Json(VerifyNamespaceResponse { unique }))
}

async fn delete_namespace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.registry.delete_by_id(&user.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unauthorized_namespaces(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<K8sNamespace>>, ApiError> {
    let namespaces = state
        .access
        .unauthorized_for(&user.principal(), query.user_id)
        .await?;
    Ok(Json(namespaces))
}

async fn authorized_namespaces(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<K8sNamespace>>, ApiError> {
    let namespaces = state
        .access
        .authorized_for(&user.principal(), query.user_id)
        .await?;
    Ok(Json(namespaces))
}

async fn available_namespaces(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<K8sNamespace>>, ApiError> {
    let namespaces = state.access.available_for(&user.principal()).await?;
    Ok(Json(namespaces))
}
