//! Namespace operations against a live cluster

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use std::collections::BTreeMap;

use super::client::K8sClient;
use super::error::K8sResult;

/// Label stamped on every namespace this service creates
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "nsregistry";

/// Check whether a namespace exists on the cluster
pub async fn namespace_exists(client: &K8sClient, name: &str) -> K8sResult<bool> {
    let namespaces: Api<Namespace> = Api::all(client.inner().clone());
    Ok(namespaces.get_opt(name).await?.is_some())
}

/// Create a namespace.
///
/// Returns `false` when the API server answered 409 because the namespace
/// already exists, which the caller treats as success.
pub async fn create_namespace(client: &K8sClient, name: &str) -> K8sResult<bool> {
    let namespaces: Api<Namespace> = Api::all(client.inner().clone());

    match namespaces
        .create(&PostParams::default(), &build_namespace(name))
        .await
    {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(response)) if response.code == 409 => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn build_namespace(name: &str) -> Namespace {
    let mut labels = BTreeMap::new();
    labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    }
}
