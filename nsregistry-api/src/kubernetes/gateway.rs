//! Cluster gateway backed by kube-rs clients

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::K8sClient;
use super::error::{K8sError, K8sResult};
use super::namespaces;
use crate::config::KubernetesConfig;
use crate::registry::error::GatewayResult;
use crate::registry::ClusterGateway;

/// Talks to every configured cluster through its own client
pub struct KubeClusterGateway {
    clients: HashMap<i64, K8sClient>,
    timeout: Duration,
}

impl KubeClusterGateway {
    pub fn new(timeout: Duration) -> Self {
        Self {
            clients: HashMap::new(),
            timeout,
        }
    }

    /// Build one client per configured cluster
    pub async fn from_config(config: &KubernetesConfig) -> K8sResult<Self> {
        let mut gateway = Self::new(Duration::from_secs(config.request_timeout_secs));

        for cluster in &config.clusters {
            let client = K8sClient::from_kubeconfig_file(
                &cluster.kubeconfig,
                cluster.context.as_deref(),
                cluster.code,
                cluster.name.clone(),
            )
            .await?;

            info!(
                cluster_code = cluster.code,
                cluster_name = %cluster.name,
                api_server = %client.api_server(),
                "Kubernetes cluster client ready"
            );
            gateway.add_client(client);
        }

        Ok(gateway)
    }

    pub fn add_client(&mut self, client: K8sClient) {
        self.clients.insert(client.cluster_code(), client);
    }

    pub fn cluster_count(&self) -> usize {
        self.clients.len()
    }

    fn client(&self, cluster_code: i64) -> K8sResult<&K8sClient> {
        self.clients
            .get(&cluster_code)
            .ok_or(K8sError::ClusterNotFound(cluster_code))
    }

    async fn with_timeout<T, F>(&self, cluster_code: i64, call: F) -> K8sResult<T>
    where
        F: Future<Output = K8sResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(K8sError::Timeout {
                cluster_code,
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl ClusterGateway for KubeClusterGateway {
    async fn exists(&self, cluster_code: i64, name: &str) -> GatewayResult<bool> {
        let client = self
            .client(cluster_code)
            .map_err(|e| e.into_lookup_error(cluster_code))?;

        self.with_timeout(cluster_code, namespaces::namespace_exists(client, name))
            .await
            .map_err(|e| {
                warn!(cluster_code, namespace = %name, error = %e, "Namespace lookup failed");
                e.into_lookup_error(cluster_code)
            })
    }

    async fn create(&self, cluster_code: i64, name: &str) -> GatewayResult<()> {
        let client = self.client(cluster_code).map_err(K8sError::into_create_error)?;

        let created = self
            .with_timeout(cluster_code, namespaces::create_namespace(client, name))
            .await
            .map_err(|e| {
                warn!(cluster_code, namespace = %name, error = %e, "Namespace create failed");
                e.into_create_error()
            })?;

        if !created {
            debug!(cluster_code, namespace = %name, "Namespace already existed on cluster");
        }
        Ok(())
    }
}
