//! Kubernetes integration
//!
//! Provides the live-cluster side of namespace registration:
//! - Cluster connection via kubeconfig, one client per cluster code
//! - Namespace existence checks and creation
//! - A `ClusterGateway` implementation with per-call timeouts

pub mod client;
pub mod error;
pub mod gateway;
pub mod namespaces;

pub use client::K8sClient;
pub use error::{K8sError, K8sResult};
pub use gateway::KubeClusterGateway;
