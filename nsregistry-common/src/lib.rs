//! Common types shared between the nsregistry API and its clients

pub mod auth;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Kubernetes namespace registered against a cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct K8sNamespace {
    pub id: i64,
    pub code: i64,
    #[serde(rename = "namespace")]
    pub name: String,
    pub cluster_code: i64,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Namespace about to be registered; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNamespace {
    pub code: i64,
    pub name: String,
    pub cluster_code: i64,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching items before pagination
    pub total: u64,
    pub page_no: u32,
    pub page_size: u32,
}

/// Body of create and verify requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRequest {
    pub namespace: String,
    pub cluster_code: i64,
}

/// Query string of the paged listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceListQuery {
    #[serde(default)]
    pub search_val: Option<String>,
    pub page_no: u32,
    pub page_size: u32,
}

/// Query string of the per-user admin listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyNamespaceResponse {
    pub unique: bool,
}

/// Shared error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_serializes_with_wire_names() {
        let now = Utc::now();
        let ns = K8sNamespace {
            id: 1,
            code: 42,
            name: "team-x".to_string(),
            cluster_code: 100,
            owner_id: 7,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&ns).unwrap();
        assert_eq!(json["namespace"], "team-x");
        assert_eq!(json["clusterCode"], 100);
        assert_eq!(json["ownerId"], 7);
    }

    #[test]
    fn test_list_query_defaults_search() {
        let query: NamespaceListQuery =
            serde_json::from_str(r#"{"pageNo": 1, "pageSize": 10}"#).unwrap();
        assert!(query.search_val.is_none());
        assert_eq!(query.page_size, 10);
    }
}
