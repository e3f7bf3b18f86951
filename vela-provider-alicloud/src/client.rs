//! Container Service client adapter
//!
//! `CsApi` is the seam to the vendor SDK: one method per Container Service
//! operation, returning typed payloads. Transport, signing and endpoint
//! resolution are the implementor's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VendorError;

/// Cluster tag
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Entry of the cluster listing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSummary {
    pub cluster_id: String,
    pub name: String,
    pub state: String,
    pub region_id: String,
    pub master_url: String,
}

/// Certificates used to reach a cluster's API server
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterCerts {
    pub ca: String,
    pub cert: String,
    pub key: String,
}

/// Dedicated or managed Kubernetes cluster
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesCluster {
    pub cluster_id: String,
    pub name: String,
    pub state: String,
    pub region_id: String,
    pub zone_id: String,
    pub cluster_type: String,
    pub current_version: String,
    pub vpc_id: String,
    pub vswitch_id: String,
    pub master_url: String,
    pub tags: Vec<Tag>,
}

/// Serverless Kubernetes cluster
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerlessCluster {
    pub cluster_id: String,
    pub name: String,
    pub state: String,
    pub region_id: String,
    pub vpc_id: String,
    pub vswitch_id: String,
    pub private_zone: bool,
    pub tags: Vec<Tag>,
}

/// Application (compose project) deployed on a swarm cluster
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub template: String,
    pub version: String,
    pub current_state: String,
    pub desired_state: String,
}

/// Node-attach token of a cluster
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterToken {
    pub token: String,
    pub cluster_id: String,
    /// Expiry as unix seconds; zero means the token never expires
    pub expired: i64,
    pub is_active: i32,
}

impl ClusterToken {
    /// Active and never expiring
    pub fn is_permanent(&self) -> bool {
        self.expired == 0 && self.is_active == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterTokenRequest {
    pub is_permanently: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<i64>,
}

impl ClusterTokenRequest {
    pub fn permanent() -> Self {
        Self {
            is_permanently: true,
            expired: None,
        }
    }
}

/// Container Service operations used by the provider
#[async_trait]
pub trait CsApi: Send + Sync {
    /// List clusters whose name contains `name`
    async fn describe_clusters(&self, name: &str) -> Result<Vec<ClusterSummary>, VendorError>;

    async fn get_cluster_certs(&self, cluster_id: &str) -> Result<ClusterCerts, VendorError>;

    async fn describe_kubernetes_cluster(
        &self,
        cluster_id: &str,
    ) -> Result<KubernetesCluster, VendorError>;

    async fn describe_serverless_kubernetes_cluster(
        &self,
        cluster_id: &str,
    ) -> Result<ServerlessCluster, VendorError>;

    /// Read an application through the cluster's own API endpoint
    async fn get_project(
        &self,
        cluster: &ClusterSummary,
        certs: &ClusterCerts,
        name: &str,
    ) -> Result<Project, VendorError>;

    async fn describe_cluster_tokens(
        &self,
        cluster_id: &str,
    ) -> Result<Vec<ClusterToken>, VendorError>;

    async fn create_cluster_token(
        &self,
        cluster_id: &str,
        request: &ClusterTokenRequest,
    ) -> Result<ClusterToken, VendorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kubernetes_cluster_decodes_with_missing_fields() {
        let json = r#"{
            "cluster_id": "c-123",
            "name": "prod",
            "state": "running",
            "region_id": "cn-beijing",
            "current_version": "1.14.8-aliyun.1",
            "tags": [{"key": "env", "value": "prod"}]
        }"#;
        let cluster: KubernetesCluster = serde_json::from_str(json).unwrap();
        assert_eq!(cluster.cluster_id, "c-123");
        assert_eq!(cluster.current_version, "1.14.8-aliyun.1");
        assert_eq!(cluster.tags, vec![Tag::new("env", "prod")]);
        assert!(cluster.vpc_id.is_empty());
    }

    #[test]
    fn permanent_token_requires_active_and_no_expiry() {
        let token = ClusterToken {
            token: "t".to_string(),
            expired: 0,
            is_active: 1,
            ..Default::default()
        };
        assert!(token.is_permanent());

        let expiring = ClusterToken {
            expired: 1_600_000_000,
            ..token.clone()
        };
        assert!(!expiring.is_permanent());

        let inactive = ClusterToken {
            is_active: 0,
            ..token
        };
        assert!(!inactive.is_permanent());
    }

    #[test]
    fn permanent_token_request_omits_expiry() {
        let body = serde_json::to_string(&ClusterTokenRequest::permanent()).unwrap();
        assert_eq!(body, r#"{"is_permanently":true}"#);
    }
}
