//! Container Service wrapper
//!
//! `CsService` adapts a `CsApi` client to the provider conventions: vendor
//! failures are classified into `ProviderError`, payloads become typed
//! snapshots, and status waits go through the shared `Waiter`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use vela_core::describe::Describer;
use vela_core::provider::{BoxFuture, ProviderError, ProviderResult};
use vela_core::snapshot::Snapshot;
use vela_core::status::Status;
use vela_core::waiter::{WaitTarget, Waiter};

use crate::client::{
    ClusterCerts, ClusterSummary, ClusterToken, ClusterTokenRequest, CsApi, KubernetesCluster,
    Project, ServerlessCluster, Tag,
};
use crate::error::{APPLICATION_NOT_FOUND, ERROR_CLUSTER_NOT_FOUND};
use crate::invoker::Invoker;
use crate::user_data::{UserDataParams, autoscaler_labels, compose_user_data};

/// System identifier attached to transport errors
pub const SYSTEM: &str = "alicloud-cs";

/// Key prefixes of tags owned by the vendor, hidden from callers
const VENDOR_TAG_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Flavor of a cluster read through `DescribeKubernetesCluster`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterFlavor {
    Dedicated,
    Managed,
}

impl ClusterFlavor {
    pub fn kind(self) -> &'static str {
        match self {
            ClusterFlavor::Dedicated => "CsKubernetes",
            ClusterFlavor::Managed => "CsManagedKubernetes",
        }
    }
}

/// Container Service wrapper
pub struct CsService {
    api: Arc<dyn CsApi>,
    invoker: Invoker,
    waiter: Waiter,
    debug: bool,
}

impl CsService {
    pub fn new(api: Arc<dyn CsApi>) -> Self {
        Self {
            api,
            invoker: Invoker::default(),
            waiter: Waiter::default(),
            debug: false,
        }
    }

    pub fn with_invoker(mut self, invoker: Invoker) -> Self {
        self.invoker = invoker;
        self
    }

    /// Use `waiter` for every wait; its debug flag also enables payload logging
    pub fn with_waiter(mut self, waiter: Waiter) -> Self {
        self.debug = waiter.config().debug;
        self.waiter = waiter;
        self
    }

    pub fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    // =========================================================================
    // Describers
    // =========================================================================

    pub fn kubernetes(&self, flavor: ClusterFlavor) -> KubernetesDescriber<'_> {
        KubernetesDescriber {
            service: self,
            flavor,
        }
    }

    pub fn serverless_kubernetes(&self) -> ServerlessDescriber<'_> {
        ServerlessDescriber { service: self }
    }

    pub fn container_application(&self, cluster_name: &str) -> ApplicationDescriber<'_> {
        ApplicationDescriber {
            service: self,
            cluster_name: cluster_name.to_string(),
        }
    }

    pub async fn describe_kubernetes(
        &self,
        id: &str,
    ) -> ProviderResult<Snapshot<KubernetesCluster>> {
        self.describe_kubernetes_cluster(id, ClusterFlavor::Dedicated)
            .await
    }

    pub async fn describe_managed_kubernetes(
        &self,
        id: &str,
    ) -> ProviderResult<Snapshot<KubernetesCluster>> {
        self.describe_kubernetes_cluster(id, ClusterFlavor::Managed)
            .await
    }

    async fn describe_kubernetes_cluster(
        &self,
        id: &str,
        flavor: ClusterFlavor,
    ) -> ProviderResult<Snapshot<KubernetesCluster>> {
        let api = &self.api;
        let cluster = self
            .invoker
            .run(move || api.describe_kubernetes_cluster(id))
            .await
            .map_err(|e| {
                if e.is_not_found() || e.is_expected(&[ERROR_CLUSTER_NOT_FOUND]) {
                    ProviderError::not_found(flavor.kind(), id)
                } else {
                    ProviderError::transport(id, "DescribeKubernetesCluster", SYSTEM, e)
                }
            })?;

        if self.debug {
            log::debug!("DescribeKubernetesCluster {}: {:?}", id, cluster);
        }

        let status = Status::parse(&cluster.state);
        Snapshot::new(cluster.cluster_id.clone(), status, cluster)
            .ensure_identifier(id, flavor.kind())
    }

    pub async fn describe_serverless_kubernetes(
        &self,
        id: &str,
    ) -> ProviderResult<Snapshot<ServerlessCluster>> {
        let api = &self.api;
        let cluster = self
            .invoker
            .run(move || api.describe_serverless_kubernetes_cluster(id))
            .await
            .map_err(|e| {
                if e.is_expected(&[ERROR_CLUSTER_NOT_FOUND]) {
                    ProviderError::not_found("CsServerlessKubernetes", id)
                } else {
                    ProviderError::transport(id, "DescribeServerlessKubernetesCluster", SYSTEM, e)
                }
            })?;

        if self.debug {
            log::debug!("DescribeServerlessKubernetesCluster {}: {:?}", id, cluster);
        }

        let status = Status::parse(&cluster.state);
        Snapshot::new(cluster.cluster_id.clone(), status, cluster)
            .ensure_identifier(id, "CsServerlessKubernetes")
    }

    // =========================================================================
    // Swarm clusters and applications
    // =========================================================================

    /// Find a cluster by its exact (trimmed) name
    pub async fn cluster_by_name(&self, name: &str) -> ProviderResult<ClusterSummary> {
        let name = name.trim();
        let api = &self.api;
        let clusters = self
            .invoker
            .run(move || api.describe_clusters(name))
            .await
            .map_err(|e| ProviderError::transport(name, "DescribeClusters", SYSTEM, e))?;

        clusters
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ProviderError::not_found("Container Cluster", name))
    }

    pub async fn cluster_and_certs_by_name(
        &self,
        name: &str,
    ) -> ProviderResult<(ClusterSummary, ClusterCerts)> {
        let cluster = self.cluster_by_name(name).await?;
        let api = &self.api;
        let cluster_id = cluster.cluster_id.as_str();
        let certs = self
            .invoker
            .run(move || api.get_cluster_certs(cluster_id))
            .await
            .map_err(|e| ProviderError::transport(cluster_id, "GetClusterCerts", SYSTEM, e))?;
        Ok((cluster, certs))
    }

    pub async fn describe_container_application(
        &self,
        cluster_name: &str,
        app_name: &str,
    ) -> ProviderResult<Snapshot<Project>> {
        let app_name = app_name.trim();
        let (cluster, certs) = self.cluster_and_certs_by_name(cluster_name).await?;

        let project = self
            .api
            .get_project(&cluster, &certs, app_name)
            .await
            .map_err(|e| {
                if e.is_expected(&[APPLICATION_NOT_FOUND]) {
                    ProviderError::not_found("Container Application", app_name)
                } else {
                    ProviderError::transport(app_name, "GetProject", SYSTEM, e)
                }
            })?;

        if self.debug {
            log::debug!("GetProject {}/{}: {:?}", cluster_name, app_name, project);
        }

        let status = Status::parse(&project.current_state);
        Snapshot::new(project.name.clone(), status, project)
            .ensure_identifier(app_name, "Container Application")
    }

    // =========================================================================
    // Waits and refreshes
    // =========================================================================

    pub async fn wait_for_container_application(
        &self,
        cluster_name: &str,
        app_name: &str,
        status: Status,
        timeout: Duration,
    ) -> ProviderResult<()> {
        let describer = self.container_application(cluster_name);
        self.waiter
            .wait_for(&describer, app_name.trim(), &WaitTarget::new(status), timeout)
            .await
    }

    /// Wait until a cluster reports `target.status`
    pub async fn wait_for_cluster_status(
        &self,
        flavor: ClusterFlavor,
        id: &str,
        target: &WaitTarget,
        timeout: Duration,
    ) -> ProviderResult<()> {
        self.waiter
            .wait_for(&self.kubernetes(flavor), id, target, timeout)
            .await
    }

    /// Wait until the cluster exists, or until it is gone when `status` is Deleted
    pub async fn wait_for_kubernetes(
        &self,
        id: &str,
        status: Status,
        timeout: Duration,
    ) -> ProviderResult<()> {
        self.waiter
            .wait_for_existence(&self.kubernetes(ClusterFlavor::Dedicated), id, &status, timeout)
            .await
    }

    pub async fn wait_for_managed_kubernetes(
        &self,
        id: &str,
        status: Status,
        timeout: Duration,
    ) -> ProviderResult<()> {
        self.waiter
            .wait_for_existence(&self.kubernetes(ClusterFlavor::Managed), id, &status, timeout)
            .await
    }

    pub async fn wait_for_serverless_kubernetes(
        &self,
        id: &str,
        status: Status,
        timeout: Duration,
    ) -> ProviderResult<()> {
        self.waiter
            .wait_for_existence(&self.serverless_kubernetes(), id, &status, timeout)
            .await
    }

    pub async fn kubernetes_state_refresh(
        &self,
        id: &str,
        fail_states: &[Status],
    ) -> ProviderResult<Option<Snapshot<KubernetesCluster>>> {
        self.waiter
            .refresh(&self.kubernetes(ClusterFlavor::Dedicated), id, fail_states)
            .await
    }

    pub async fn managed_kubernetes_state_refresh(
        &self,
        id: &str,
        fail_states: &[Status],
    ) -> ProviderResult<Option<Snapshot<KubernetesCluster>>> {
        self.waiter
            .refresh(&self.kubernetes(ClusterFlavor::Managed), id, fail_states)
            .await
    }

    pub async fn serverless_kubernetes_state_refresh(
        &self,
        id: &str,
        fail_states: &[Status],
    ) -> ProviderResult<Option<Snapshot<ServerlessCluster>>> {
        self.waiter
            .refresh(&self.serverless_kubernetes(), id, fail_states)
            .await
    }

    // =========================================================================
    // Tokens and user data
    // =========================================================================

    /// Return an active non-expiring token, creating one if none exists
    pub async fn permanent_token(&self, cluster_id: &str) -> ProviderResult<String> {
        let tokens = self
            .api
            .describe_cluster_tokens(cluster_id)
            .await
            .map_err(|e| ProviderError::transport(cluster_id, "DescribeClusterTokens", SYSTEM, e))?;

        if let Some(token) = tokens.into_iter().find(ClusterToken::is_permanent) {
            return Ok(token.token);
        }

        log::info!("No permanent token for cluster {}, creating one", cluster_id);
        let token = self
            .api
            .create_cluster_token(cluster_id, &ClusterTokenRequest::permanent())
            .await
            .map_err(|e| ProviderError::transport(cluster_id, "CreateClusterToken", SYSTEM, e))?;

        if token.token.is_empty() {
            return Err(ProviderError::invalid_response(
                "CreateClusterToken",
                format!("empty token returned for cluster {}", cluster_id),
            ));
        }
        Ok(token.token)
    }

    /// Base64 user data that attaches a new node to the cluster
    pub async fn user_data(
        &self,
        cluster_id: &str,
        labels: &str,
        taints: &str,
    ) -> ProviderResult<String> {
        let token = self.permanent_token(cluster_id).await?;
        let labels = autoscaler_labels(labels);
        let snapshot = self.describe_kubernetes(cluster_id).await?;
        let cluster = snapshot.details();

        let params = UserDataParams::new(&cluster.current_version, &cluster.region_id, &token)
            .with_labels(&labels)
            .with_taints(taints);
        Ok(compose_user_data(&params))
    }
}

/// Convert cluster tags into a map, dropping vendor-owned tags
pub fn tags_to_map(tags: &[Tag]) -> BTreeMap<String, String> {
    tags.iter()
        .filter(|t| !is_vendor_tag(t))
        .map(|t| (t.key.clone(), t.value.clone()))
        .collect()
}

fn is_vendor_tag(tag: &Tag) -> bool {
    let ignored = VENDOR_TAG_PREFIXES.iter().any(|p| tag.key.starts_with(p));
    if ignored {
        log::debug!("Ignoring vendor tag {} (value: {})", tag.key, tag.value);
    }
    ignored
}

// =============================================================================
// Describer implementations
// =============================================================================

pub struct KubernetesDescriber<'a> {
    service: &'a CsService,
    flavor: ClusterFlavor,
}

impl Describer for KubernetesDescriber<'_> {
    type Details = KubernetesCluster;

    fn kind(&self) -> &str {
        self.flavor.kind()
    }

    fn describe<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Snapshot<KubernetesCluster>>> {
        Box::pin(self.service.describe_kubernetes_cluster(id, self.flavor))
    }
}

pub struct ServerlessDescriber<'a> {
    service: &'a CsService,
}

impl Describer for ServerlessDescriber<'_> {
    type Details = ServerlessCluster;

    fn kind(&self) -> &str {
        "CsServerlessKubernetes"
    }

    fn describe<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Snapshot<ServerlessCluster>>> {
        Box::pin(self.service.describe_serverless_kubernetes(id))
    }
}

/// Describes applications of one swarm cluster, keyed by application name
pub struct ApplicationDescriber<'a> {
    service: &'a CsService,
    cluster_name: String,
}

impl Describer for ApplicationDescriber<'_> {
    type Details = Project;

    fn kind(&self) -> &str {
        "Container Application"
    }

    fn describe<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ProviderResult<Snapshot<Project>>> {
        Box::pin(
            self.service
                .describe_container_application(&self.cluster_name, id),
        )
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::VendorError;

    /// Replays queued answers; the last answer repeats once the queue drains
    fn next<T: Clone>(queue: &Mutex<VecDeque<Result<T, VendorError>>>) -> Result<T, VendorError> {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(VendorError::service("Unexpected", "no answer queued")))
        }
    }

    #[derive(Default)]
    pub struct MockCs {
        pub clusters: Mutex<VecDeque<Result<KubernetesCluster, VendorError>>>,
        pub serverless: Mutex<VecDeque<Result<ServerlessCluster, VendorError>>>,
        pub projects: Mutex<VecDeque<Result<Project, VendorError>>>,
        pub summaries: Vec<ClusterSummary>,
        pub tokens: Vec<ClusterToken>,
        pub describe_calls: AtomicUsize,
        pub created_tokens: AtomicUsize,
    }

    impl MockCs {
        pub fn with_clusters(answers: Vec<Result<KubernetesCluster, VendorError>>) -> Self {
            Self {
                clusters: Mutex::new(answers.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CsApi for MockCs {
        async fn describe_clusters(&self, name: &str) -> Result<Vec<ClusterSummary>, VendorError> {
            Ok(self
                .summaries
                .iter()
                .filter(|c| c.name.contains(name))
                .cloned()
                .collect())
        }

        async fn get_cluster_certs(&self, _cluster_id: &str) -> Result<ClusterCerts, VendorError> {
            Ok(ClusterCerts::default())
        }

        async fn describe_kubernetes_cluster(
            &self,
            _cluster_id: &str,
        ) -> Result<KubernetesCluster, VendorError> {
            self.describe_calls.fetch_add(1, Ordering::SeqCst);
            next(&self.clusters)
        }

        async fn describe_serverless_kubernetes_cluster(
            &self,
            _cluster_id: &str,
        ) -> Result<ServerlessCluster, VendorError> {
            next(&self.serverless)
        }

        async fn get_project(
            &self,
            _cluster: &ClusterSummary,
            _certs: &ClusterCerts,
            _name: &str,
        ) -> Result<Project, VendorError> {
            next(&self.projects)
        }

        async fn describe_cluster_tokens(
            &self,
            _cluster_id: &str,
        ) -> Result<Vec<ClusterToken>, VendorError> {
            Ok(self.tokens.clone())
        }

        async fn create_cluster_token(
            &self,
            cluster_id: &str,
            request: &ClusterTokenRequest,
        ) -> Result<ClusterToken, VendorError> {
            assert!(request.is_permanently);
            self.created_tokens.fetch_add(1, Ordering::SeqCst);
            Ok(ClusterToken {
                token: "fresh.token".to_string(),
                cluster_id: cluster_id.to_string(),
                expired: 0,
                is_active: 1,
            })
        }
    }

    pub fn cluster(id: &str, state: &str) -> KubernetesCluster {
        KubernetesCluster {
            cluster_id: id.to_string(),
            name: "prod".to_string(),
            state: state.to_string(),
            region_id: "cn-beijing".to_string(),
            current_version: "1.14.8-aliyun.1".to_string(),
            ..Default::default()
        }
    }

    pub fn not_found() -> VendorError {
        VendorError::service(ERROR_CLUSTER_NOT_FOUND, "The cluster is not found")
    }
}
