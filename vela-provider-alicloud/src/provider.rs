//! Alibaba Cloud Provider implementation
//!
//! This module contains the provider that reads Container Service clusters
//! and evaluates data sources, turning typed snapshots into `State` values
//! through the attribute schemas in `resources`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use vela_core::provider::{ProviderError, ProviderResult, ResourceType};
use vela_core::resource::{Resource, ResourceId, State, Value};
use vela_core::schema::ResourceSchema;
use vela_core::snapshot::Snapshot;
use vela_core::waiter::Waiter;

use crate::client::{CsApi, Tag};
use crate::config::ProviderConfig;
use crate::cs::{CsService, tags_to_map};
use crate::hbase::{DATA_SOURCE_TYPE, HbaseApi, HbaseInstancesDataSource};
use crate::resources::{
    CS_KUBERNETES, CS_MANAGED_KUBERNETES, CS_SERVERLESS_KUBERNETES, CsKubernetesType,
    CsManagedKubernetesType, CsServerlessKubernetesType,
};

/// Alibaba Cloud Provider
pub struct AlicloudProvider {
    config: ProviderConfig,
    cs: CsService,
    hbase: HbaseInstancesDataSource,
}

impl AlicloudProvider {
    /// Create a provider from a validated config and vendor clients
    pub fn new(
        config: ProviderConfig,
        cs_api: Arc<dyn CsApi>,
        hbase_api: Arc<dyn HbaseApi>,
    ) -> ProviderResult<Self> {
        config.validate()?;
        let waiter = Waiter::new(config.waiter_config());
        log::debug!(
            "alicloud provider for {} (poll every {}s)",
            config.region,
            config.poll_interval_secs
        );

        Ok(Self {
            cs: CsService::new(cs_api).with_waiter(waiter),
            hbase: HbaseInstancesDataSource::new(hbase_api),
            config,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn cs(&self) -> &CsService {
        &self.cs
    }

    pub fn hbase(&self) -> &HbaseInstancesDataSource {
        &self.hbase
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Read a cluster by its vendor identifier
    pub async fn read_resource(
        &self,
        resource_type: &str,
        name: &str,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        let id = ResourceId::new(resource_type, name);

        let identifier = match identifier {
            Some(identifier) => identifier,
            None => return Ok(State::not_found(id)),
        };

        let result = match resource_type {
            CS_KUBERNETES => {
                let snapshot = self.cs.describe_kubernetes(identifier).await;
                snapshot.and_then(|s| snapshot_to_state(id.clone(), &CsKubernetesType.schema(), s))
            }
            CS_MANAGED_KUBERNETES => {
                let snapshot = self.cs.describe_managed_kubernetes(identifier).await;
                snapshot.and_then(|s| {
                    snapshot_to_state(id.clone(), &CsManagedKubernetesType.schema(), s)
                })
            }
            CS_SERVERLESS_KUBERNETES => {
                let snapshot = self.cs.describe_serverless_kubernetes(identifier).await;
                snapshot.and_then(|s| {
                    snapshot_to_state(id.clone(), &CsServerlessKubernetesType.schema(), s)
                })
            }
            other => {
                return Err(ProviderError::configuration(format!(
                    "Unknown resource type: {}",
                    other
                )));
            }
        };

        match result {
            Err(e) if e.is_not_found() => {
                log::debug!("{} ({}) no longer exists", id, identifier);
                Ok(State::not_found(id))
            }
            other => other,
        }
    }

    /// Evaluate a data source declaration
    pub async fn read_data_source_resource(&self, resource: &Resource) -> ProviderResult<State> {
        match resource.id.resource_type.as_str() {
            DATA_SOURCE_TYPE => self.hbase.read(resource).await,
            other => Err(ProviderError::configuration(format!(
                "Unknown data source: {}",
                other
            ))),
        }
    }
}

/// Map snapshot details to state attributes through `provider_name`
fn snapshot_to_state<T: Serialize>(
    id: ResourceId,
    schema: &ResourceSchema,
    snapshot: Snapshot<T>,
) -> ProviderResult<State> {
    let props = serde_json::to_value(snapshot.details())
        .map_err(|e| ProviderError::invalid_response(&schema.resource_type, e.to_string()))?;

    let mut attributes = HashMap::new();
    for (name, attr_schema) in &schema.attributes {
        // Tags are filtered below
        if name == "tags" {
            continue;
        }
        if let Some(vendor_name) = &attr_schema.provider_name
            && let Some(value) = props.get(vendor_name.as_str())
            && let Some(v) = json_to_value(value)
        {
            attributes.insert(name.clone(), v);
        }
    }

    if let Some(tags) = props.get("tags").filter(|t| !t.is_null()).cloned() {
        let tags: Vec<Tag> = serde_json::from_value(tags).map_err(|e| {
            ProviderError::invalid_response(&schema.resource_type, format!("tags: {}", e))
        })?;
        let tags_map: HashMap<String, Value> = tags_to_map(&tags)
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        if !tags_map.is_empty() {
            attributes.insert("tags".to_string(), Value::Map(tags_map));
        }
    }

    Ok(State::existing(id, attributes).with_identifier(snapshot.identifier()))
}

/// Convert a JSON payload field to a state value
fn json_to_value(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::String(s) => Some(Value::String(s.clone())),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => n.as_i64().map(Value::Int),
        serde_json::Value::Array(arr) => Some(Value::List(
            arr.iter().filter_map(json_to_value).collect(),
        )),
        serde_json::Value::Object(map) => Some(Value::Map(
            map.iter()
                .filter_map(|(k, v)| json_to_value(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        serde_json::Value::Null => None,
    }
}
