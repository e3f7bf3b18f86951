//! HBase instances data source

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use vela_core::provider::{ProviderError, ProviderResult};
use vela_core::resource::{Resource, State, Value};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use crate::error::VendorError;
use crate::invoker::Invoker;

pub const DATA_SOURCE_TYPE: &str = "hbase_instances";

const SYSTEM: &str = "alicloud-hbase";

/// Page size requested from `DescribeInstances`
pub const PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HbaseInstance {
    pub instance_id: String,
    pub instance_name: String,
    pub region_id: String,
    pub zone_id: String,
    pub engine: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesRequest {
    pub page_number: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InstancePage {
    pub instances: Vec<HbaseInstance>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_count: u32,
}

#[async_trait]
pub trait HbaseApi: Send + Sync {
    async fn describe_instances(
        &self,
        request: &DescribeInstancesRequest,
    ) -> Result<InstancePage, VendorError>;
}

/// Filters taken from the data source arguments
#[derive(Debug, Default)]
struct InstanceFilter {
    ids: Option<HashSet<String>>,
    name_regex: Option<Regex>,
    zone_id: Option<String>,
}

impl InstanceFilter {
    fn from_resource(resource: &Resource) -> ProviderResult<Self> {
        let attrs = &resource.attributes;
        let mut filter = Self::default();

        if let Some(ids) = attrs.get("ids").and_then(Value::as_list) {
            filter.ids = Some(
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            );
        }

        if let Some(pattern) = attrs.get("name_regex").and_then(Value::as_str) {
            let regex = Regex::new(pattern).map_err(|e| ProviderError::Validation {
                resource: resource.id.clone(),
                errors: vec![format!("name_regex: {}", e)],
            })?;
            filter.name_regex = Some(regex);
        }

        filter.zone_id = attrs
            .get("availability_zone")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(filter)
    }

    fn accepts(&self, instance: &HbaseInstance) -> bool {
        if let Some(ids) = &self.ids
            && !ids.contains(&instance.instance_id)
        {
            return false;
        }
        if let Some(regex) = &self.name_regex
            && !regex.is_match(&instance.instance_name)
        {
            return false;
        }
        true
    }
}

/// Lists HBase instances matching ids, a name pattern and a zone
pub struct HbaseInstancesDataSource {
    api: Arc<dyn HbaseApi>,
    invoker: Invoker,
}

impl HbaseInstancesDataSource {
    pub fn new(api: Arc<dyn HbaseApi>) -> Self {
        Self {
            api,
            invoker: Invoker::default(),
        }
    }

    pub fn with_invoker(mut self, invoker: Invoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn schema() -> ResourceSchema {
        let instance = AttributeType::Map(Box::new(AttributeType::String));
        ResourceSchema::new(DATA_SOURCE_TYPE)
            .with_description("HBase instances visible to the account")
            .attribute(
                AttributeSchema::new("ids", types::string_list())
                    .with_description("Instance ids to keep"),
            )
            .attribute(
                AttributeSchema::new("name_regex", types::non_empty_string())
                    .with_description("Pattern instance names must match"),
            )
            .attribute(
                AttributeSchema::new("availability_zone", types::non_empty_string())
                    .with_provider_name("ZoneId"),
            )
            .attribute(AttributeSchema::new("names", types::string_list()).computed())
            .attribute(
                AttributeSchema::new("instances", AttributeType::List(Box::new(instance)))
                    .computed(),
            )
    }

    pub async fn read(&self, resource: &Resource) -> ProviderResult<State> {
        Self::schema()
            .validate(&resource.attributes)
            .map_err(|errors| ProviderError::Validation {
                resource: resource.id.clone(),
                errors: errors.iter().map(ToString::to_string).collect(),
            })?;
        let filter = InstanceFilter::from_resource(resource)?;

        let instances: Vec<HbaseInstance> = self
            .list_instances(filter.zone_id.as_deref())
            .await?
            .into_iter()
            .filter(|i| filter.accepts(i))
            .collect();
        log::debug!(
            "{} matched {} HBase instance(s)",
            resource.id,
            instances.len()
        );

        let mut attributes = HashMap::new();
        attributes.insert(
            "ids".to_string(),
            Value::List(
                instances
                    .iter()
                    .map(|i| Value::from(i.instance_id.as_str()))
                    .collect(),
            ),
        );
        attributes.insert(
            "names".to_string(),
            Value::List(
                instances
                    .iter()
                    .map(|i| Value::from(i.instance_name.as_str()))
                    .collect(),
            ),
        );
        attributes.insert(
            "instances".to_string(),
            Value::List(instances.iter().map(instance_to_value).collect()),
        );

        Ok(State::existing(resource.id.clone(), attributes))
    }

    async fn list_instances(&self, zone_id: Option<&str>) -> ProviderResult<Vec<HbaseInstance>> {
        let mut all = Vec::new();
        let mut request = DescribeInstancesRequest {
            page_number: 1,
            page_size: PAGE_SIZE,
            zone_id: zone_id.map(str::to_string),
        };

        loop {
            let api = &self.api;
            let req = &request;
            let page = match self.invoker.run(move || api.describe_instances(req)).await {
                Ok(page) => page,
                // An unknown zone has no instances
                Err(e) if e.is_not_found() && request.page_number == 1 => break,
                Err(e) => {
                    return Err(ProviderError::transport(
                        DATA_SOURCE_TYPE,
                        "DescribeInstances",
                        SYSTEM,
                        e,
                    ));
                }
            };

            let received = page.instances.len();
            all.extend(page.instances);
            // A zero total means the count was not reported
            let reached_total = page.total_count > 0 && all.len() >= page.total_count as usize;
            if received < request.page_size as usize || reached_total {
                break;
            }
            request.page_number += 1;
        }

        Ok(all)
    }
}

fn instance_to_value(instance: &HbaseInstance) -> Value {
    let fields = [
        ("id", &instance.instance_id),
        ("name", &instance.instance_name),
        ("region_id", &instance.region_id),
        ("zone_id", &instance.zone_id),
        ("engine", &instance.engine),
        ("status", &instance.status),
    ];
    Value::Map(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::from(v.as_str())))
            .collect(),
    )
}
