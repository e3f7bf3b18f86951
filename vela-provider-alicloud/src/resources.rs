//! Resource type definitions for the Alibaba Cloud provider
//!
//! This module defines:
//! - Resource type definitions (implementing ResourceType trait)
//! - Attribute schemas mapping state attributes to vendor field names

use vela_core::provider::ResourceType;
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::hbase::{DATA_SOURCE_TYPE, HbaseInstancesDataSource};

pub const CS_KUBERNETES: &str = "cs_kubernetes";
pub const CS_MANAGED_KUBERNETES: &str = "cs_managed_kubernetes";
pub const CS_SERVERLESS_KUBERNETES: &str = "cs_serverless_kubernetes";

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $schema:expr) => {
        define_resource_type!($name, $type_name, $schema, false);
    };
    ($name:ident, $type_name:expr, $schema:expr, $data_source:expr) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn is_data_source(&self) -> bool {
                $data_source
            }
            fn schema(&self) -> ResourceSchema {
                $schema
            }
        }
    };
}

define_resource_type!(
    CsKubernetesType,
    CS_KUBERNETES,
    kubernetes_schema(CS_KUBERNETES)
);
define_resource_type!(
    CsManagedKubernetesType,
    CS_MANAGED_KUBERNETES,
    kubernetes_schema(CS_MANAGED_KUBERNETES)
);
define_resource_type!(
    CsServerlessKubernetesType,
    CS_SERVERLESS_KUBERNETES,
    serverless_schema()
);
define_resource_type!(
    HbaseInstancesType,
    DATA_SOURCE_TYPE,
    HbaseInstancesDataSource::schema(),
    true
);

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![
        Box::new(CsKubernetesType),
        Box::new(CsManagedKubernetesType),
        Box::new(CsServerlessKubernetesType),
        Box::new(HbaseInstancesType),
    ]
}

// =============================================================================
// Schemas
// =============================================================================

fn computed(name: &str, attr_type: AttributeType, vendor_name: &str) -> AttributeSchema {
    AttributeSchema::new(name, attr_type)
        .computed()
        .with_provider_name(vendor_name)
}

fn tags() -> AttributeSchema {
    computed(
        "tags",
        AttributeType::Map(Box::new(AttributeType::String)),
        "tags",
    )
}

fn kubernetes_schema(resource_type: &str) -> ResourceSchema {
    ResourceSchema::new(resource_type)
        .with_description("Kubernetes cluster of Container Service")
        .attribute(computed("name", AttributeType::String, "name"))
        .attribute(computed("state", AttributeType::String, "state"))
        .attribute(computed("region", AttributeType::String, "region_id"))
        .attribute(computed("zone_id", AttributeType::String, "zone_id"))
        .attribute(computed("cluster_type", AttributeType::String, "cluster_type"))
        .attribute(computed("version", AttributeType::String, "current_version"))
        .attribute(computed("vpc_id", AttributeType::String, "vpc_id"))
        .attribute(computed("vswitch_id", AttributeType::String, "vswitch_id"))
        .attribute(computed("master_url", AttributeType::String, "master_url"))
        .attribute(tags())
}

fn serverless_schema() -> ResourceSchema {
    ResourceSchema::new(CS_SERVERLESS_KUBERNETES)
        .with_description("Serverless Kubernetes cluster of Container Service")
        .attribute(computed("name", AttributeType::String, "name"))
        .attribute(computed("state", AttributeType::String, "state"))
        .attribute(computed("region", AttributeType::String, "region_id"))
        .attribute(computed("vpc_id", AttributeType::String, "vpc_id"))
        .attribute(computed("vswitch_id", AttributeType::String, "vswitch_id"))
        .attribute(computed("private_zone", AttributeType::Bool, "private_zone"))
        .attribute(tags())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hbase_instances_is_a_data_source() {
        let data_sources: Vec<_> = resource_types()
            .into_iter()
            .filter(|t| t.is_data_source())
            .map(|t| t.name())
            .collect();
        assert_eq!(data_sources, vec!["hbase_instances"]);
    }

    #[test]
    fn cluster_schemas_map_vendor_fields() {
        let schema = CsManagedKubernetesType.schema();
        assert_eq!(schema.resource_type, "cs_managed_kubernetes");
        let version = &schema.attributes["version"];
        assert!(version.computed);
        assert_eq!(version.provider_name.as_deref(), Some("current_version"));
    }
}
