//! Vela Alibaba Cloud Provider
//!
//! Reads Alibaba Cloud resources as typed snapshots and waits for their
//! status to converge.
//!
//! ## Module Structure
//!
//! - `client` - Container Service client trait and payload types
//! - `cs` - `CsService` wrapper: describers, waits, tokens, user data
//! - `hbase` - HBase instances data source
//! - `actions` - Typed RPC actions (EMR, RDS)
//! - `invoker` - Retry vendor calls on transient error codes
//! - `user_data` - Node attach script composer
//! - `config` - Provider configuration
//! - `resources` - Resource type definitions and schemas
//! - `provider` - AlicloudProvider implementation

pub mod actions;
pub mod client;
pub mod config;
pub mod cs;
pub mod error;
pub mod hbase;
pub mod invoker;
pub mod provider;
pub mod resources;
pub mod user_data;

// Re-export main types
pub use client::CsApi;
pub use config::ProviderConfig;
pub use cs::{ClusterFlavor, CsService};
pub use error::VendorError;
pub use hbase::{HbaseApi, HbaseInstancesDataSource};
pub use invoker::Invoker;
pub use provider::AlicloudProvider;
pub use user_data::{UserDataParams, compose_user_data};

use vela_core::provider::{BoxFuture, Provider, ProviderResult};
use vela_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for AlicloudProvider {
    fn name(&self) -> &'static str {
        "alicloud"
    }

    fn resource_types(&self) -> Vec<Box<dyn vela_core::provider::ResourceType>> {
        resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move {
            self.read_resource(&id.resource_type, &id.name, identifier.as_deref())
                .await
        })
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.read_data_source_resource(&resource).await })
    }
}
