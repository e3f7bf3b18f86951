//! Vela Core
//!
//! Core library for reading cloud resources as typed snapshots and waiting
//! for their status to converge.
//!
//! ## Module Structure
//!
//! - `status` - Case-insensitive lifecycle status
//! - `snapshot` - Immutable point-in-time reads
//! - `describe` - The `Describer` trait implemented per resource kind
//! - `waiter` - Poll-until-converged loop
//! - `task` - Run any operation as a spawned task or with a callback
//! - `provider` - Provider trait and error taxonomy
//! - `resource` / `schema` - Declarative resource values and validation

pub mod describe;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod snapshot;
pub mod status;
pub mod task;
pub mod waiter;

pub use describe::Describer;
pub use provider::{ProviderError, ProviderResult};
pub use snapshot::Snapshot;
pub use status::Status;
pub use waiter::{WaitTarget, Waiter, WaiterConfig};
