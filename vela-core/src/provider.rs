//! Provider - Trait abstracting resource reads and the error taxonomy shared
//! by every provider
//!
//! A Provider exposes remote resources of one cloud vendor as `State` values.
//! Lifecycle handlers (create, update, delete) live with the caller; the
//! provider is responsible for reading and classifying what it finds.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;
use crate::status::Status;

/// Boxed error carried as the cause of a transport failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by describers, waiters and providers
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The resource does not exist (yet, or anymore)
    #[error("{kind} {id} is not found")]
    NotFound { kind: String, id: String },

    /// The underlying call failed for a reason other than absence
    #[error("[{system}] {operation} failed for {id}: {source}")]
    Transport {
        id: String,
        operation: String,
        system: String,
        #[source]
        source: BoxError,
    },

    /// An observed status is one the caller declared unreachable-from
    #[error("Failed to reach target status for {id}. Current status is {status}")]
    UnreachableTargetStatus { id: String, status: Status },

    /// The deadline passed while still polling
    #[error(
        "Waiting for {id} to become {target} timed out after {} seconds. Got: {}",
        timeout.as_secs(),
        describe_last(last_identifier.as_deref(), last_status.as_ref())
    )]
    TimedOut {
        id: String,
        target: Status,
        timeout: Duration,
        last_identifier: Option<String>,
        last_status: Option<Status>,
    },

    /// Provider or resource configuration is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The vendor returned a payload that could not be interpreted
    #[error("Invalid response from {operation}: {message}")]
    InvalidResponse { operation: String, message: String },

    /// A spawned operation panicked or was aborted
    #[error("Task running {operation} did not complete: {message}")]
    Task { operation: String, message: String },

    /// Resource arguments failed schema validation
    #[error("Validation failed for {resource}: {}", errors.join("; "))]
    Validation {
        resource: ResourceId,
        errors: Vec<String>,
    },
}

fn describe_last(identifier: Option<&str>, status: Option<&Status>) -> String {
    match (identifier, status) {
        (Some(identifier), Some(status)) => format!("{} with status {}", identifier, status),
        _ => "resource not found".to_string(),
    }
}

impl ProviderError {
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn transport(
        id: impl Into<String>,
        operation: impl Into<String>,
        system: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Transport {
            id: id.into(),
            operation: operation.into(),
            system: system.into(),
            source: source.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "cs_kubernetes")
    fn name(&self) -> &'static str;

    /// Whether this type is a read-only data source
    fn is_data_source(&self) -> bool {
        false
    }

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.name())
    }
}

/// Main Provider trait
///
/// Each cloud vendor implements this trait. All operations are async and
/// read-only.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "alicloud")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Get the current state of a resource
    ///
    /// Returns `State::not_found()` if the resource does not exist or no
    /// identifier is known yet.
    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Evaluate a data source declaration
    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(id, identifier)
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read_data_source(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock Provider for testing
    struct MockProvider;

    impl Provider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read(
            &self,
            id: &ResourceId,
            identifier: Option<&str>,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let id = id.clone();
            let identifier = identifier.map(|s| s.to_string());
            Box::pin(async move {
                match identifier {
                    Some(identifier) => {
                        Ok(State::existing(id, Default::default()).with_identifier(identifier))
                    }
                    None => Ok(State::not_found(id)),
                }
            })
        }

        fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let id = resource.id.clone();
            Box::pin(async move { Ok(State::existing(id, Default::default())) })
        }
    }

    #[tokio::test]
    async fn mock_provider_read_without_identifier_returns_not_found() {
        let provider: Box<dyn Provider> = Box::new(MockProvider);
        let id = ResourceId::new("test", "example");
        let state = provider.read(&id, None).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn mock_provider_read_with_identifier_returns_existing() {
        let provider = MockProvider;
        let id = ResourceId::new("test", "example");
        let state = provider.read(&id, Some("mock-id-123")).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier, Some("mock-id-123".to_string()));
    }

    #[test]
    fn timed_out_display_includes_last_status() {
        let error = ProviderError::TimedOut {
            id: "c-456".to_string(),
            target: Status::Running,
            timeout: Duration::from_secs(5),
            last_identifier: Some("c-456".to_string()),
            last_status: Some(Status::Initial),
        };
        assert_eq!(
            error.to_string(),
            "Waiting for c-456 to become Running timed out after 5 seconds. Got: c-456 with status Initial"
        );
    }

    #[test]
    fn timed_out_display_without_snapshot() {
        let error = ProviderError::TimedOut {
            id: "c-1".to_string(),
            target: Status::Running,
            timeout: Duration::from_secs(60),
            last_identifier: None,
            last_status: None,
        };
        assert!(error.to_string().ends_with("Got: resource not found"));
    }

    #[test]
    fn transport_error_keeps_operation_and_source() {
        let cause = std::io::Error::other("connection reset");
        let error = ProviderError::transport("c-1", "DescribeKubernetesCluster", "cs", cause);
        assert_eq!(
            error.to_string(),
            "[cs] DescribeKubernetesCluster failed for c-1: connection reset"
        );
        assert!(std::error::Error::source(&error).is_some());
        assert!(!error.is_not_found());
    }
}
