//! Snapshot - Immutable point-in-time read of a remote resource

use crate::provider::{ProviderError, ProviderResult};
use crate::status::Status;

/// Point-in-time read of a remote resource.
///
/// `T` carries the vendor-specific details of one resource kind. A snapshot
/// is never mutated after construction; every poll produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    identifier: String,
    status: Status,
    details: T,
}

impl<T> Snapshot<T> {
    pub fn new(identifier: impl Into<String>, status: impl Into<Status>, details: T) -> Self {
        Self {
            identifier: identifier.into(),
            status: status.into(),
            details,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn details(&self) -> &T {
        &self.details
    }

    pub fn into_details(self) -> T {
        self.details
    }

    /// Reject a snapshot whose identifier differs from the one requested.
    ///
    /// Vendor APIs occasionally answer with a stale or unrelated record;
    /// such a snapshot is reported as NotFound for `kind`.
    pub fn ensure_identifier(self, requested: &str, kind: &str) -> ProviderResult<Self> {
        if self.identifier == requested {
            Ok(self)
        } else {
            Err(ProviderError::not_found(kind, requested))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_identifier_accepts_matching_id() {
        let snapshot = Snapshot::new("c-123", "running", ());
        let snapshot = snapshot.ensure_identifier("c-123", "CsKubernetes").unwrap();
        assert_eq!(snapshot.status(), &Status::Running);
    }

    #[test]
    fn ensure_identifier_rejects_mismatch_as_not_found() {
        let snapshot = Snapshot::new("c-999", Status::Running, ());
        let err = snapshot
            .ensure_identifier("c-123", "CsKubernetes")
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "CsKubernetes c-123 is not found");
    }
}
