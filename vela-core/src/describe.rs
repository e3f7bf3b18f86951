//! Describer - Read one remote resource by identifier

use std::fmt::Debug;
use std::sync::Arc;

use crate::provider::{BoxFuture, ProviderResult};
use crate::snapshot::Snapshot;

/// Reads a single resource kind through a vendor client.
///
/// Implementations classify vendor failures: absence becomes
/// `ProviderError::NotFound`, anything else `ProviderError::Transport`.
/// A describer never retries; retrying transient vendor errors belongs to the
/// client adapter underneath it.
pub trait Describer: Send + Sync {
    /// Vendor-specific details carried by each snapshot
    type Details: Debug + Send;

    /// Resource kind used in error messages (e.g., "CsKubernetes")
    fn kind(&self) -> &str;

    /// Read the resource identified by `id`
    fn describe<'a>(&'a self, id: &'a str)
    -> BoxFuture<'a, ProviderResult<Snapshot<Self::Details>>>;
}

impl<D: Describer + ?Sized> Describer for Arc<D> {
    type Details = D::Details;

    fn kind(&self) -> &str {
        (**self).kind()
    }

    fn describe<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Snapshot<Self::Details>>> {
        (**self).describe(id)
    }
}
