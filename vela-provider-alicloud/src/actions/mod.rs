//! Typed RPC actions
//!
//! Each action is a plain serializable struct describing one API call. Its
//! fields become query parameters, and `invoke` turns it into an
//! `RpcRequest`, sends it through an `RpcTransport` and decodes the typed
//! response. Running an action in the background, or with a callback, is
//! done with `vela_core::task` rather than per-action variants.

pub mod emr;
pub mod rds;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use vela_core::provider::{ProviderError, ProviderResult};

use crate::error::VendorError;

/// Endpoint type every action in this crate resolves against
pub const ENDPOINT_TYPE: &str = "openAPI";

/// One RPC-style API call
pub trait RpcAction: Serialize + Send + Sync {
    const PRODUCT: &'static str;
    const VERSION: &'static str;
    const ACTION: &'static str;
    /// Service code used for endpoint lookup
    const LOCATION_CODE: &'static str;

    type Response: DeserializeOwned + Send + 'static;

    /// Query parameters in wire naming. Unset and empty fields are omitted.
    fn query_params(&self) -> Result<BTreeMap<String, String>, VendorError> {
        let encoded = serde_json::to_value(self).map_err(|e| VendorError::Decode {
            action: Self::ACTION.to_string(),
            message: e.to_string(),
        })?;
        let serde_json::Value::Object(fields) = encoded else {
            return Err(VendorError::Decode {
                action: Self::ACTION.to_string(),
                message: "request must serialize to an object".to_string(),
            });
        };

        let mut params = BTreeMap::new();
        for (name, value) in fields {
            let rendered = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) if s.is_empty() => continue,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            params.insert(name, rendered);
        }
        Ok(params)
    }
}

/// Wire-level request handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    pub product: &'static str,
    pub version: &'static str,
    pub action: &'static str,
    pub location_code: &'static str,
    pub endpoint_type: &'static str,
    pub query: BTreeMap<String, String>,
}

impl RpcRequest {
    pub fn for_action<A: RpcAction>(action: &A) -> Result<Self, VendorError> {
        Ok(Self {
            product: A::PRODUCT,
            version: A::VERSION,
            action: A::ACTION,
            location_code: A::LOCATION_CODE,
            endpoint_type: ENDPOINT_TYPE,
            query: action.query_params()?,
        })
    }
}

/// Sends signed RPC requests and returns the raw JSON body
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(&self, request: &RpcRequest) -> Result<String, VendorError>;
}

/// Send `action` and decode its response
pub async fn invoke<A: RpcAction>(
    transport: &dyn RpcTransport,
    action: &A,
) -> ProviderResult<A::Response> {
    let request = RpcRequest::for_action(action).map_err(|e| {
        ProviderError::configuration(format!("cannot build {} request: {}", A::ACTION, e))
    })?;
    log::debug!("{} {} {:?}", A::PRODUCT, A::ACTION, request.query);

    let body = transport
        .send(&request)
        .await
        .map_err(|e| ProviderError::transport(A::ACTION, A::ACTION, A::PRODUCT, e))?;

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::invalid_response(A::ACTION, e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Transport answering every request with one canned body
    pub struct FakeTransport {
        pub body: Result<String, VendorError>,
        pub sent: Mutex<Vec<RpcRequest>>,
    }

    impl FakeTransport {
        pub fn answering(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: VendorError) -> Self {
            Self {
                body: Err(err),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RpcTransport for FakeTransport {
        async fn send(&self, request: &RpcRequest) -> Result<String, VendorError> {
            self.sent.lock().unwrap().push(request.clone());
            self.body.clone()
        }
    }
}
