//! Provider configuration

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vela_core::provider::{ProviderError, ProviderResult};
use vela_core::resource::Value;
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use vela_core::waiter::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaiterConfig};

/// Upper bound for the poll interval and the default timeout (one day)
pub const MAX_WAIT_SECS: u64 = 24 * 60 * 60;

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Settings shared by every service of the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Region all calls are sent to (e.g., "cn-beijing")
    pub region: String,
    /// Log every describe payload at debug level
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Timeout used when a wait is requested with a zero timeout
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,
}

impl ProviderConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            debug: false,
            poll_interval_secs: default_poll_interval_secs(),
            default_timeout_secs: default_timeout_secs(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProviderError::configuration(format!("invalid provider config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Schema of the provider block attributes
    pub fn schema() -> ResourceSchema {
        ResourceSchema::new("provider.alicloud")
            .attribute(
                AttributeSchema::new("region", types::non_empty_string())
                    .required()
                    .with_description("Region all calls are sent to"),
            )
            .attribute(AttributeSchema::new("debug", AttributeType::Bool))
            .attribute(
                AttributeSchema::new("poll_interval", types::positive_int())
                    .with_description("Seconds between two polls"),
            )
            .attribute(
                AttributeSchema::new("default_timeout", wait_seconds())
                    .with_description("Seconds a wait lasts when no timeout is given"),
            )
    }

    /// Build from attributes of a provider block
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<Self> {
        Self::schema().validate(attributes).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            ProviderError::configuration(format!(
                "invalid provider block: {}",
                messages.join("; ")
            ))
        })?;

        let region = get_string(attributes, "region")
            .ok_or_else(|| ProviderError::configuration("region is required"))?;

        let mut config = Self::new(region);
        config.debug = get_bool(attributes, "debug").unwrap_or(false);
        if let Some(secs) = get_secs(attributes, "poll_interval")? {
            config.poll_interval_secs = secs;
        }
        if let Some(secs) = get_secs(attributes, "default_timeout")? {
            config.default_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if self.region.trim().is_empty() {
            return Err(ProviderError::configuration("region must not be empty"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ProviderError::configuration(
                "poll_interval must be at least one second",
            ));
        }
        if self.poll_interval_secs > MAX_WAIT_SECS {
            return Err(ProviderError::configuration(format!(
                "poll_interval must not exceed {} seconds",
                MAX_WAIT_SECS
            )));
        }
        if self.default_timeout_secs > MAX_WAIT_SECS {
            return Err(ProviderError::configuration(format!(
                "default_timeout must not exceed {} seconds",
                MAX_WAIT_SECS
            )));
        }
        Ok(())
    }

    pub fn waiter_config(&self) -> WaiterConfig {
        WaiterConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            default_timeout: Duration::from_secs(self.default_timeout_secs),
            debug: self.debug,
        }
    }
}

/// Whole seconds between zero and `MAX_WAIT_SECS`
fn wait_seconds() -> AttributeType {
    AttributeType::Custom {
        name: "WaitSeconds".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(n) if (0..=MAX_WAIT_SECS as i64).contains(n) => Ok(()),
            Value::Int(_) => Err(format!(
                "Value must be between 0 and {} seconds",
                MAX_WAIT_SECS
            )),
            _ => Err("Expected integer".to_string()),
        },
    }
}

fn get_string<'a>(attributes: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    match attributes.get(key) {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn get_bool(attributes: &HashMap<String, Value>, key: &str) -> Option<bool> {
    match attributes.get(key) {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    }
}

fn get_secs(attributes: &HashMap<String, Value>, key: &str) -> ProviderResult<Option<u64>> {
    match attributes.get(key) {
        None => Ok(None),
        Some(Value::Int(n)) => u64::try_from(*n)
            .map(Some)
            .map_err(|_| ProviderError::configuration(format!("{} must not be negative", key))),
        Some(other) => Err(ProviderError::configuration(format!(
            "{} must be an integer number of seconds, got {:?}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_defaults() {
        let config = ProviderConfig::from_json(r#"{"region": "cn-hangzhou"}"#).unwrap();
        assert_eq!(config, ProviderConfig::new("cn-hangzhou"));
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.default_timeout_secs, 120);
    }

    #[test]
    fn json_rejects_zero_interval() {
        let err =
            ProviderConfig::from_json(r#"{"region": "cn-hangzhou", "poll_interval_secs": 0}"#)
                .unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn attributes_override_defaults() {
        let mut attributes = HashMap::new();
        attributes.insert("region".to_string(), Value::from("cn-beijing"));
        attributes.insert("debug".to_string(), Value::Bool(true));
        attributes.insert("poll_interval".to_string(), Value::Int(2));

        let config = ProviderConfig::from_attributes(&attributes).unwrap();
        let waiter = config.waiter_config();
        assert!(waiter.debug);
        assert_eq!(waiter.poll_interval, Duration::from_secs(2));
        assert_eq!(waiter.default_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn attributes_require_region() {
        let err = ProviderConfig::from_attributes(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains("Required attribute 'region' is missing"));

        let mut attributes = HashMap::new();
        attributes.insert("region".to_string(), Value::from("  "));
        assert!(ProviderConfig::from_attributes(&attributes).is_err());
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let mut attributes = HashMap::new();
        attributes.insert("region".to_string(), Value::from("cn-beijing"));
        attributes.insert("default_timeout".to_string(), Value::Int(-1));
        let err = ProviderConfig::from_attributes(&attributes).unwrap_err();
        assert!(err.to_string().contains("between 0 and 86400 seconds"));

        attributes.insert("default_timeout".to_string(), Value::Int(86_401));
        assert!(ProviderConfig::from_attributes(&attributes).is_err());
    }

    #[test]
    fn zero_poll_interval_attribute_is_rejected() {
        let mut attributes = HashMap::new();
        attributes.insert("region".to_string(), Value::from("cn-beijing"));
        attributes.insert("poll_interval".to_string(), Value::Int(0));
        let err = ProviderConfig::from_attributes(&attributes).unwrap_err();
        assert!(err.to_string().contains("Value must be positive"));
    }

    #[test]
    fn json_rejects_unbounded_timeout() {
        let err = ProviderConfig::from_json(
            r#"{"region": "cn-beijing", "default_timeout_secs": 18446744073709551615}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("default_timeout must not exceed"));

        let config = ProviderConfig::from_json(
            r#"{"region": "cn-beijing", "default_timeout_secs": 86400}"#,
        )
        .unwrap();
        assert_eq!(config.waiter_config().default_timeout, Duration::from_secs(86_400));
    }
}
