//! User data composer for nodes joining a Kubernetes cluster
//!
//! The script downloads the attach script matching the cluster version from
//! the regional OSS bucket and runs it with a cluster token. The result is
//! base64-encoded so it can be passed as opaque instance metadata.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Label marking nodes managed by the cluster autoscaler
pub const DEFAULT_AUTOSCALER_TAG: &str = "k8s.io/cluster-autoscaler";

/// Inputs of the attach script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataParams<'a> {
    pub version: &'a str,
    pub region: &'a str,
    pub token: &'a str,
    /// Comma-separated `key=value` node labels
    pub labels: &'a str,
    /// Comma-separated `key=value:Effect` node taints
    pub taints: &'a str,
}

impl<'a> UserDataParams<'a> {
    pub fn new(version: &'a str, region: &'a str, token: &'a str) -> Self {
        Self {
            version,
            region,
            token,
            labels: "",
            taints: "",
        }
    }

    pub fn with_labels(mut self, labels: &'a str) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_taints(mut self, taints: &'a str) -> Self {
        self.taints = taints;
        self
    }
}

/// Append the autoscaler label to caller-supplied labels
pub fn autoscaler_labels(labels: &str) -> String {
    if labels.is_empty() {
        format!("{}=true", DEFAULT_AUTOSCALER_TAG)
    } else {
        format!("{},{}=true", labels, DEFAULT_AUTOSCALER_TAG)
    }
}

/// Render the attach script in plain text
pub fn attach_script(params: &UserDataParams<'_>) -> String {
    let mut extra_options = Vec::new();
    if !params.labels.is_empty() {
        extra_options.push(format!("--labels {}", params.labels));
    }
    if !params.taints.is_empty() {
        extra_options.push(format!("--taints {}", params.taints));
    }

    format!(
        "#!/bin/sh\ncurl http://aliacs-k8s-{region}.oss-{region}.aliyuncs.com/public/pkg/run/attach/{version}/attach_node.sh | bash -s -- --openapi-token {token} --ess true {extra}",
        region = params.region,
        version = params.version,
        token = params.token,
        extra = extra_options.join(" "),
    )
}

/// Render the attach script and base64-encode it
pub fn compose_user_data(params: &UserDataParams<'_>) -> String {
    STANDARD.encode(attach_script(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_without_options_keeps_trailing_space() {
        let params = UserDataParams::new("1.14.8-aliyun.1", "cn-beijing", "abc.123");
        assert_eq!(
            attach_script(&params),
            "#!/bin/sh\ncurl http://aliacs-k8s-cn-beijing.oss-cn-beijing.aliyuncs.com/public/pkg/run/attach/1.14.8-aliyun.1/attach_node.sh | bash -s -- --openapi-token abc.123 --ess true "
        );
    }

    #[test]
    fn script_appends_labels_then_taints() {
        let params = UserDataParams::new("1.16.9", "cn-hangzhou", "tok")
            .with_labels("pool=gpu")
            .with_taints("dedicated=gpu:NoSchedule");
        assert!(
            attach_script(&params)
                .ends_with("--ess true --labels pool=gpu --taints dedicated=gpu:NoSchedule")
        );
    }

    #[test]
    fn taints_alone_are_appended() {
        let params =
            UserDataParams::new("1.16.9", "cn-hangzhou", "tok").with_taints("a=b:NoExecute");
        assert!(attach_script(&params).ends_with("--ess true --taints a=b:NoExecute"));
    }

    #[test]
    fn user_data_is_standard_base64_of_script() {
        let params = UserDataParams::new("1.16.9", "cn-hangzhou", "tok").with_labels("a=b");
        let encoded = compose_user_data(&params);
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), attach_script(&params));
    }

    #[test]
    fn autoscaler_label_is_always_present() {
        assert_eq!(autoscaler_labels(""), "k8s.io/cluster-autoscaler=true");
        assert_eq!(
            autoscaler_labels("pool=gpu"),
            "pool=gpu,k8s.io/cluster-autoscaler=true"
        );
    }
}
