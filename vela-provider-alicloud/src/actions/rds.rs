//! ApsaraDB RDS actions

use serde::{Deserialize, Serialize};

use super::RpcAction;

/// Read a parameter template and its parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeParameterGroup {
    pub resource_owner_id: Option<i64>,
    pub resource_owner_account: String,
    pub owner_id: Option<i64>,
    pub parameter_group_id: String,
}

impl DescribeParameterGroup {
    pub fn new(parameter_group_id: impl Into<String>) -> Self {
        Self {
            parameter_group_id: parameter_group_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeParameterGroupResponse {
    pub request_id: String,
    pub param_group: ParamGroup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ParamGroup {
    pub parameter_group: Vec<ParameterGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ParameterGroup {
    pub parameter_group_id: String,
    pub parameter_group_name: String,
    pub parameter_group_desc: String,
    pub parameter_group_type: i32,
    pub engine: String,
    pub engine_version: String,
    pub force_restart: i32,
    pub param_counts: i32,
    pub param_detail: ParamDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ParamDetail {
    pub parameter_detail: Vec<ParameterDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ParameterDetail {
    pub param_name: String,
    pub param_value: String,
}

impl RpcAction for DescribeParameterGroup {
    const PRODUCT: &'static str = "Rds";
    const VERSION: &'static str = "2014-08-15";
    const ACTION: &'static str = "DescribeParameterGroup";
    const LOCATION_CODE: &'static str = "rds";

    type Response = DescribeParameterGroupResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::invoke;
    use crate::actions::testing::FakeTransport;

    #[tokio::test]
    async fn describe_parameter_group_decodes_nested_details() {
        let transport = FakeTransport::answering(
            r#"{
                "RequestId": "A1B2",
                "ParamGroup": {
                    "ParameterGroup": [{
                        "ParameterGroupId": "rpg-1",
                        "ParameterGroupName": "tuned",
                        "Engine": "mysql",
                        "EngineVersion": "5.7",
                        "ParamCounts": 1,
                        "ParamDetail": {
                            "ParameterDetail": [
                                {"ParamName": "back_log", "ParamValue": "3000"}
                            ]
                        }
                    }]
                }
            }"#,
        );

        let response = invoke(&transport, &DescribeParameterGroup::new("rpg-1"))
            .await
            .unwrap();
        let group = &response.param_group.parameter_group[0];
        assert_eq!(group.engine, "mysql");
        assert_eq!(
            group.param_detail.parameter_detail[0],
            ParameterDetail {
                param_name: "back_log".to_string(),
                param_value: "3000".to_string(),
            }
        );

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].action, "DescribeParameterGroup");
        assert_eq!(sent[0].query.len(), 1);
        assert_eq!(sent[0].query["ParameterGroupId"], "rpg-1");
    }
}
