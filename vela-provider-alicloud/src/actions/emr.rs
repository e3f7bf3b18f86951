//! E-MapReduce actions

use serde::{Deserialize, Serialize};

use super::RpcAction;

/// Create a metadata backup rule under a backup plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBackupRule {
    pub resource_owner_id: Option<i64>,
    pub backup_method_type: String,
    pub description: String,
    pub backup_plan_id: String,
    pub metadata_type: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateBackupRuleResponse {
    pub request_id: String,
    pub id: String,
    pub name: String,
    pub description: String,
    pub metadata_type: String,
    pub backup_method_type: String,
    pub backup_plan_id: String,
}

impl RpcAction for CreateBackupRule {
    const PRODUCT: &'static str = "Emr";
    const VERSION: &'static str = "2016-04-08";
    const ACTION: &'static str = "CreateBackupRule";
    const LOCATION_CODE: &'static str = "emr";

    type Response = CreateBackupRuleResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::invoke;
    use crate::actions::testing::FakeTransport;

    #[tokio::test]
    async fn create_backup_rule_round_trip() {
        let transport = FakeTransport::answering(
            r#"{
                "RequestId": "9B2B7A4E",
                "Id": "br-1",
                "Name": "nightly",
                "MetadataType": "HIVE",
                "BackupMethodType": "FULL",
                "BackupPlanId": "bp-1"
            }"#,
        );
        let action = CreateBackupRule {
            resource_owner_id: Some(1234567890),
            backup_method_type: "FULL".to_string(),
            backup_plan_id: "bp-1".to_string(),
            metadata_type: "HIVE".to_string(),
            name: "nightly".to_string(),
            ..Default::default()
        };

        let response = invoke(&transport, &action).await.unwrap();
        assert_eq!(response.id, "br-1");
        assert!(response.description.is_empty());

        let sent = transport.sent.lock().unwrap();
        let request = &sent[0];
        assert_eq!(
            (request.product, request.version, request.location_code),
            ("Emr", "2016-04-08", "emr")
        );
        assert_eq!(request.query["ResourceOwnerId"], "1234567890");
        assert_eq!(request.query["BackupPlanId"], "bp-1");
        assert!(!request.query.contains_key("Description"));
    }
}
