// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution Client Contract
//!
//! The SDC distribution client library is an external collaborator. This
//! module defines the surface the reception handler needs from it: the
//! init/start/stop lifecycle, artifact download and status reporting.
//! Notifications are pushed back through a [`NotificationCallback`] handed
//! to [`DistributionClient::init`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::configuration::SdcConfiguration;

/// Failure reported by the distribution client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ClientError {
    pub reason: String,
}

impl ClientError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Artifact announced by a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    pub artifact_name: String,
    pub artifact_type: String,
    pub artifact_url: String,
    #[serde(default)]
    pub artifact_version: Option<String>,
}

/// Resource instance of a distributed service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstance {
    pub resource_name: String,
    pub resource_type: String,
    #[serde(default)]
    pub artifacts: Vec<ArtifactInfo>,
}

/// Content of a distribution notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub distribution_id: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub service_artifacts: Vec<ArtifactInfo>,
    #[serde(default)]
    pub resources: Vec<ResourceInstance>,
}

/// Status values reported back to the distribution service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionStatus {
    DownloadOk,
    DownloadError,
    DeployOk,
    DeployError,
    DistributionCompleteOk,
    DistributionCompleteError,
}

/// Per-artifact download or deployment status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStatusMessage {
    pub distribution_id: String,
    pub consumer_id: String,
    pub artifact_url: String,
    pub status: DistributionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a whole notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalDistributionStatusMessage {
    pub distribution_id: String,
    pub consumer_id: String,
    pub status: DistributionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Receives notifications from the distribution client
///
/// The client may invoke the callback concurrently from its own tasks.
#[async_trait]
pub trait NotificationCallback: Send + Sync {
    async fn activate_callback(&self, notification: NotificationData);
}

/// Handle on a remote distribution service
#[async_trait]
pub trait DistributionClient: Send + Sync {
    /// Register with the distribution service
    async fn init(
        &self,
        configuration: &SdcConfiguration,
        callback: Arc<dyn NotificationCallback>,
    ) -> Result<(), ClientError>;

    /// Start polling for notifications
    async fn start(&self) -> Result<(), ClientError>;

    /// Stop polling and unregister
    async fn stop(&self) -> Result<(), ClientError>;

    /// Fetch an artifact payload
    async fn download(&self, artifact: &ArtifactInfo) -> Result<Vec<u8>, ClientError>;

    async fn send_download_status(
        &self,
        message: &DistributionStatusMessage,
        error_reason: Option<&str>,
    ) -> Result<(), ClientError>;

    async fn send_deployment_status(
        &self,
        message: &DistributionStatusMessage,
        error_reason: Option<&str>,
    ) -> Result<(), ClientError>;

    async fn send_final_distribution_status(
        &self,
        message: &FinalDistributionStatusMessage,
        error_reason: Option<&str>,
    ) -> Result<(), ClientError>;
}

/// Creates distribution client handles
pub trait DistributionClientFactory: Send + Sync {
    fn create_client(&self) -> Arc<dyn DistributionClient>;
}

impl<F> DistributionClientFactory for F
where
    F: Fn() -> Arc<dyn DistributionClient> + Send + Sync,
{
    fn create_client(&self) -> Arc<dyn DistributionClient> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_notification_from_json() {
        let notification: NotificationData = serde_json::from_str(
            r#"{
                "distributionId": "d-1",
                "resources": [{
                    "resourceName": "vfw",
                    "resourceType": "VF",
                    "artifacts": [{
                        "artifactName": "policy.json",
                        "artifactType": "TOSCA_CSAR",
                        "artifactUrl": "/sdc/v1/catalog/policy.json"
                    }]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(notification.distribution_id, "d-1");
        assert!(notification.service_artifacts.is_empty());
        assert_eq!(notification.resources[0].artifacts[0].artifact_version, None);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(DistributionStatus::DistributionCompleteError).unwrap(),
            serde_json::json!("DISTRIBUTION_COMPLETE_ERROR")
        );
    }
}
