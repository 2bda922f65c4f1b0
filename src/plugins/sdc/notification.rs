// Copyright (c) 2025 - Cowboy AI, Inc.
//! SDC notification processing
//!
//! Every relevant artifact of a notification is downloaded and pushed
//! through the reception pipeline. Download and deployment outcomes are
//! reported per artifact, then a single final status for the whole
//! distribution.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::client::{
    ArtifactInfo, DistributionClient, DistributionStatus, DistributionStatusMessage,
    FinalDistributionStatusMessage, NotificationCallback, NotificationData,
};
use super::controller::DistributionController;
use crate::plugins::{DistributionStatistics, PolicyInput, ReceptionPipeline};

/// Resource types whose artifacts may carry policies
pub const RELEVANT_RESOURCE_TYPES: [&str; 2] = ["VF", "VL"];

/// Handles notifications delivered by the distribution client
pub struct SdcNotificationProcessor {
    controller: DistributionController,
    pipeline: Arc<ReceptionPipeline>,
    statistics: Arc<DistributionStatistics>,
    consumer_id: String,
    artifact_types: Vec<String>,
}

impl SdcNotificationProcessor {
    pub fn new(
        controller: DistributionController,
        pipeline: Arc<ReceptionPipeline>,
        statistics: Arc<DistributionStatistics>,
        consumer_id: impl Into<String>,
        artifact_types: Vec<String>,
    ) -> Self {
        Self {
            controller,
            pipeline,
            statistics,
            consumer_id: consumer_id.into(),
            artifact_types,
        }
    }

    /// Artifacts of the notification this consumer should process
    pub fn relevant_artifacts<'a>(&self, notification: &'a NotificationData) -> Vec<&'a ArtifactInfo> {
        let resource_artifacts = notification
            .resources
            .iter()
            .filter(|resource| RELEVANT_RESOURCE_TYPES.contains(&resource.resource_type.as_str()))
            .flat_map(|resource| resource.artifacts.iter());

        notification
            .service_artifacts
            .iter()
            .chain(resource_artifacts)
            .filter(|artifact| self.artifact_types.contains(&artifact.artifact_type))
            .collect()
    }

    async fn process(&self, client: &dyn DistributionClient, notification: &NotificationData) {
        self.statistics.update_total_distribution_count();

        let mut failures = Vec::new();
        for artifact in self.relevant_artifacts(notification) {
            if let Err(reason) = self.process_artifact(client, notification, artifact).await {
                failures.push(reason);
            }
        }

        let (status, reason) = if failures.is_empty() {
            self.statistics.update_distribution_success_count();
            (DistributionStatus::DistributionCompleteOk, None)
        } else {
            self.statistics.update_distribution_failure_count();
            (
                DistributionStatus::DistributionCompleteError,
                Some(format!("Failed to process the artifact(s): {}", failures.join("; "))),
            )
        };

        self.send_final_status(client, notification, status, reason.as_deref())
            .await;
    }

    /// Report a notification that could not be processed at all
    async fn reject(&self, client: &dyn DistributionClient, notification: &NotificationData, reason: &str) {
        self.statistics.update_total_distribution_count();
        self.statistics.update_distribution_failure_count();
        self.send_final_status(
            client,
            notification,
            DistributionStatus::DistributionCompleteError,
            Some(reason),
        )
        .await;
    }

    async fn send_final_status(
        &self,
        client: &dyn DistributionClient,
        notification: &NotificationData,
        status: DistributionStatus,
        reason: Option<&str>,
    ) {
        let message = FinalDistributionStatusMessage {
            distribution_id: notification.distribution_id.clone(),
            consumer_id: self.consumer_id.clone(),
            status,
            timestamp: Utc::now(),
        };
        match client.send_final_distribution_status(&message, reason).await {
            Ok(()) => debug!(distribution_id = %message.distribution_id, ?status, "final distribution status sent"),
            Err(err) => error!(
                distribution_id = %message.distribution_id,
                ?status,
                "failed sending final distribution status: {}",
                err
            ),
        }
    }

    async fn process_artifact(
        &self,
        client: &dyn DistributionClient,
        notification: &NotificationData,
        artifact: &ArtifactInfo,
    ) -> Result<(), String> {
        self.statistics.update_total_download_count();
        let payload = match client.download(artifact).await {
            Ok(payload) => {
                self.statistics.update_download_success_count();
                self.send_status(client, notification, artifact, DistributionStatus::DownloadOk, None)
                    .await;
                payload
            }
            Err(err) => {
                self.statistics.update_download_failure_count();
                let reason = format!(
                    "Failed to download artifact with name: {} due to: {}",
                    artifact.artifact_name, err
                );
                error!(distribution_id = %notification.distribution_id, "{}", reason);
                self.send_status(
                    client,
                    notification,
                    artifact,
                    DistributionStatus::DownloadError,
                    Some(&reason),
                )
                .await;
                return Err(reason);
            }
        };

        let input = PolicyInput::Artifact {
            name: artifact.artifact_name.clone(),
            payload,
        };
        match self.pipeline.input_received(&input).await {
            Ok(()) => {
                self.send_status(client, notification, artifact, DistributionStatus::DeployOk, None)
                    .await;
                Ok(())
            }
            Err(err) => {
                let reason = format!("Failed to deploy the artifact due to: {}", err);
                error!(distribution_id = %notification.distribution_id, artifact = %artifact.artifact_name, "{}", reason);
                self.send_status(
                    client,
                    notification,
                    artifact,
                    DistributionStatus::DeployError,
                    Some(&reason),
                )
                .await;
                Err(reason)
            }
        }
    }

    async fn send_status(
        &self,
        client: &dyn DistributionClient,
        notification: &NotificationData,
        artifact: &ArtifactInfo,
        status: DistributionStatus,
        error_reason: Option<&str>,
    ) {
        let message = DistributionStatusMessage {
            distribution_id: notification.distribution_id.clone(),
            consumer_id: self.consumer_id.clone(),
            artifact_url: artifact.artifact_url.clone(),
            status,
            timestamp: Utc::now(),
        };
        let sent = match status {
            DistributionStatus::DownloadOk | DistributionStatus::DownloadError => {
                client.send_download_status(&message, error_reason).await
            }
            _ => client.send_deployment_status(&message, error_reason).await,
        };
        if let Err(err) = sent {
            warn!(
                distribution_id = %message.distribution_id,
                artifact_url = %message.artifact_url,
                ?status,
                "failed sending distribution status: {}",
                err
            );
        }
    }
}

#[async_trait]
impl NotificationCallback for SdcNotificationProcessor {
    async fn activate_callback(&self, notification: NotificationData) {
        info!(distribution_id = %notification.distribution_id, "received notification");
        let _busy = match self.controller.enter_notification() {
            Ok(guard) => guard,
            Err(err) => {
                let reason = format!("Notification rejected by controller {}: {}", self.controller.name(), err);
                warn!(distribution_id = %notification.distribution_id, "{}", reason);
                if let Some(client) = self.controller.client() {
                    self.reject(client.as_ref(), &notification, &reason).await;
                }
                return;
            }
        };

        let Some(client) = self.controller.client() else {
            warn!(distribution_id = %notification.distribution_id, "notification ignored: no distribution client");
            return;
        };
        self.process(client.as_ref(), &notification).await;
        debug!(distribution_id = %notification.distribution_id, "processed notification");
    }
}
