// Copyright (c) 2025 - Cowboy AI, Inc.
//! SDC Reception Handler
//!
//! Owns a [`DistributionController`] and keeps trying to bring its client up
//! until it succeeds. The first attempt runs immediately, later ones every
//! `retryDelay` seconds (never less than [`MIN_RETRY_DELAY`]).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::client::{DistributionClientFactory, NotificationCallback};
use super::configuration::SdcReceptionHandlerConfigurationParameterGroup;
use super::controller::DistributionController;
use super::notification::SdcNotificationProcessor;
use crate::errors::{DistributionError, DistributionResult};
use crate::plugins::{ReceptionContext, ReceptionHandler};

/// Lower bound of the delay between two client initialization attempts
pub const MIN_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Receives policies from an SDC distribution service
pub struct SdcReceptionHandler {
    client_factory: Arc<dyn DistributionClientFactory>,
    controller: Option<DistributionController>,
    shutdown_token: CancellationToken,
    retry_task: Option<JoinHandle<()>>,
}

impl SdcReceptionHandler {
    pub const CLASS_NAME: &'static str = "policy_distribution::plugins::sdc::SdcReceptionHandler";

    pub fn new(client_factory: Arc<dyn DistributionClientFactory>) -> Self {
        Self {
            client_factory,
            controller: None,
            shutdown_token: CancellationToken::new(),
            retry_task: None,
        }
    }

    /// Controller created by [`initialize`](ReceptionHandler::initialize)
    pub fn controller(&self) -> Option<&DistributionController> {
        self.controller.as_ref()
    }
}

/// Configured retry delay, floored at [`MIN_RETRY_DELAY`]
pub fn retry_delay(parameters: &SdcReceptionHandlerConfigurationParameterGroup) -> Duration {
    let configured = Duration::from_secs(u64::try_from(parameters.retry_delay).unwrap_or(0));
    configured.max(MIN_RETRY_DELAY)
}

#[async_trait]
impl ReceptionHandler for SdcReceptionHandler {
    async fn initialize(&mut self, context: ReceptionContext) -> DistributionResult<()> {
        let configuration = context.configuration.as_ref().ok_or_else(|| {
            DistributionError::PluginInitialization(format!(
                "reception handler \"{}\" has no SDC configuration",
                context.name
            ))
        })?;
        let parameters = configuration
            .parameters::<SdcReceptionHandlerConfigurationParameterGroup>()
            .ok_or_else(|| {
                DistributionError::PluginInitialization(format!(
                    "configuration \"{}\" is not an SDC reception handler configuration",
                    configuration.class_name()
                ))
            })?;

        let controller =
            DistributionController::new(context.name.clone(), parameters.clone(), self.client_factory.clone());
        let callback: Arc<dyn NotificationCallback> = Arc::new(SdcNotificationProcessor::new(
            controller.clone(),
            context.pipeline.clone(),
            context.statistics.clone(),
            parameters.consumer_id.clone().unwrap_or_default(),
            parameters.artifact_types().to_vec(),
        ));

        let delay = retry_delay(parameters);
        let shutdown_token = self.shutdown_token.clone();
        let retrying = controller.clone();
        self.retry_task = Some(tokio::spawn(async move {
            let mut tick = interval(delay);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        match retrying.init(callback.clone()).await {
                            Ok(()) => break,
                            Err(err) => error!(
                                controller = %retrying.name(),
                                "{}. Initialization will be retried after {} seconds",
                                err,
                                delay.as_secs()
                            ),
                        }
                    }
                    _ = shutdown_token.cancelled() => {
                        debug!(controller = %retrying.name(), "client initialization retries cancelled");
                        break;
                    }
                }
            }
        }));

        info!(handler = %context.name, retry_delay_secs = delay.as_secs(), "SDC reception handler initializing");
        self.controller = Some(controller);
        Ok(())
    }

    async fn destroy(&mut self) -> DistributionResult<()> {
        self.shutdown_token.cancel();
        if let Some(retry_task) = self.retry_task.take() {
            retry_task.await.map_err(|err| {
                DistributionError::PluginInitialization(format!("client retry task failed: {}", err))
            })?;
        }
        if let Some(controller) = &self.controller {
            controller.close().await?;
        }
        self.controller = None;
        debug!("SDC reception handler stopped");
        Ok(())
    }
}
