// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution Activator
//!
//! Starts and stops every reception handler declared in a validated
//! [`DistributionParameterGroup`].
//!
//! # Startup
//!
//! ```text
//! for each reception handler (in name order):
//!     PluginHandler::new ─▶ ReceptionPipeline ─▶ registry.create_reception_handler
//!                                                      │
//!                                                      ▼
//!                                        handler.initialize(ReceptionContext)
//! ```
//!
//! A handler failing to start aborts startup; handlers already started are
//! destroyed again before the error is returned.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::errors::{DistributionError, DistributionResult};
use crate::parameters::{DistributionParameterGroup, ParameterGroup, ReceptionHandlerParameters};
use crate::plugins::{
    DistributionStatistics, PluginHandler, ReceptionContext, ReceptionHandler, ReceptionPipeline,
    StatisticsReport,
};
use crate::registry::PluginRegistry;

struct RunningHandler {
    name: String,
    handler: Box<dyn ReceptionHandler>,
}

/// Owns the running reception handlers of one distribution service
pub struct DistributionActivator {
    parameters: DistributionParameterGroup,
    registry: PluginRegistry,
    statistics: Arc<DistributionStatistics>,
    running: Vec<RunningHandler>,
    alive: bool,
}

impl DistributionActivator {
    pub fn new(parameters: DistributionParameterGroup, registry: PluginRegistry) -> Self {
        Self {
            parameters,
            registry,
            statistics: Arc::new(DistributionStatistics::new()),
            running: Vec::new(),
            alive: false,
        }
    }

    pub fn parameters(&self) -> &DistributionParameterGroup {
        &self.parameters
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Counters shared by every reception handler
    pub fn statistics(&self) -> Arc<DistributionStatistics> {
        self.statistics.clone()
    }

    pub fn statistics_report(&self) -> StatisticsReport {
        self.statistics.report()
    }

    /// Names of the running reception handlers
    pub fn reception_handler_names(&self) -> Vec<&str> {
        self.running.iter().map(|running| running.name.as_str()).collect()
    }

    /// Start every reception handler
    pub async fn initialize(&mut self) -> DistributionResult<()> {
        if self.alive {
            return Err(DistributionError::Controller(format!(
                "distribution service \"{}\" is already running",
                self.parameters.name()
            )));
        }
        debug!(service = %self.parameters.name(), "policy distribution starting");

        let handlers: Vec<ReceptionHandlerParameters> = self
            .parameters
            .reception_handler_parameters()
            .into_iter()
            .flat_map(|handlers| handlers.values().cloned())
            .collect();

        for parameters in &handlers {
            let started = self.start_handler(parameters).await;
            match started {
                Ok(handler) => self.running.push(RunningHandler {
                    name: parameters.name().to_string(),
                    handler,
                }),
                Err(err) => {
                    error!(handler = %parameters.name(), "reception handler failed to start: {}", err);
                    self.destroy_all().await;
                    return Err(err);
                }
            }
        }

        self.alive = true;
        info!(
            service = %self.parameters.name(),
            reception_handlers = self.running.len(),
            "policy distribution started"
        );
        Ok(())
    }

    async fn start_handler(
        &self,
        parameters: &ReceptionHandlerParameters,
    ) -> DistributionResult<Box<dyn ReceptionHandler>> {
        let plugin_parameters = parameters.plugin_handler_parameters().ok_or_else(|| {
            DistributionError::PluginInitialization(format!(
                "reception handler \"{}\" has no plugin handler parameters",
                parameters.name()
            ))
        })?;
        let plugin_handler = PluginHandler::new(
            plugin_parameters,
            self.parameters.policy_decoder_configuration_parameters(),
            self.parameters.policy_forwarder_configuration_parameters(),
            &self.registry,
        )?;

        let configuration = match parameters.reception_handler_configuration_name() {
            None => None,
            Some(name) => Some(
                self.parameters
                    .reception_handler_configuration_parameters()
                    .get(name)
                    .cloned()
                    .ok_or_else(|| {
                        DistributionError::PluginInitialization(format!(
                            "reception handler configuration \"{}\" is not defined",
                            name
                        ))
                    })?,
            ),
        };

        let class_name = parameters.reception_handler_class_name().unwrap_or_default();
        let mut handler = self.registry.create_reception_handler(class_name)?;
        handler
            .initialize(ReceptionContext {
                name: parameters.name().to_string(),
                pipeline: Arc::new(ReceptionPipeline::new(parameters.name(), plugin_handler)),
                configuration,
                statistics: self.statistics.clone(),
            })
            .await?;
        debug!(handler = %parameters.name(), class_name, "reception handler started");
        Ok(handler)
    }

    /// Stop every reception handler
    ///
    /// All handlers are destroyed even when some fail; the first failure is
    /// returned.
    pub async fn terminate(&mut self) -> DistributionResult<()> {
        let first_failure = self.destroy_all().await;
        self.alive = false;
        info!(service = %self.parameters.name(), "policy distribution stopped");
        first_failure.map_or(Ok(()), Err)
    }

    async fn destroy_all(&mut self) -> Option<DistributionError> {
        let mut first_failure = None;
        for mut running in self.running.drain(..) {
            if let Err(err) = running.handler.destroy().await {
                error!(handler = %running.name, "reception handler failed to stop: {}", err);
                first_failure.get_or_insert(err);
            }
        }
        first_failure
    }
}
