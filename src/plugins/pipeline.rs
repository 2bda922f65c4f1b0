// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin Handler and Reception Pipeline
//!
//! [`PluginHandler`] instantiates and configures the decoders and forwarders
//! declared in a [`PluginHandlerParameters`]. [`ReceptionPipeline`] drives an
//! input through them.
//!
//! # Failure Semantics
//!
//! - No decoder able to handle the input: the input is rejected.
//! - A decoder fails: logged, the remaining decoders still run. The input is
//!   rejected only when every relevant decoder failed.
//! - Forwarders run concurrently; every failure is collected and reported in
//!   a single error after all of them finished.

use futures::future::join_all;
use tracing::{debug, error, info};

use super::{Policy, PolicyDecoder, PolicyForwarder, PolicyInput};
use crate::errors::{DistributionError, DistributionResult};
use crate::parameters::distribution::ConfigurationMap;
use crate::parameters::{ConfigurationParameters, PluginHandlerParameters};
use crate::registry::PluginRegistry;

/// Message used when no decoder accepts an input
pub const NO_DECODER_MESSAGE: &str = "No decoder available matching requirements";

/// Configured decoders and forwarders of one reception handler
pub struct PluginHandler {
    policy_decoders: Vec<Box<dyn PolicyDecoder>>,
    policy_forwarders: Vec<Box<dyn PolicyForwarder>>,
}

impl PluginHandler {
    /// Instantiate and configure every declared plugin
    ///
    /// A plugin naming a configuration that is not declared fails the whole
    /// handler.
    pub fn new(
        parameters: &PluginHandlerParameters,
        decoder_configurations: &ConfigurationMap,
        forwarder_configurations: &ConfigurationMap,
        registry: &PluginRegistry,
    ) -> DistributionResult<Self> {
        let mut policy_decoders = Vec::new();
        for decoder_parameters in parameters.policy_decoders().into_iter().flat_map(|m| m.values()) {
            let class_name = decoder_parameters.decoder_class_name().unwrap_or_default();
            let mut decoder = registry.create_policy_decoder(class_name)?;
            let configuration = lookup_configuration(
                "policy decoder",
                decoder_parameters.decoder_configuration_name(),
                decoder_configurations,
            )?;
            decoder.configure(configuration)?;
            debug!(class_name, "policy decoder initialized");
            policy_decoders.push(decoder);
        }

        let mut policy_forwarders = Vec::new();
        for forwarder_parameters in parameters.policy_forwarders().into_iter().flat_map(|m| m.values()) {
            let class_name = forwarder_parameters.forwarder_class_name().unwrap_or_default();
            let mut forwarder = registry.create_policy_forwarder(class_name)?;
            let configuration = lookup_configuration(
                "policy forwarder",
                forwarder_parameters.forwarder_configuration_name(),
                forwarder_configurations,
            )?;
            forwarder.configure(configuration)?;
            debug!(class_name, "policy forwarder initialized");
            policy_forwarders.push(forwarder);
        }

        Ok(Self::from_plugins(policy_decoders, policy_forwarders))
    }

    /// Assemble a handler from already configured plugins
    pub fn from_plugins(
        policy_decoders: Vec<Box<dyn PolicyDecoder>>,
        policy_forwarders: Vec<Box<dyn PolicyForwarder>>,
    ) -> Self {
        Self {
            policy_decoders,
            policy_forwarders,
        }
    }

    pub fn policy_decoders(&self) -> &[Box<dyn PolicyDecoder>] {
        &self.policy_decoders
    }

    pub fn policy_forwarders(&self) -> &[Box<dyn PolicyForwarder>] {
        &self.policy_forwarders
    }
}

fn lookup_configuration<'a>(
    role: &str,
    name: Option<&str>,
    configurations: &'a ConfigurationMap,
) -> DistributionResult<Option<&'a ConfigurationParameters>> {
    match name {
        None => Ok(None),
        Some(name) => configurations
            .get(name)
            .map(|configuration| Some(configuration.as_ref()))
            .ok_or_else(|| {
                DistributionError::PluginInitialization(format!(
                    "{} configuration \"{}\" is not defined",
                    role, name
                ))
            }),
    }
}

/// Decode/forward flow of one reception handler
pub struct ReceptionPipeline {
    name: String,
    plugin_handler: PluginHandler,
}

impl ReceptionPipeline {
    pub fn new(name: impl Into<String>, plugin_handler: PluginHandler) -> Self {
        Self {
            name: name.into(),
            plugin_handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin_handler(&self) -> &PluginHandler {
        &self.plugin_handler
    }

    /// Decode the input and forward the resulting policies
    pub async fn input_received(&self, input: &PolicyInput) -> DistributionResult<()> {
        let policies = self.decode(input).await?;
        info!(
            pipeline = %self.name,
            input = %input.name(),
            policies = policies.len(),
            "input decoded"
        );
        self.forward(&policies).await
    }

    async fn decode(&self, input: &PolicyInput) -> DistributionResult<Vec<Policy>> {
        let relevant: Vec<&dyn PolicyDecoder> = self
            .plugin_handler
            .policy_decoders
            .iter()
            .map(|decoder| decoder.as_ref())
            .filter(|decoder| decoder.can_handle(input))
            .collect();
        if relevant.is_empty() {
            return Err(DistributionError::Decoding(NO_DECODER_MESSAGE.to_string()));
        }

        let mut policies = Vec::new();
        let mut failures = Vec::new();
        for decoder in &relevant {
            match decoder.decode(input).await {
                Ok(decoded) => policies.extend(decoded),
                Err(err) => {
                    error!(pipeline = %self.name, input = %input.name(), "couldn't decode the policy: {}", err);
                    failures.push(err.to_string());
                }
            }
        }

        if failures.len() == relevant.len() {
            return Err(DistributionError::Decoding(format!(
                "failed to decode \"{}\": {}",
                input.name(),
                failures.join("; ")
            )));
        }
        Ok(policies)
    }

    async fn forward(&self, policies: &[Policy]) -> DistributionResult<()> {
        let results = join_all(
            self.plugin_handler
                .policy_forwarders
                .iter()
                .map(|forwarder| forwarder.forward(policies)),
        )
        .await;

        let failures: Vec<String> = results
            .into_iter()
            .filter_map(|result| result.err())
            .map(|err| err.to_string())
            .collect();
        if failures.is_empty() {
            return Ok(());
        }

        for failure in &failures {
            error!(pipeline = %self.name, "error when forwarding policies: {}", failure);
        }
        Err(DistributionError::Forwarding(format!(
            "{} of {} policy forwarder(s) failed: {}",
            failures.len(),
            self.plugin_handler.policy_forwarders.len(),
            failures.join("; ")
        )))
    }
}
