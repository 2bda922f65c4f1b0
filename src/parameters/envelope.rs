// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin Configuration Envelopes
//!
//! Plugin-specific settings are open-ended, so the configuration file wraps
//! them in an envelope naming the type that knows how to read them:
//!
//! ```json
//! {
//!   "parameterClassName": "policy_distribution::plugins::file::FilePolicyForwarderParameterGroup",
//!   "parameters": { "path": "/tmp/policies", "verbose": true }
//! }
//! ```
//!
//! The class name is resolved against the [`PluginRegistry`], whose
//! configuration factory deserializes `parameters` into a concrete
//! [`PluginConfiguration`].

use std::any::Any;
use std::fmt;

use serde_json::Value;

use super::{GroupValidationResult, ParameterGroup};
use crate::errors::{DistributionError, DistributionResult};
use crate::registry::PluginRegistry;

/// Envelope field holding the configuration type name
pub const PARAMETER_CLASS_NAME: &str = "parameterClassName";

/// Envelope field holding the plugin-specific settings
pub const PARAMETERS: &str = "parameters";

/// Plugin-specific configuration carried inside an envelope
pub trait PluginConfiguration: fmt::Debug + Send + Sync + 'static {
    /// Validate the settings, reporting under the given group name
    fn validate(&self, name: &str) -> GroupValidationResult;

    /// Access to the concrete type for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// A named, resolved configuration envelope
///
/// The name is the key the envelope was declared under, assigned once at
/// construction. Plugins refer to it through their `*ConfigurationName`.
#[derive(Debug)]
pub struct ConfigurationParameters {
    name: String,
    class_name: String,
    parameters: Box<dyn PluginConfiguration>,
}

impl ConfigurationParameters {
    pub fn new(
        name: impl Into<String>,
        class_name: impl Into<String>,
        parameters: Box<dyn PluginConfiguration>,
    ) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            parameters,
        }
    }

    /// Resolve an envelope value against the registry
    pub fn from_envelope(
        name: impl Into<String>,
        envelope: &Value,
        registry: &PluginRegistry,
    ) -> DistributionResult<Self> {
        let class_name = envelope_class_name(envelope)?;
        let parameters = envelope.get(PARAMETERS).cloned().unwrap_or(Value::Null);

        let configuration = registry
            .resolve_configuration(&class_name, parameters)
            .ok_or_else(|| {
                let message = format!(
                    "parameter \"{}\" value \"{}\", could not find class",
                    PARAMETER_CLASS_NAME, class_name
                );
                tracing::warn!("{}", message);
                DistributionError::ConfigurationClass(message)
            })?
            .map_err(|err| {
                DistributionError::ConfigurationClass(format!(
                    "parameter \"{}\" of class \"{}\" invalid in JSON file: {}",
                    PARAMETERS, class_name, err
                ))
            })?;

        Ok(Self::new(name, class_name, configuration))
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The settings as their concrete type, if they are of type `T`
    pub fn parameters<T: PluginConfiguration>(&self) -> Option<&T> {
        self.parameters.as_any().downcast_ref::<T>()
    }
}

impl ParameterGroup for ConfigurationParameters {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, _registry: &PluginRegistry) -> GroupValidationResult {
        self.parameters.validate(&self.name)
    }
}

/// Extract `parameterClassName` with whitespace removed
fn envelope_class_name(envelope: &Value) -> DistributionResult<String> {
    let raw = match envelope.get(PARAMETER_CLASS_NAME) {
        Some(Value::String(name)) if !name.is_empty() => {
            return Ok(name.chars().filter(|c| !c.is_whitespace()).collect());
        }
        Some(Value::String(name)) => name.clone(),
        None | Some(Value::Null) => "null".to_string(),
        Some(other) => other.to_string(),
    };

    let message = format!(
        "parameter \"{}\" value \"{}\" invalid in JSON file",
        PARAMETER_CLASS_NAME, raw
    );
    tracing::warn!("{}", message);
    Err(DistributionError::ConfigurationClass(message))
}
