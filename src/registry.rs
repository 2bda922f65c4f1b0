// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin Registry
//!
//! Maps the class names used in the configuration file to factories. There
//! are four roles:
//!
//! - reception handlers
//! - policy decoders
//! - policy forwarders
//! - plugin configuration types (targets of `parameterClassName`)
//!
//! The registry is an ordinary value: it is built once at startup, populated
//! by explicit registration and passed to the loader and the activator.
//!
//! # Example
//!
//! ```rust
//! use policy_distribution::registry::PluginRegistry;
//! use policy_distribution::plugins::file::JsonPolicyDecoder;
//!
//! let registry = PluginRegistry::with_builtin_plugins();
//! assert!(registry.has_policy_decoder(JsonPolicyDecoder::CLASS_NAME));
//! assert!(!registry.has_policy_decoder("org.example.Missing"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{DistributionError, DistributionResult};
use crate::parameters::PluginConfiguration;
use crate::plugins::file::{
    FilePolicyForwarder, FilePolicyForwarderParameterGroup, FileSystemReceptionHandler,
    FileSystemReceptionHandlerConfigurationParameterGroup, JsonPolicyDecoder,
    JsonPolicyDecoderParameterGroup,
};
use crate::plugins::sdc::{
    DistributionClientFactory, SdcReceptionHandler, SdcReceptionHandlerConfigurationParameterGroup,
};
use crate::plugins::{PolicyDecoder, PolicyForwarder, ReceptionHandler};

/// Creates a reception handler instance
pub type ReceptionHandlerFactory = Arc<dyn Fn() -> Box<dyn ReceptionHandler> + Send + Sync>;

/// Creates a policy decoder instance
pub type PolicyDecoderFactory = Arc<dyn Fn() -> Box<dyn PolicyDecoder> + Send + Sync>;

/// Creates a policy forwarder instance
pub type PolicyForwarderFactory = Arc<dyn Fn() -> Box<dyn PolicyForwarder> + Send + Sync>;

/// Deserializes the `parameters` of an envelope into a configuration type
pub type ConfigurationFactory =
    Arc<dyn Fn(Value) -> Result<Box<dyn PluginConfiguration>, serde_json::Error> + Send + Sync>;

/// Class name → factory lookup for every plugin role
#[derive(Clone, Default)]
pub struct PluginRegistry {
    reception_handlers: HashMap<String, ReceptionHandlerFactory>,
    policy_decoders: HashMap<String, PolicyDecoderFactory>,
    policy_forwarders: HashMap<String, PolicyForwarderFactory>,
    configurations: HashMap<String, ConfigurationFactory>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the plugins shipped in this crate
    ///
    /// The SDC reception handler needs a distribution client library, so only
    /// its configuration type is registered here; see
    /// [`PluginRegistry::register_sdc_reception_handler`].
    pub fn with_builtin_plugins() -> Self {
        let mut registry = Self::new();
        registry
            .register_reception_handler(FileSystemReceptionHandler::CLASS_NAME, || {
                Box::new(FileSystemReceptionHandler::new())
            })
            .register_policy_decoder(JsonPolicyDecoder::CLASS_NAME, || {
                Box::new(JsonPolicyDecoder::new())
            })
            .register_policy_forwarder(FilePolicyForwarder::CLASS_NAME, || {
                Box::new(FilePolicyForwarder::new())
            })
            .register_configuration::<FileSystemReceptionHandlerConfigurationParameterGroup>(
                FileSystemReceptionHandlerConfigurationParameterGroup::CLASS_NAME,
            )
            .register_configuration::<SdcReceptionHandlerConfigurationParameterGroup>(
                SdcReceptionHandlerConfigurationParameterGroup::CLASS_NAME,
            )
            .register_configuration::<JsonPolicyDecoderParameterGroup>(
                JsonPolicyDecoderParameterGroup::CLASS_NAME,
            )
            .register_configuration::<FilePolicyForwarderParameterGroup>(
                FilePolicyForwarderParameterGroup::CLASS_NAME,
            );
        registry
    }

    pub fn register_reception_handler<F>(&mut self, class_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn ReceptionHandler> + Send + Sync + 'static,
    {
        let class_name = class_name.into();
        tracing::debug!(class_name = %class_name, "registered reception handler");
        self.reception_handlers.insert(class_name, Arc::new(factory));
        self
    }

    /// Register the SDC reception handler backed by the given client library
    pub fn register_sdc_reception_handler(
        &mut self,
        client_factory: Arc<dyn DistributionClientFactory>,
    ) -> &mut Self {
        self.register_reception_handler(SdcReceptionHandler::CLASS_NAME, move || {
            Box::new(SdcReceptionHandler::new(client_factory.clone()))
        })
    }

    pub fn register_policy_decoder<F>(&mut self, class_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn PolicyDecoder> + Send + Sync + 'static,
    {
        let class_name = class_name.into();
        tracing::debug!(class_name = %class_name, "registered policy decoder");
        self.policy_decoders.insert(class_name, Arc::new(factory));
        self
    }

    pub fn register_policy_forwarder<F>(&mut self, class_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn PolicyForwarder> + Send + Sync + 'static,
    {
        let class_name = class_name.into();
        tracing::debug!(class_name = %class_name, "registered policy forwarder");
        self.policy_forwarders.insert(class_name, Arc::new(factory));
        self
    }

    /// Register a configuration type deserialized straight from `parameters`
    pub fn register_configuration<T>(&mut self, class_name: impl Into<String>) -> &mut Self
    where
        T: PluginConfiguration + DeserializeOwned,
    {
        let factory: ConfigurationFactory = Arc::new(|value: Value| {
            serde_json::from_value::<T>(value)
                .map(|parameters| Box::new(parameters) as Box<dyn PluginConfiguration>)
        });
        self.configurations.insert(class_name.into(), factory);
        self
    }

    pub fn has_reception_handler(&self, class_name: &str) -> bool {
        self.reception_handlers.contains_key(class_name)
    }

    pub fn has_policy_decoder(&self, class_name: &str) -> bool {
        self.policy_decoders.contains_key(class_name)
    }

    pub fn has_policy_forwarder(&self, class_name: &str) -> bool {
        self.policy_forwarders.contains_key(class_name)
    }

    pub fn has_configuration(&self, class_name: &str) -> bool {
        self.configurations.contains_key(class_name)
    }

    pub fn create_reception_handler(&self, class_name: &str) -> DistributionResult<Box<dyn ReceptionHandler>> {
        self.reception_handlers
            .get(class_name)
            .map(|factory| factory())
            .ok_or_else(|| not_found("reception handler", class_name))
    }

    pub fn create_policy_decoder(&self, class_name: &str) -> DistributionResult<Box<dyn PolicyDecoder>> {
        self.policy_decoders
            .get(class_name)
            .map(|factory| factory())
            .ok_or_else(|| not_found("policy decoder", class_name))
    }

    pub fn create_policy_forwarder(&self, class_name: &str) -> DistributionResult<Box<dyn PolicyForwarder>> {
        self.policy_forwarders
            .get(class_name)
            .map(|factory| factory())
            .ok_or_else(|| not_found("policy forwarder", class_name))
    }

    /// Deserialize envelope parameters as the named configuration type
    ///
    /// Returns `None` when no such type is registered.
    pub fn resolve_configuration(
        &self,
        class_name: &str,
        parameters: Value,
    ) -> Option<Result<Box<dyn PluginConfiguration>, serde_json::Error>> {
        self.configurations
            .get(class_name)
            .map(|factory| factory(parameters))
    }
}

fn not_found(role: &'static str, class_name: &str) -> DistributionError {
    tracing::error!(role, class_name, "plugin class not registered");
    DistributionError::PluginNotFound {
        role,
        class_name: class_name.to_string(),
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("reception_handlers", &sorted_keys(&self.reception_handlers))
            .field("policy_decoders", &sorted_keys(&self.policy_decoders))
            .field("policy_forwarders", &sorted_keys(&self.policy_forwarders))
            .field("configurations", &sorted_keys(&self.configurations))
            .finish()
    }
}
