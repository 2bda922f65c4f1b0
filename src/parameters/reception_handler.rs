// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reception handler parameters

use super::validation::STRING_TYPE;
use super::{
    validate_class_name, GroupValidationResult, ParameterGroup, PluginHandlerParameters,
    ValidationStatus,
};
use crate::registry::PluginRegistry;

/// One reception handler together with its decoders and forwarders
///
/// The name is derived once, at construction, as
/// `<distribution name>_<receptionHandlerType>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionHandlerParameters {
    name: String,
    reception_handler_type: Option<String>,
    reception_handler_class_name: Option<String>,
    reception_handler_configuration_name: Option<String>,
    plugin_handler_parameters: Option<PluginHandlerParameters>,
}

impl ReceptionHandlerParameters {
    pub fn new(
        distribution_name: &str,
        reception_handler_type: Option<String>,
        reception_handler_class_name: Option<String>,
        reception_handler_configuration_name: Option<String>,
        plugin_handler_parameters: Option<PluginHandlerParameters>,
    ) -> Self {
        Self {
            name: Self::derive_name(distribution_name, reception_handler_type.as_deref()),
            reception_handler_type,
            reception_handler_class_name,
            reception_handler_configuration_name,
            plugin_handler_parameters,
        }
    }

    /// `<distribution>_<type>`, with `null` standing in for a missing type
    pub fn derive_name(distribution_name: &str, reception_handler_type: Option<&str>) -> String {
        format!("{}_{}", distribution_name, reception_handler_type.unwrap_or("null"))
    }

    pub fn reception_handler_type(&self) -> Option<&str> {
        self.reception_handler_type.as_deref()
    }

    pub fn reception_handler_class_name(&self) -> Option<&str> {
        self.reception_handler_class_name.as_deref()
    }

    pub fn reception_handler_configuration_name(&self) -> Option<&str> {
        self.reception_handler_configuration_name.as_deref()
    }

    pub fn plugin_handler_parameters(&self) -> Option<&PluginHandlerParameters> {
        self.plugin_handler_parameters.as_ref()
    }
}

impl ParameterGroup for ReceptionHandlerParameters {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, registry: &PluginRegistry) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(&self.name, "ReceptionHandlerParameters");
        result.validate_non_blank("receptionHandlerType", self.reception_handler_type());
        validate_class_name(
            &mut result,
            "receptionHandlerClassName",
            self.reception_handler_class_name(),
            "reception handler",
            |name| registry.has_reception_handler(name),
        );

        match &self.plugin_handler_parameters {
            Some(plugin_handler) => result.set_group_result(plugin_handler.validate(registry)),
            None => result.set_field_result(
                "pluginHandlerParameters",
                "PluginHandlerParameters",
                "null",
                ValidationStatus::Invalid,
                "is null",
            ),
        }

        if let Some(configuration) = self.reception_handler_configuration_name() {
            if configuration.trim().is_empty() {
                result.set_field_result(
                    "receptionHandlerConfigurationName",
                    STRING_TYPE,
                    configuration,
                    ValidationStatus::Invalid,
                    "must be a non-blank string",
                );
            }
        }
        result
    }
}
