// Copyright (c) 2025 - Cowboy AI, Inc.
//! Root distribution parameter group

use std::collections::BTreeMap;
use std::sync::Arc;

use super::validation::{validate_group_map, GroupMapValidationResult};
use super::{
    ConfigurationParameters, GroupValidationResult, ParameterGroup, ReceptionHandlerParameters,
};
use crate::registry::PluginRegistry;

/// Named map of resolved configuration envelopes
pub type ConfigurationMap = BTreeMap<String, Arc<ConfigurationParameters>>;

/// Root of the distribution configuration
#[derive(Debug, Clone, Default)]
pub struct DistributionParameterGroup {
    name: Option<String>,
    reception_handler_parameters: Option<BTreeMap<String, ReceptionHandlerParameters>>,
    reception_handler_configuration_parameters: ConfigurationMap,
    policy_decoder_configuration_parameters: ConfigurationMap,
    policy_forwarder_configuration_parameters: ConfigurationMap,
}

impl DistributionParameterGroup {
    pub fn new(
        name: Option<String>,
        reception_handler_parameters: Option<BTreeMap<String, ReceptionHandlerParameters>>,
    ) -> Self {
        Self {
            name,
            reception_handler_parameters,
            ..Default::default()
        }
    }

    pub fn with_reception_handler_configurations(mut self, configurations: ConfigurationMap) -> Self {
        self.reception_handler_configuration_parameters = configurations;
        self
    }

    pub fn with_policy_decoder_configurations(mut self, configurations: ConfigurationMap) -> Self {
        self.policy_decoder_configuration_parameters = configurations;
        self
    }

    pub fn with_policy_forwarder_configurations(mut self, configurations: ConfigurationMap) -> Self {
        self.policy_forwarder_configuration_parameters = configurations;
        self
    }

    pub fn reception_handler_parameters(
        &self,
    ) -> Option<&BTreeMap<String, ReceptionHandlerParameters>> {
        self.reception_handler_parameters.as_ref()
    }

    pub fn reception_handler_configuration_parameters(&self) -> &ConfigurationMap {
        &self.reception_handler_configuration_parameters
    }

    pub fn policy_decoder_configuration_parameters(&self) -> &ConfigurationMap {
        &self.policy_decoder_configuration_parameters
    }

    pub fn policy_forwarder_configuration_parameters(&self) -> &ConfigurationMap {
        &self.policy_forwarder_configuration_parameters
    }
}

impl ParameterGroup for DistributionParameterGroup {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("null")
    }

    fn validate(&self, registry: &PluginRegistry) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(self.name(), "DistributionParameterGroup");
        result.validate_non_blank("name", self.name.as_deref());
        result.set_map_result(validate_group_map(
            "receptionHandlerParameters",
            self.reception_handler_parameters.as_ref(),
            "must have at least one reception handler",
            |handler| handler.validate(registry),
        ));

        for (map_name, configurations) in [
            (
                "receptionHandlerConfigurationParameters",
                &self.reception_handler_configuration_parameters,
            ),
            (
                "policyDecoderConfigurationParameters",
                &self.policy_decoder_configuration_parameters,
            ),
            (
                "policyForwarderConfigurationParameters",
                &self.policy_forwarder_configuration_parameters,
            ),
        ] {
            if configurations.is_empty() {
                continue;
            }
            let mut map = GroupMapValidationResult::new(map_name);
            for (key, configuration) in configurations {
                map.add(key.clone(), configuration.validate(registry));
            }
            result.set_map_result(map);
        }
        result
    }
}
