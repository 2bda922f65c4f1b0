// Copyright (c) 2025 - Cowboy AI, Inc.
//! Policy forwarder parameters

use serde::{Deserialize, Serialize};

use super::{validate_class_name, GroupValidationResult, ParameterGroup};
use crate::registry::PluginRegistry;

/// Declares one policy forwarder of a plugin handler
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyForwarderParameters {
    forwarder_type: Option<String>,
    forwarder_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    forwarder_configuration_name: Option<String>,
}

impl PolicyForwarderParameters {
    pub fn new(
        forwarder_type: impl Into<String>,
        forwarder_class_name: impl Into<String>,
        forwarder_configuration_name: Option<String>,
    ) -> Self {
        Self {
            forwarder_type: Some(forwarder_type.into()),
            forwarder_class_name: Some(forwarder_class_name.into()),
            forwarder_configuration_name,
        }
    }

    pub fn forwarder_type(&self) -> Option<&str> {
        self.forwarder_type.as_deref()
    }

    pub fn forwarder_class_name(&self) -> Option<&str> {
        self.forwarder_class_name.as_deref()
    }

    pub fn forwarder_configuration_name(&self) -> Option<&str> {
        self.forwarder_configuration_name.as_deref()
    }
}

impl ParameterGroup for PolicyForwarderParameters {
    fn name(&self) -> &str {
        self.forwarder_type.as_deref().unwrap_or("null")
    }

    fn validate(&self, registry: &PluginRegistry) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(self.name(), "PolicyForwarderParameters");
        result.validate_non_blank("forwarderType", self.forwarder_type());
        validate_class_name(
            &mut result,
            "forwarderClassName",
            self.forwarder_class_name(),
            "policy forwarder",
            |name| registry.has_policy_forwarder(name),
        );
        result
    }
}
