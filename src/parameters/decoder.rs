// Copyright (c) 2025 - Cowboy AI, Inc.
//! Policy decoder parameters

use serde::{Deserialize, Serialize};

use super::{validate_class_name, GroupValidationResult, ParameterGroup};
use crate::registry::PluginRegistry;

/// Declares one policy decoder of a plugin handler
///
/// The decoder type doubles as the group name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecoderParameters {
    decoder_type: Option<String>,
    decoder_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decoder_configuration_name: Option<String>,
}

impl PolicyDecoderParameters {
    pub fn new(
        decoder_type: impl Into<String>,
        decoder_class_name: impl Into<String>,
        decoder_configuration_name: Option<String>,
    ) -> Self {
        Self {
            decoder_type: Some(decoder_type.into()),
            decoder_class_name: Some(decoder_class_name.into()),
            decoder_configuration_name,
        }
    }

    pub fn decoder_type(&self) -> Option<&str> {
        self.decoder_type.as_deref()
    }

    pub fn decoder_class_name(&self) -> Option<&str> {
        self.decoder_class_name.as_deref()
    }

    pub fn decoder_configuration_name(&self) -> Option<&str> {
        self.decoder_configuration_name.as_deref()
    }
}

impl ParameterGroup for PolicyDecoderParameters {
    fn name(&self) -> &str {
        self.decoder_type.as_deref().unwrap_or("null")
    }

    fn validate(&self, registry: &PluginRegistry) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(self.name(), "PolicyDecoderParameters");
        result.validate_non_blank("decoderType", self.decoder_type());
        validate_class_name(
            &mut result,
            "decoderClassName",
            self.decoder_class_name(),
            "policy decoder",
            |name| registry.has_policy_decoder(name),
        );
        result
    }
}
