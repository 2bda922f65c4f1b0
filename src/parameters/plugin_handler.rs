// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin handler parameters: the decoders and forwarders of one reception
//! handler

use std::collections::BTreeMap;

use super::validation::validate_group_map;
use super::{
    GroupValidationResult, ParameterGroup, PolicyDecoderParameters, PolicyForwarderParameters,
};
use crate::registry::PluginRegistry;

/// Decoders and forwarders owned by exactly one reception handler
///
/// Both maps are required: an absent map and an empty map are reported with
/// different messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginHandlerParameters {
    name: String,
    policy_decoders: Option<BTreeMap<String, PolicyDecoderParameters>>,
    policy_forwarders: Option<BTreeMap<String, PolicyForwarderParameters>>,
}

impl PluginHandlerParameters {
    pub fn new(
        name: impl Into<String>,
        policy_decoders: Option<BTreeMap<String, PolicyDecoderParameters>>,
        policy_forwarders: Option<BTreeMap<String, PolicyForwarderParameters>>,
    ) -> Self {
        Self {
            name: name.into(),
            policy_decoders,
            policy_forwarders,
        }
    }

    pub fn policy_decoders(&self) -> Option<&BTreeMap<String, PolicyDecoderParameters>> {
        self.policy_decoders.as_ref()
    }

    pub fn policy_forwarders(&self) -> Option<&BTreeMap<String, PolicyForwarderParameters>> {
        self.policy_forwarders.as_ref()
    }
}

impl ParameterGroup for PluginHandlerParameters {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, registry: &PluginRegistry) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(&self.name, "PluginHandlerParameters");
        result.set_map_result(validate_group_map(
            "policyDecoders",
            self.policy_decoders.as_ref(),
            "must have at least one policy decoder",
            |decoder| decoder.validate(registry),
        ));
        result.set_map_result(validate_group_map(
            "policyForwarders",
            self.policy_forwarders.as_ref(),
            "must have at least one policy forwarder",
            |forwarder| forwarder.validate(registry),
        ));
        result
    }
}
