// Copyright (c) 2025 - Cowboy AI, Inc.
//! JSON policy decoder
//!
//! Accepts three document shapes:
//!
//! ```json
//! { "name": "p1", "type": "onap.policies.Monitoring" }
//! [ { "name": "p1", "type": "..." }, { "name": "p2", "type": "..." } ]
//! { "policies": [ { "name": "p1", "type": "..." } ] }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{DistributionError, DistributionResult};
use crate::parameters::validation::{GroupValidationResult, ValidationStatus, STRING_TYPE};
use crate::parameters::{ConfigurationParameters, PluginConfiguration};
use crate::plugins::{Policy, PolicyDecoder, PolicyInput};

fn default_file_suffix() -> String {
    ".json".to_string()
}

/// Configuration of [`JsonPolicyDecoder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPolicyDecoderParameterGroup {
    #[serde(default = "default_file_suffix")]
    file_suffix: String,
    /// Only keep policies of these types; empty keeps everything
    #[serde(default)]
    policy_types: Vec<String>,
}

impl Default for JsonPolicyDecoderParameterGroup {
    fn default() -> Self {
        Self {
            file_suffix: default_file_suffix(),
            policy_types: Vec::new(),
        }
    }
}

impl JsonPolicyDecoderParameterGroup {
    pub const CLASS_NAME: &'static str =
        "policy_distribution::plugins::file::JsonPolicyDecoderParameterGroup";

    pub fn file_suffix(&self) -> &str {
        &self.file_suffix
    }

    pub fn policy_types(&self) -> &[String] {
        &self.policy_types
    }
}

impl PluginConfiguration for JsonPolicyDecoderParameterGroup {
    fn validate(&self, name: &str) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(name, "JsonPolicyDecoderParameterGroup");
        result.validate_non_blank("fileSuffix", Some(self.file_suffix.as_str()));
        for (index, policy_type) in self.policy_types.iter().enumerate() {
            if policy_type.trim().is_empty() {
                result.set_field_result(
                    format!("policyTypes[{}]", index),
                    STRING_TYPE,
                    policy_type.as_str(),
                    ValidationStatus::Invalid,
                    "must be a non-blank string",
                );
            }
        }
        result
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyDocument {
    Wrapped { policies: Vec<Policy> },
    Many(Vec<Policy>),
    Single(Policy),
}

/// Decodes policies from JSON files or artifacts
#[derive(Debug, Default)]
pub struct JsonPolicyDecoder {
    parameters: JsonPolicyDecoderParameterGroup,
}

impl JsonPolicyDecoder {
    pub const CLASS_NAME: &'static str = "policy_distribution::plugins::file::JsonPolicyDecoder";

    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyDecoder for JsonPolicyDecoder {
    fn configure(&mut self, configuration: Option<&ConfigurationParameters>) -> DistributionResult<()> {
        let Some(configuration) = configuration else {
            return Ok(());
        };
        let parameters = configuration
            .parameters::<JsonPolicyDecoderParameterGroup>()
            .ok_or_else(|| {
                DistributionError::PluginInitialization(format!(
                    "configuration \"{}\" is not a JSON policy decoder configuration",
                    configuration.class_name()
                ))
            })?;
        self.parameters = parameters.clone();
        Ok(())
    }

    fn can_handle(&self, input: &PolicyInput) -> bool {
        input.name().ends_with(&self.parameters.file_suffix)
    }

    async fn decode(&self, input: &PolicyInput) -> DistributionResult<Vec<Policy>> {
        let contents = input.contents().await?;
        let document: PolicyDocument = serde_json::from_slice(&contents).map_err(|err| {
            DistributionError::Decoding(format!(
                "failed to decode policies from \"{}\": {}",
                input.name(),
                err
            ))
        })?;

        let policies = match document {
            PolicyDocument::Wrapped { policies } | PolicyDocument::Many(policies) => policies,
            PolicyDocument::Single(policy) => vec![policy],
        };

        let wanted = &self.parameters.policy_types;
        let (kept, skipped): (Vec<Policy>, Vec<Policy>) = policies
            .into_iter()
            .partition(|policy| wanted.is_empty() || wanted.contains(&policy.policy_type));
        if !skipped.is_empty() {
            debug!(input = %input.name(), skipped = skipped.len(), "policies of unwanted types skipped");
        }
        Ok(kept)
    }
}
