// Copyright (c) 2025 - Cowboy AI, Inc.
//! File policy forwarder
//!
//! Writes each policy to `<path>/<policy name>`. Useful for testing a
//! distribution setup without a downstream policy engine.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::{DistributionError, DistributionResult};
use crate::parameters::validation::GroupValidationResult;
use crate::parameters::{ConfigurationParameters, PluginConfiguration};
use crate::plugins::{Policy, PolicyForwarder};

/// Configuration of [`FilePolicyForwarder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePolicyForwarderParameterGroup {
    path: Option<String>,
    #[serde(default)]
    verbose: bool,
}

impl FilePolicyForwarderParameterGroup {
    pub const CLASS_NAME: &'static str =
        "policy_distribution::plugins::file::FilePolicyForwarderParameterGroup";

    pub fn new(path: impl Into<String>, verbose: bool) -> Self {
        Self {
            path: Some(path.into()),
            verbose,
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl PluginConfiguration for FilePolicyForwarderParameterGroup {
    fn validate(&self, name: &str) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(name, "FilePolicyForwarderParameterGroup");
        result.validate_non_blank("path", self.path());
        result
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Writes policies to files
#[derive(Debug, Default)]
pub struct FilePolicyForwarder {
    path: PathBuf,
    verbose: bool,
}

impl FilePolicyForwarder {
    pub const CLASS_NAME: &'static str = "policy_distribution::plugins::file::FilePolicyForwarder";

    pub fn new() -> Self {
        Self::default()
    }

    async fn write_policy(&self, policy: &Policy) -> DistributionResult<()> {
        let file_name = Path::new(&policy.name);
        if policy.name.is_empty() || file_name.components().count() != 1 || file_name.is_absolute() {
            return Err(DistributionError::Forwarding(format!(
                "policy name \"{}\" is not a valid file name",
                policy.name
            )));
        }

        let mut contents = format!("policyName: {}\n", policy.name);
        if self.verbose {
            let json = serde_json::to_string(policy).map_err(|err| {
                DistributionError::Forwarding(format!("failed to serialize policy \"{}\": {}", policy.name, err))
            })?;
            contents.push_str(&format!("policy: {}\n", json));
        }
        tokio::fs::write(self.path.join(file_name), contents).await?;
        Ok(())
    }
}

#[async_trait]
impl PolicyForwarder for FilePolicyForwarder {
    fn configure(&mut self, configuration: Option<&ConfigurationParameters>) -> DistributionResult<()> {
        let configuration = configuration.ok_or_else(|| {
            DistributionError::PluginInitialization(
                "file policy forwarder requires a configuration".to_string(),
            )
        })?;
        let parameters = configuration
            .parameters::<FilePolicyForwarderParameterGroup>()
            .ok_or_else(|| {
                DistributionError::PluginInitialization(format!(
                    "configuration \"{}\" is not a file policy forwarder configuration",
                    configuration.class_name()
                ))
            })?;

        self.path = PathBuf::from(parameters.path().unwrap_or_default());
        self.verbose = parameters.is_verbose();
        std::fs::create_dir_all(&self.path).map_err(|err| {
            DistributionError::PluginInitialization(format!(
                "failed to create forwarding directory \"{}\": {}",
                self.path.display(),
                err
            ))
        })?;
        Ok(())
    }

    async fn forward(&self, policies: &[Policy]) -> DistributionResult<()> {
        let mut failed = Vec::new();
        for policy in policies {
            match self.write_policy(policy).await {
                Ok(()) => debug!(policy = %policy.name, path = %self.path.display(), "policy written"),
                Err(err) => {
                    error!(policy = %policy.name, "failed to write policy: {}", err);
                    failed.push(policy.name.clone());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DistributionError::Forwarding(format!(
                "Failed forwarding the following entities: [{}]",
                failed.join(", ")
            )))
        }
    }
}
