// Copyright (c) 2025 - Cowboy AI, Inc.
//! SDC reception handler configuration

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::parameters::validation::{GroupValidationResult, ValidationStatus, INT_TYPE, LIST_TYPE, STRING_TYPE};
use crate::parameters::PluginConfiguration;

/// Configuration of [`SdcReceptionHandler`](super::SdcReceptionHandler)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdcReceptionHandlerConfigurationParameterGroup {
    pub asdc_address: Option<String>,
    pub message_bus_address: Option<Vec<String>>,
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub polling_interval: i64,
    #[serde(default)]
    pub polling_timeout: i64,
    #[serde(default)]
    pub retry_delay: i64,
    pub consumer_id: Option<String>,
    pub artifact_types: Option<Vec<String>>,
    pub consumer_group: Option<String>,
    pub environment_name: Option<String>,
    pub key_store_path: Option<String>,
    pub key_store_password: Option<String>,
    #[serde(default)]
    pub active_server_tls_auth: bool,
    #[serde(default)]
    pub is_filter_in_empty_resources: bool,
    #[serde(default)]
    pub is_use_https_with_dmaap: bool,
}

impl SdcReceptionHandlerConfigurationParameterGroup {
    pub const CLASS_NAME: &'static str =
        "policy_distribution::plugins::sdc::SdcReceptionHandlerConfigurationParameterGroup";

    /// Artifact types to download; empty when none are configured
    pub fn artifact_types(&self) -> &[String] {
        self.artifact_types.as_deref().unwrap_or_default()
    }
}

fn validate_positive(result: &mut GroupValidationResult, field: &str, value: i64) {
    if value <= 0 {
        result.set_field_result(
            field,
            INT_TYPE,
            value.to_string(),
            ValidationStatus::Invalid,
            "must be a positive integer",
        );
    }
}

fn validate_list(result: &mut GroupValidationResult, field: &str, values: Option<&[String]>) {
    let Some(values) = values else {
        result.set_field_result(field, LIST_TYPE, "null", ValidationStatus::Invalid, "is null");
        return;
    };
    for (index, value) in values.iter().enumerate() {
        if value.trim().is_empty() {
            result.set_field_result(
                format!("{}[{}]", field, index),
                STRING_TYPE,
                value.as_str(),
                ValidationStatus::Invalid,
                "must be a non-blank string",
            );
        }
    }
}

impl PluginConfiguration for SdcReceptionHandlerConfigurationParameterGroup {
    fn validate(&self, name: &str) -> GroupValidationResult {
        let mut result =
            GroupValidationResult::new(name, "SdcReceptionHandlerConfigurationParameterGroup");

        result.validate_non_blank("asdcAddress", self.asdc_address.as_deref());
        result.validate_non_blank("user", self.user.as_deref());
        result.validate_non_blank("password", self.password.as_deref());
        result.validate_non_blank("consumerId", self.consumer_id.as_deref());
        result.validate_non_blank("consumerGroup", self.consumer_group.as_deref());
        result.validate_non_blank("environmentName", self.environment_name.as_deref());
        if self.active_server_tls_auth {
            result.validate_non_blank("keyStorePath", self.key_store_path.as_deref());
            result.validate_non_blank("keyStorePassword", self.key_store_password.as_deref());
        }

        validate_positive(&mut result, "pollingInterval", self.polling_interval);
        validate_positive(&mut result, "pollingTimeout", self.polling_timeout);

        validate_list(&mut result, "messageBusAddress", self.message_bus_address.as_deref());
        validate_list(&mut result, "artifactTypes", self.artifact_types.as_deref());
        result
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Client-facing view of an SDC configuration
///
/// Each wrapper carries its own consumer instance name,
/// `<handler name>_<uuid>`, fixed when it is created.
#[derive(Debug, Clone)]
pub struct SdcConfiguration {
    instance_name: String,
    parameters: SdcReceptionHandlerConfigurationParameterGroup,
}

impl SdcConfiguration {
    pub fn new(name: &str, parameters: SdcReceptionHandlerConfigurationParameterGroup) -> Self {
        Self {
            instance_name: format!("{}_{}", name, Uuid::now_v7()),
            parameters,
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn asdc_address(&self) -> &str {
        self.parameters.asdc_address.as_deref().unwrap_or_default()
    }

    pub fn msg_bus_address(&self) -> &[String] {
        self.parameters.message_bus_address.as_deref().unwrap_or_default()
    }

    pub fn user(&self) -> &str {
        self.parameters.user.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.parameters.password.as_deref().unwrap_or_default()
    }

    pub fn polling_interval(&self) -> i64 {
        self.parameters.polling_interval
    }

    pub fn polling_timeout(&self) -> i64 {
        self.parameters.polling_timeout
    }

    pub fn relevant_artifact_types(&self) -> &[String] {
        self.parameters.artifact_types()
    }

    pub fn consumer_group(&self) -> &str {
        self.parameters.consumer_group.as_deref().unwrap_or_default()
    }

    pub fn environment_name(&self) -> &str {
        self.parameters.environment_name.as_deref().unwrap_or_default()
    }

    pub fn consumer_id(&self) -> &str {
        self.parameters.consumer_id.as_deref().unwrap_or_default()
    }

    pub fn key_store_path(&self) -> Option<&str> {
        self.parameters.key_store_path.as_deref()
    }

    pub fn key_store_password(&self) -> Option<&str> {
        self.parameters.key_store_password.as_deref()
    }

    pub fn activate_server_tls_auth(&self) -> bool {
        self.parameters.active_server_tls_auth
    }

    pub fn is_filter_in_empty_resources(&self) -> bool {
        self.parameters.is_filter_in_empty_resources
    }

    pub fn is_use_https_with_dmaap(&self) -> bool {
        self.parameters.is_use_https_with_dmaap
    }
}
