// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution Configuration Loader
//!
//! Reads the configuration file in two phases:
//!
//! 1. `serde_json` parses the file into a raw model where every field is
//!    optional, so missing values surface as validation results rather than
//!    parse errors. Configuration envelopes stay as raw JSON.
//! 2. The raw model is turned into the parameter tree: derived names are
//!    assigned and envelopes are resolved against the [`PluginRegistry`].
//!
//! The tree is then validated. Any failure is fatal: the service must not
//! start with an invalid configuration, so nothing here retries.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::distribution::ConfigurationMap;
use super::{
    ConfigurationParameters, DistributionParameterGroup, ParameterGroup, PluginHandlerParameters,
    PolicyDecoderParameters, PolicyForwarderParameters, ReceptionHandlerParameters,
};
use crate::errors::{DistributionError, DistributionResult};
use crate::registry::PluginRegistry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDistributionParameters {
    name: Option<String>,
    reception_handler_parameters: Option<BTreeMap<String, RawReceptionHandlerParameters>>,
    #[serde(default)]
    reception_handler_configuration_parameters: BTreeMap<String, Value>,
    #[serde(default)]
    policy_decoder_configuration_parameters: BTreeMap<String, Value>,
    #[serde(default)]
    policy_forwarder_configuration_parameters: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceptionHandlerParameters {
    reception_handler_type: Option<String>,
    reception_handler_class_name: Option<String>,
    reception_handler_configuration_name: Option<String>,
    plugin_handler_parameters: Option<RawPluginHandlerParameters>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPluginHandlerParameters {
    policy_decoders: Option<BTreeMap<String, PolicyDecoderParameters>>,
    policy_forwarders: Option<BTreeMap<String, PolicyForwarderParameters>>,
}

impl RawDistributionParameters {
    fn into_group(self, registry: &PluginRegistry) -> DistributionResult<DistributionParameterGroup> {
        let root_name = self.name.clone().unwrap_or_else(|| "null".to_string());

        let reception_handlers = self.reception_handler_parameters.map(|handlers| {
            handlers
                .into_iter()
                .map(|(key, raw)| (key, raw.into_parameters(&root_name)))
                .collect()
        });

        Ok(DistributionParameterGroup::new(self.name, reception_handlers)
            .with_reception_handler_configurations(resolve_envelopes(
                self.reception_handler_configuration_parameters,
                registry,
            )?)
            .with_policy_decoder_configurations(resolve_envelopes(
                self.policy_decoder_configuration_parameters,
                registry,
            )?)
            .with_policy_forwarder_configurations(resolve_envelopes(
                self.policy_forwarder_configuration_parameters,
                registry,
            )?))
    }
}

impl RawReceptionHandlerParameters {
    fn into_parameters(self, root_name: &str) -> ReceptionHandlerParameters {
        let handler_name =
            ReceptionHandlerParameters::derive_name(root_name, self.reception_handler_type.as_deref());
        let plugin_handler = self.plugin_handler_parameters.map(|raw| {
            PluginHandlerParameters::new(
                format!("{}_PluginHandler", handler_name),
                raw.policy_decoders,
                raw.policy_forwarders,
            )
        });

        ReceptionHandlerParameters::new(
            root_name,
            self.reception_handler_type,
            self.reception_handler_class_name,
            self.reception_handler_configuration_name,
            plugin_handler,
        )
    }
}

fn resolve_envelopes(
    envelopes: BTreeMap<String, Value>,
    registry: &PluginRegistry,
) -> DistributionResult<ConfigurationMap> {
    envelopes
        .into_iter()
        .map(|(key, envelope)| {
            let configuration = ConfigurationParameters::from_envelope(key.clone(), &envelope, registry)?;
            Ok((key, Arc::new(configuration)))
        })
        .collect()
}

/// Read, resolve and validate the configuration file at `path`
pub fn load_parameters(
    path: impl AsRef<Path>,
    registry: &PluginRegistry,
) -> DistributionResult<DistributionParameterGroup> {
    let path = path.as_ref();
    let label = path.display().to_string();

    let contents = std::fs::read_to_string(path).map_err(|err| {
        let message = format!(
            "error reading parameters from \"{}\"\n({:?}):{}",
            label,
            err.kind(),
            err
        );
        tracing::error!("{}", message);
        DistributionError::Parameters(message)
    })?;

    parse_parameters(&contents, &label, registry)
}

/// Resolve and validate configuration text; `label` names its source in messages
pub fn parse_parameters(
    contents: &str,
    label: &str,
    registry: &PluginRegistry,
) -> DistributionResult<DistributionParameterGroup> {
    let no_parameters = || {
        let message = format!("no parameters found in \"{}\"", label);
        tracing::error!("{}", message);
        DistributionError::Parameters(message)
    };

    if contents.trim().is_empty() {
        return Err(no_parameters());
    }

    let raw: Option<RawDistributionParameters> = serde_json::from_str(contents).map_err(|err| {
        let message = format!(
            "error reading parameters from \"{}\"\n({:?}):{}",
            label,
            err.classify(),
            err
        );
        tracing::error!("{}", message);
        DistributionError::Parameters(message)
    })?;
    let raw = raw.ok_or_else(no_parameters)?;

    let group = raw.into_group(registry).map_err(|err| {
        let message = format!(
            "error reading parameters from \"{}\"\n(ConfigurationClass):{}",
            label, err
        );
        tracing::error!("{}", message);
        DistributionError::Parameters(message)
    })?;

    let result = group.validate(registry);
    if !result.is_valid() {
        let message = format!(
            "validation error(s) on parameters from \"{}\"\n{}",
            label,
            result.result().unwrap_or_default()
        );
        tracing::error!("{}", message);
        return Err(DistributionError::Parameters(message));
    }

    tracing::debug!(name = group.name(), "distribution parameters loaded");
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::file::{FilePolicyForwarder, FileSystemReceptionHandler, JsonPolicyDecoder};
    use serde_json::json;

    fn config(reception: Value) -> String {
        json!({
            "name": "SDCDistributionGroup",
            "receptionHandlerParameters": { "FileHandler": reception }
        })
        .to_string()
    }

    fn valid_reception() -> Value {
        json!({
            "receptionHandlerType": "FileSystem",
            "receptionHandlerClassName": FileSystemReceptionHandler::CLASS_NAME,
            "pluginHandlerParameters": {
                "policyDecoders": {
                    "JsonDecoder": {
                        "decoderType": "JsonDecoder",
                        "decoderClassName": JsonPolicyDecoder::CLASS_NAME
                    }
                },
                "policyForwarders": {
                    "FileForwarder": {
                        "forwarderType": "FileForwarder",
                        "forwarderClassName": FilePolicyForwarder::CLASS_NAME
                    }
                }
            }
        })
    }

    #[test]
    fn test_names_are_derived_once() {
        let registry = PluginRegistry::with_builtin_plugins();
        let group = parse_parameters(&config(valid_reception()), "inline", &registry).unwrap();

        let handler = &group.reception_handler_parameters().unwrap()["FileHandler"];
        assert_eq!(handler.name(), "SDCDistributionGroup_FileSystem");
        assert_eq!(
            handler.plugin_handler_parameters().unwrap().name(),
            "SDCDistributionGroup_FileSystem_PluginHandler"
        );
    }

    #[test]
    fn test_plugin_handler_name_follows_missing_type() {
        let registry = PluginRegistry::with_builtin_plugins();
        let mut reception = valid_reception();
        reception.as_object_mut().unwrap().remove("receptionHandlerType");
        let group = parse_parameters(&config(reception), "inline", &registry).unwrap();

        let handler = &group.reception_handler_parameters().unwrap()["FileHandler"];
        assert_eq!(handler.name(), "SDCDistributionGroup_null");
        assert_eq!(
            handler.plugin_handler_parameters().unwrap().name(),
            format!("{}_PluginHandler", handler.name())
        );
    }

    #[test]
    fn test_null_document() {
        let registry = PluginRegistry::with_builtin_plugins();
        let err = parse_parameters("null", "empty.json", &registry).unwrap_err();
        assert_eq!(err.to_string(), "no parameters found in \"empty.json\"");
    }

    #[test]
    fn test_syntax_error_carries_location() {
        let registry = PluginRegistry::with_builtin_plugins();
        let err = parse_parameters("{\n  \"name\": ,\n}", "bad.json", &registry).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("error reading parameters from \"bad.json\"\n(Syntax):"));
        assert!(text.contains("line 2 column"));
    }

    #[test]
    fn test_missing_file() {
        let registry = PluginRegistry::with_builtin_plugins();
        let err = load_parameters("/nonexistent/distribution.json", &registry).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("error reading parameters from \"/nonexistent/distribution.json\""));
        assert!(text.contains("(NotFound)"));
    }
}
