// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution Parameters
//!
//! The configuration tree read at startup, validated once and then treated
//! as read-only for the rest of the process:
//!
//! ```text
//! DistributionParameterGroup
//!   ├── receptionHandlerParameters: { key → ReceptionHandlerParameters }
//!   │     └── pluginHandlerParameters: PluginHandlerParameters
//!   │           ├── policyDecoders:   { key → PolicyDecoderParameters }
//!   │           └── policyForwarders: { key → PolicyForwarderParameters }
//!   ├── receptionHandlerConfigurationParameters: { key → envelope }
//!   ├── policyDecoderConfigurationParameters:    { key → envelope }
//!   └── policyForwarderConfigurationParameters:  { key → envelope }
//! ```
//!
//! Every node implements [`ParameterGroup`]. Validation is pure: it never
//! mutates the parameters or any shared state, so it can be repeated and
//! always yields the same [`GroupValidationResult`].
//!
//! Class names are resolved against an explicit [`PluginRegistry`] handed in
//! by the caller.

pub mod decoder;
pub mod distribution;
pub mod envelope;
pub mod forwarder;
pub mod loader;
pub mod plugin_handler;
pub mod reception_handler;
pub mod validation;

pub use decoder::PolicyDecoderParameters;
pub use distribution::DistributionParameterGroup;
pub use envelope::{ConfigurationParameters, PluginConfiguration};
pub use forwarder::PolicyForwarderParameters;
pub use loader::{load_parameters, parse_parameters};
pub use plugin_handler::PluginHandlerParameters;
pub use reception_handler::ReceptionHandlerParameters;
pub use validation::{GroupValidationResult, ValidationStatus};

use crate::registry::PluginRegistry;
use validation::STRING_TYPE;

/// A named configuration node that can validate itself
pub trait ParameterGroup {
    /// Group name, used as the name of its validation result
    fn name(&self) -> &str;

    /// Validate the group and everything nested in it
    fn validate(&self, registry: &PluginRegistry) -> GroupValidationResult;
}

/// Non-blank class name rule plus registry resolution
///
/// A blank name is reported as blank; a non-blank name the registry does not
/// know is reported as `<role> class not found in classpath`.
pub(crate) fn validate_class_name(
    result: &mut GroupValidationResult,
    field: &str,
    class_name: Option<&str>,
    role: &str,
    is_registered: impl Fn(&str) -> bool,
) {
    match class_name {
        Some(name) if !name.trim().is_empty() => {
            if !is_registered(name) {
                result.set_field_result(
                    field,
                    STRING_TYPE,
                    name,
                    ValidationStatus::Invalid,
                    format!("{} class not found in classpath", role),
                );
            }
        }
        other => result.validate_non_blank(field, other),
    }
}
