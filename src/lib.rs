//! Plugin-driven policy distribution
//!
//! Receives policy artifacts from a distribution service or the filesystem,
//! decodes them with pluggable decoders and forwards the resulting policies
//! with pluggable forwarders. Which plugins run, and how they are
//! configured, is declared in a JSON configuration document that is
//! resolved and validated at startup.
//!
//! ```text
//! config.json ─▶ load_parameters ─▶ DistributionParameterGroup ─▶ DistributionActivator
//!                      │                                                │
//!                PluginRegistry ◀───────── class names ─────────────────┘
//! ```

pub mod activator;
pub mod errors;
pub mod parameters;
pub mod plugins;
pub mod registry;
pub mod state_machine;

// Re-export commonly used types
pub use activator::DistributionActivator;
pub use errors::{DistributionError, DistributionResult};
pub use parameters::{load_parameters, parse_parameters, DistributionParameterGroup, ParameterGroup};
pub use plugins::{Policy, PolicyDecoder, PolicyForwarder, PolicyInput, ReceptionHandler};
pub use registry::PluginRegistry;
