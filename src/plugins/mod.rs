// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reception, Decoding and Forwarding Plugins
//!
//! A reception handler receives raw input from an external source and hands
//! it to its [`ReceptionPipeline`]. The pipeline selects the decoders able to
//! handle the input, decodes it into [`Policy`] values and pushes those to
//! every forwarder.
//!
//! ```text
//! source ──▶ ReceptionHandler ──▶ PolicyDecoder* ──▶ Vec<Policy> ──▶ PolicyForwarder*
//! ```
//!
//! Plugins are instantiated by class name through the
//! [`PluginRegistry`](crate::registry::PluginRegistry) and configured from
//! the named configuration envelopes of the distribution parameters.

pub mod file;
pub mod pipeline;
pub mod sdc;
pub mod statistics;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DistributionResult;
use crate::parameters::ConfigurationParameters;

pub use pipeline::{PluginHandler, ReceptionPipeline};
pub use statistics::{DistributionStatistics, StatisticsReport};

/// Raw input handed to the decoders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyInput {
    /// A file on the local filesystem
    File(PathBuf),

    /// An artifact downloaded from a distribution service
    Artifact { name: String, payload: Vec<u8> },
}

impl PolicyInput {
    /// File name or artifact name
    pub fn name(&self) -> String {
        match self {
            PolicyInput::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            PolicyInput::Artifact { name, .. } => name.clone(),
        }
    }

    /// Read the input bytes
    pub async fn contents(&self) -> DistributionResult<Vec<u8>> {
        match self {
            PolicyInput::File(path) => Ok(tokio::fs::read(path).await?),
            PolicyInput::Artifact { payload, .. } => Ok(payload.clone()),
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// A decoded policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Policy {
    pub fn new(name: impl Into<String>, policy_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            policy_type: policy_type.into(),
            type_version: None,
            properties: Map::new(),
        }
    }
}

/// Turns raw input into policies
#[async_trait]
pub trait PolicyDecoder: Send + Sync {
    /// Apply the decoder's configuration envelope, if one is named
    fn configure(&mut self, configuration: Option<&ConfigurationParameters>) -> DistributionResult<()>;

    /// Can this decoder handle the input?
    fn can_handle(&self, input: &PolicyInput) -> bool;

    /// Decode the input
    async fn decode(&self, input: &PolicyInput) -> DistributionResult<Vec<Policy>>;
}

/// Pushes policies to a downstream policy engine
///
/// A forwarder that fails on some policies keeps going and reports all of
/// them in one error.
#[async_trait]
pub trait PolicyForwarder: Send + Sync {
    /// Apply the forwarder's configuration envelope, if one is named
    fn configure(&mut self, configuration: Option<&ConfigurationParameters>) -> DistributionResult<()>;

    /// Forward the policies
    async fn forward(&self, policies: &[Policy]) -> DistributionResult<()>;
}

/// Everything a reception handler needs to start receiving
#[derive(Clone)]
pub struct ReceptionContext {
    /// Reception handler group name, `<distribution name>_<type>`
    pub name: String,

    /// Decoders and forwarders of this handler
    pub pipeline: Arc<ReceptionPipeline>,

    /// The handler's configuration envelope, if one is named
    pub configuration: Option<Arc<ConfigurationParameters>>,

    /// Service-wide distribution counters
    pub statistics: Arc<DistributionStatistics>,
}

/// Receives raw input from an external source
#[async_trait]
pub trait ReceptionHandler: Send + Sync {
    /// Start receiving
    async fn initialize(&mut self, context: ReceptionContext) -> DistributionResult<()>;

    /// Stop receiving and release resources
    async fn destroy(&mut self) -> DistributionResult<()>;
}
