// Copyright (c) 2025 - Cowboy AI, Inc.
//! Filesystem plugins
//!
//! - [`FileSystemReceptionHandler`]: watches a directory for new files
//! - [`JsonPolicyDecoder`]: decodes policies from JSON documents
//! - [`FilePolicyForwarder`]: writes policies to a directory

pub mod forwarder;
pub mod json_decoder;
pub mod reception_handler;

pub use forwarder::{FilePolicyForwarder, FilePolicyForwarderParameterGroup};
pub use json_decoder::{JsonPolicyDecoder, JsonPolicyDecoderParameterGroup};
pub use reception_handler::{
    FileSystemReceptionHandler, FileSystemReceptionHandlerConfigurationParameterGroup,
};
