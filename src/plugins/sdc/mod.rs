// Copyright (c) 2025 - Cowboy AI, Inc.
//! SDC distribution plugins
//!
//! The reception handler talks to an SDC distribution service through a
//! [`DistributionClient`]. No client implementation ships with this crate;
//! one is supplied through a [`DistributionClientFactory`] when the handler
//! is registered.

pub mod client;
pub mod configuration;
pub mod controller;
pub mod notification;
pub mod reception_handler;

pub use client::{
    ArtifactInfo, ClientError, DistributionClient, DistributionClientFactory, DistributionStatus,
    DistributionStatusMessage, FinalDistributionStatusMessage, NotificationCallback, NotificationData,
    ResourceInstance,
};
pub use configuration::{SdcConfiguration, SdcReceptionHandlerConfigurationParameterGroup};
pub use controller::{DistributionController, NotificationGuard};
pub use notification::SdcNotificationProcessor;
pub use reception_handler::SdcReceptionHandler;
