// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for policy-distribution
//!
//! Dummy plugins, a registry that knows them, and a scripted distribution
//! client. Configuration documents live under `tests/resources/parameters`.
//!
//! # Design Principles
//! - Dummy plugins do nothing except record what happened to them
//! - The stub client never touches the network; failures are scripted
//! - Tests build registries through [`test_registry`], never by hand

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;

use policy_distribution::parameters::validation::{GroupValidationResult, ValidationStatus};
use policy_distribution::parameters::{ConfigurationParameters, PluginConfiguration};
use policy_distribution::plugins::sdc::{
    ArtifactInfo, ClientError, DistributionClient, DistributionStatus, DistributionStatusMessage,
    FinalDistributionStatusMessage, NotificationCallback, NotificationData, ResourceInstance,
    SdcConfiguration,
};
use policy_distribution::plugins::{
    Policy, PolicyDecoder, PolicyForwarder, PolicyInput, ReceptionContext, ReceptionHandler,
};
use policy_distribution::{DistributionError, DistributionResult, PluginRegistry};

pub const DUMMY_RECEPTION_HANDLER: &str = "tests::DummyReceptionHandler";
pub const FAILING_RECEPTION_HANDLER: &str = "tests::FailingReceptionHandler";
pub const DUMMY_DECODER: &str = "tests::DummyDecoder";
pub const DUMMY_FORWARDER: &str = "tests::DummyForwarder";
pub const DUMMY_CONFIGURATION: &str = "tests::DummyConfiguration";

/// Path of a configuration document under `tests/resources/parameters`
pub fn parameters_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/parameters")
        .join(name)
}

// ============================================================================
// Dummy plugins
// ============================================================================

/// What happened to the dummy reception handlers of a registry
#[derive(Debug, Default)]
pub struct HandlerRecorder {
    pub initialized: Mutex<Vec<(String, Option<String>)>>,
    pub destroyed: AtomicUsize,
}

impl HandlerRecorder {
    pub fn initialized_names(&self) -> Vec<String> {
        self.initialized.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

pub struct DummyReceptionHandler {
    recorder: Arc<HandlerRecorder>,
    fail: bool,
}

#[async_trait]
impl ReceptionHandler for DummyReceptionHandler {
    async fn initialize(&mut self, context: ReceptionContext) -> DistributionResult<()> {
        if self.fail {
            return Err(DistributionError::PluginInitialization(format!(
                "{} refused to start",
                context.name
            )));
        }
        let configuration = context
            .configuration
            .as_ref()
            .map(|configuration| configuration.class_name().to_string());
        self.recorder.initialized.lock().push((context.name, configuration));
        Ok(())
    }

    async fn destroy(&mut self) -> DistributionResult<()> {
        self.recorder.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct DummyDecoder;

#[async_trait]
impl PolicyDecoder for DummyDecoder {
    fn configure(&mut self, _: Option<&ConfigurationParameters>) -> DistributionResult<()> {
        Ok(())
    }

    fn can_handle(&self, _: &PolicyInput) -> bool {
        true
    }

    async fn decode(&self, input: &PolicyInput) -> DistributionResult<Vec<Policy>> {
        Ok(vec![Policy::new(input.name(), "onap.policies.Dummy")])
    }
}

pub struct DummyForwarder;

#[async_trait]
impl PolicyForwarder for DummyForwarder {
    fn configure(&mut self, _: Option<&ConfigurationParameters>) -> DistributionResult<()> {
        Ok(())
    }

    async fn forward(&self, _: &[Policy]) -> DistributionResult<()> {
        Ok(())
    }
}

/// Configuration accepted for every dummy plugin
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DummyConfiguration {
    pub my_string_parameter: Option<String>,
    #[serde(default)]
    pub my_integer_parameter: i64,
    #[serde(default)]
    pub my_boolean_parameter: bool,
}

impl PluginConfiguration for DummyConfiguration {
    fn validate(&self, name: &str) -> GroupValidationResult {
        let mut result = GroupValidationResult::new(name, "DummyConfiguration");
        result.validate_non_blank("myStringParameter", self.my_string_parameter.as_deref());
        if self.my_integer_parameter < 0 {
            result.set_field_result(
                "myIntegerParameter",
                "int",
                self.my_integer_parameter.to_string(),
                ValidationStatus::Invalid,
                "must be >= 0",
            );
        }
        result
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Built-in plugins plus the dummy ones, reporting to `recorder`
pub fn test_registry_with_recorder(recorder: Arc<HandlerRecorder>) -> PluginRegistry {
    let failing_recorder = recorder.clone();
    let mut registry = PluginRegistry::with_builtin_plugins();
    registry
        .register_reception_handler(DUMMY_RECEPTION_HANDLER, move || {
            Box::new(DummyReceptionHandler {
                recorder: recorder.clone(),
                fail: false,
            })
        })
        .register_reception_handler(FAILING_RECEPTION_HANDLER, move || {
            Box::new(DummyReceptionHandler {
                recorder: failing_recorder.clone(),
                fail: true,
            })
        })
        .register_policy_decoder(DUMMY_DECODER, || Box::new(DummyDecoder))
        .register_policy_forwarder(DUMMY_FORWARDER, || Box::new(DummyForwarder))
        .register_configuration::<DummyConfiguration>(DUMMY_CONFIGURATION);
    registry
}

pub fn test_registry() -> PluginRegistry {
    test_registry_with_recorder(Arc::new(HandlerRecorder::default()))
}

// ============================================================================
// Distribution client stub
// ============================================================================

/// Scripted distribution client
///
/// `init` fails `init_failures` times before succeeding. Downloads succeed
/// for artifacts registered with [`StubDistributionClient::with_artifact`].
#[derive(Default)]
pub struct StubDistributionClient {
    pub init_failures: AtomicUsize,
    pub init_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub consumer_instances: Mutex<Vec<String>>,
    callback: Mutex<Option<Arc<dyn NotificationCallback>>>,
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
    pub download_statuses: Mutex<Vec<(DistributionStatus, Option<String>)>>,
    pub deployment_statuses: Mutex<Vec<(DistributionStatus, Option<String>)>>,
    pub final_statuses: Mutex<Vec<(FinalDistributionStatusMessage, Option<String>)>>,
    during_start: Mutex<Option<NotificationData>>,
    during_stop: Mutex<Option<NotificationData>>,
}

impl StubDistributionClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_init(times: usize) -> Arc<Self> {
        let client = Self::default();
        client.init_failures.store(times, Ordering::SeqCst);
        Arc::new(client)
    }

    pub fn with_artifact(&self, name: &str, payload: &str) {
        self.artifacts
            .lock()
            .insert(name.to_string(), payload.as_bytes().to_vec());
    }

    /// Deliver a notification the way the client library would
    pub async fn notify(&self, notification: NotificationData) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback.activate_callback(notification).await;
        }
    }

    /// Deliver `notification` from inside the next `start()`
    pub fn notify_during_start(&self, notification: NotificationData) {
        *self.during_start.lock() = Some(notification);
    }

    /// Deliver `notification` from inside the next `stop()`
    pub fn notify_during_stop(&self, notification: NotificationData) {
        *self.during_stop.lock() = Some(notification);
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().is_some()
    }
}

#[async_trait]
impl DistributionClient for StubDistributionClient {
    async fn init(
        &self,
        configuration: &SdcConfiguration,
        callback: Arc<dyn NotificationCallback>,
    ) -> Result<(), ClientError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.init_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.init_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ClientError::new("catalog unreachable"));
        }
        self.consumer_instances
            .lock()
            .push(configuration.instance_name().to_string());
        *self.callback.lock() = Some(callback);
        Ok(())
    }

    async fn start(&self) -> Result<(), ClientError> {
        let early = self.during_start.lock().take();
        if let Some(notification) = early {
            self.notify(notification).await;
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), ClientError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let late = self.during_stop.lock().take();
        if let Some(notification) = late {
            self.notify(notification).await;
        }
        *self.callback.lock() = None;
        Ok(())
    }

    async fn download(&self, artifact: &ArtifactInfo) -> Result<Vec<u8>, ClientError> {
        self.artifacts
            .lock()
            .get(&artifact.artifact_name)
            .cloned()
            .ok_or_else(|| ClientError::new("artifact not found"))
    }

    async fn send_download_status(
        &self,
        message: &DistributionStatusMessage,
        error_reason: Option<&str>,
    ) -> Result<(), ClientError> {
        self.download_statuses
            .lock()
            .push((message.status, error_reason.map(str::to_string)));
        Ok(())
    }

    async fn send_deployment_status(
        &self,
        message: &DistributionStatusMessage,
        error_reason: Option<&str>,
    ) -> Result<(), ClientError> {
        self.deployment_statuses
            .lock()
            .push((message.status, error_reason.map(str::to_string)));
        Ok(())
    }

    async fn send_final_distribution_status(
        &self,
        message: &FinalDistributionStatusMessage,
        error_reason: Option<&str>,
    ) -> Result<(), ClientError> {
        self.final_statuses
            .lock()
            .push((message.clone(), error_reason.map(str::to_string)));
        Ok(())
    }
}

// ============================================================================
// Notifications
// ============================================================================

pub fn artifact(name: &str, artifact_type: &str) -> ArtifactInfo {
    ArtifactInfo {
        artifact_name: name.to_string(),
        artifact_type: artifact_type.to_string(),
        artifact_url: format!("/sdc/v1/catalog/services/vfw/artifacts/{}", name),
        artifact_version: Some("1.0".to_string()),
    }
}

/// Notification with one VF resource carrying the given artifacts
pub fn notification(distribution_id: &str, artifacts: Vec<ArtifactInfo>) -> NotificationData {
    NotificationData {
        distribution_id: distribution_id.to_string(),
        service_name: "vfw".to_string(),
        service_artifacts: Vec::new(),
        resources: vec![ResourceInstance {
            resource_name: "vfw-vf".to_string(),
            resource_type: "VF".to_string(),
            artifacts,
        }],
    }
}
