// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution Controller
//!
//! Wraps a [`DistributionClient`] and tracks its lifecycle with the
//! [`ControllerState`] machine.
//!
//! ```text
//!            init                start ok              notification entered
//!  STOPPED ─────────▶ STARTING ─────────▶ IDLE ──────────────────────▶ BUSY
//!     ▲ ▲    start failed │                │ ▲ ◀──────────────────────
//!     │ └─────────────────┘          close │ │ stop failed   last notification left
//!     │                                    ▼ │
//!     └──────────── stop ok ──────────── CLOSING
//! ```
//!
//! Status and notification counter are updated under one lock, so every
//! transition is atomic. Lifecycle operations (`init`, `close`) are
//! serialized by a second, async lock because they await the client.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::client::{DistributionClient, DistributionClientFactory, NotificationCallback};
use super::configuration::{SdcConfiguration, SdcReceptionHandlerConfigurationParameterGroup};
use crate::errors::{DistributionError, DistributionResult};
use crate::state_machine::{
    ControllerCommand, ControllerState, ControllerStatus, StateInvariant, StateMachine,
};

struct ControllerInner {
    name: String,
    parameters: SdcReceptionHandlerConfigurationParameterGroup,
    client_factory: Arc<dyn DistributionClientFactory>,
    state: Mutex<ControllerState>,
    client: Mutex<Option<Arc<dyn DistributionClient>>>,
    configuration: tokio::sync::Mutex<Option<SdcConfiguration>>,
}

/// Lifecycle controller of one distribution client
#[derive(Clone)]
pub struct DistributionController {
    inner: Arc<ControllerInner>,
}

impl std::fmt::Debug for DistributionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributionController")
            .field("name", &self.inner.name)
            .field("state", &*self.inner.state.lock())
            .finish()
    }
}

impl DistributionController {
    pub fn new(
        name: impl Into<String>,
        parameters: SdcReceptionHandlerConfigurationParameterGroup,
        client_factory: Arc<dyn DistributionClientFactory>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                name: name.into(),
                parameters,
                client_factory,
                state: Mutex::new(ControllerState::default()),
                client: Mutex::new(None),
                configuration: tokio::sync::Mutex::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn state(&self) -> ControllerState {
        *self.inner.state.lock()
    }

    pub fn status(&self) -> ControllerStatus {
        self.state().status
    }

    pub fn notifications_ongoing(&self) -> u32 {
        self.state().notifications_ongoing
    }

    /// Current client handle, if one was created and not released
    pub fn client(&self) -> Option<Arc<dyn DistributionClient>> {
        self.inner.client.lock().clone()
    }

    /// Configuration wrapper of the running client
    pub async fn configuration(&self) -> Option<SdcConfiguration> {
        self.inner.configuration.lock().await.clone()
    }

    /// Initialize and start the client
    ///
    /// Only allowed from STOPPED. The client handle is created on first use
    /// and reused until [`close`](Self::close) releases it. Notifications
    /// the client delivers while starting are counted, so the controller
    /// ends up BUSY if any of them is still running.
    pub async fn init(&self, callback: Arc<dyn NotificationCallback>) -> DistributionResult<()> {
        let mut configuration_slot = self.inner.configuration.lock().await;
        debug!(controller = %self.inner.name, "going to initialize the distribution client");
        self.apply(ControllerCommand::Initializing)?;

        let configuration = configuration_slot
            .get_or_insert_with(|| SdcConfiguration::new(&self.inner.name, self.inner.parameters.clone()))
            .clone();
        let client = self
            .inner
            .client
            .lock()
            .get_or_insert_with(|| self.inner.client_factory.create_client())
            .clone();

        if let Err(err) = client.init(&configuration, callback).await {
            *configuration_slot = None;
            self.apply(ControllerCommand::InitializationFailed)?;
            let message = format!("SDC client initialization failed with reason:{}", err);
            error!(controller = %self.inner.name, "{}", message);
            return Err(DistributionError::Controller(message));
        }

        if let Err(err) = client.start().await {
            *configuration_slot = None;
            self.apply(ControllerCommand::InitializationFailed)?;
            let message = format!("SDC client start failed with reason:{}", err);
            error!(controller = %self.inner.name, "{}", message);
            return Err(DistributionError::Controller(message));
        }

        self.apply(ControllerCommand::Initialized)?;
        info!(
            controller = %self.inner.name,
            instance = %configuration.instance_name(),
            "distribution client started"
        );
        Ok(())
    }

    /// Stop and release the client
    ///
    /// Refused while a notification is being processed. Notifications
    /// arriving while the client stops are refused.
    pub async fn close(&self) -> DistributionResult<()> {
        let mut configuration_slot = self.inner.configuration.lock().await;
        debug!(controller = %self.inner.name, "going to stop the distribution client");
        let was_started = self.status() != ControllerStatus::Stopped;
        self.apply(ControllerCommand::Closing)?;

        let client = self.inner.client.lock().clone();
        if let (true, Some(client)) = (was_started, client) {
            if let Err(err) = client.stop().await {
                self.apply(ControllerCommand::CloseFailed)?;
                let message = format!("SDC client stop failed with reason:{}", err);
                error!(controller = %self.inner.name, "{}", message);
                return Err(DistributionError::Controller(message));
            }
        }
        *configuration_slot = None;
        *self.inner.client.lock() = None;

        self.apply(ControllerCommand::Closed)?;
        info!(controller = %self.inner.name, "distribution client stopped");
        Ok(())
    }

    /// Mark a notification as in progress
    ///
    /// The controller stays BUSY until every returned guard is dropped.
    pub fn enter_notification(&self) -> DistributionResult<NotificationGuard> {
        self.apply(ControllerCommand::NotificationStarted)?;
        Ok(NotificationGuard {
            inner: self.inner.clone(),
        })
    }

    fn apply(&self, command: ControllerCommand) -> DistributionResult<ControllerState> {
        apply(&self.inner, command)
    }

}

fn apply(inner: &ControllerInner, command: ControllerCommand) -> DistributionResult<ControllerState> {
    let mut state = inner.state.lock();
    let (next, ()) = state.transition(&command).map_err(|err| {
        error!(controller = %inner.name, status = %state.status, ?command, "{}", err);
        err
    })?;
    if let Err(violation) = next.check_invariants() {
        warn!(controller = %inner.name, "controller invariant violated: {}", violation);
    }
    debug!(
        controller = %inner.name,
        from = %state.status,
        to = %next.status,
        notifications_ongoing = next.notifications_ongoing,
        "controller transition"
    );
    *state = next;
    Ok(next)
}

/// Keeps the controller BUSY while alive
#[must_use = "the controller returns to IDLE as soon as the guard is dropped"]
pub struct NotificationGuard {
    inner: Arc<ControllerInner>,
}

impl Drop for NotificationGuard {
    fn drop(&mut self) {
        // NotificationFinished is accepted in every state
        let _ = apply(&self.inner, ControllerCommand::NotificationFinished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::sdc::client::{
        ArtifactInfo, ClientError, DistributionStatusMessage, FinalDistributionStatusMessage,
        NotificationData,
    };
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct ScriptedClient {
        fail_init: Option<String>,
        fail_start: Option<String>,
        fail_stop: Option<String>,
        stops: AtomicUsize,
    }

    #[async_trait]
    impl DistributionClient for ScriptedClient {
        async fn init(
            &self,
            _: &SdcConfiguration,
            _: Arc<dyn NotificationCallback>,
        ) -> Result<(), ClientError> {
            self.fail_init.clone().map_or(Ok(()), |r| Err(ClientError::new(r)))
        }

        async fn start(&self) -> Result<(), ClientError> {
            self.fail_start.clone().map_or(Ok(()), |r| Err(ClientError::new(r)))
        }

        async fn stop(&self) -> Result<(), ClientError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.fail_stop.clone().map_or(Ok(()), |r| Err(ClientError::new(r)))
        }

        async fn download(&self, _: &ArtifactInfo) -> Result<Vec<u8>, ClientError> {
            Ok(Vec::new())
        }

        async fn send_download_status(
            &self,
            _: &DistributionStatusMessage,
            _: Option<&str>,
        ) -> Result<(), ClientError> {
            Ok(())
        }

        async fn send_deployment_status(
            &self,
            _: &DistributionStatusMessage,
            _: Option<&str>,
        ) -> Result<(), ClientError> {
            Ok(())
        }

        async fn send_final_distribution_status(
            &self,
            _: &FinalDistributionStatusMessage,
            _: Option<&str>,
        ) -> Result<(), ClientError> {
            Ok(())
        }
    }

    struct IgnoreNotifications;

    #[async_trait]
    impl NotificationCallback for IgnoreNotifications {
        async fn activate_callback(&self, _: NotificationData) {}
    }

    fn controller_with(client: ScriptedClient) -> DistributionController {
        let client: Arc<dyn DistributionClient> = Arc::new(client);
        let factory = move || client.clone();
        DistributionController::new(
            "sdcHandler",
            SdcReceptionHandlerConfigurationParameterGroup::default(),
            Arc::new(factory),
        )
    }

    fn callback() -> Arc<dyn NotificationCallback> {
        Arc::new(IgnoreNotifications)
    }

    #[tokio::test]
    async fn test_init_moves_to_idle() {
        let controller = controller_with(ScriptedClient::default());
        assert_eq!(controller.status(), ControllerStatus::Stopped);

        controller.init(callback()).await.unwrap();
        assert_eq!(controller.status(), ControllerStatus::Idle);
        assert_eq!(controller.notifications_ongoing(), 0);
        let configuration = controller.configuration().await.unwrap();
        assert!(configuration.instance_name().starts_with("sdcHandler_"));
    }

    #[tokio::test]
    async fn test_second_init_is_rejected() {
        let controller = controller_with(ScriptedClient::default());
        controller.init(callback()).await.unwrap();

        let err = controller.init(callback()).await.unwrap_err();
        assert!(err.to_string().contains("already initialized"));
        assert_eq!(controller.status(), ControllerStatus::Idle);
    }

    #[tokio::test]
    async fn test_init_failure_resets_configuration() {
        let controller = controller_with(ScriptedClient {
            fail_init: Some("unreachable".to_string()),
            ..Default::default()
        });

        let err = controller.init(callback()).await.unwrap_err();
        assert_eq!(err.to_string(), "SDC client initialization failed with reason:unreachable");
        assert_eq!(controller.status(), ControllerStatus::Stopped);
        assert!(controller.configuration().await.is_none());
    }

    #[tokio::test]
    async fn test_start_failure_resets_configuration() {
        let controller = controller_with(ScriptedClient {
            fail_start: Some("no consumer".to_string()),
            ..Default::default()
        });

        let err = controller.init(callback()).await.unwrap_err();
        assert_eq!(err.to_string(), "SDC client start failed with reason:no consumer");
        assert_eq!(controller.status(), ControllerStatus::Stopped);
        assert!(controller.configuration().await.is_none());
    }

    #[tokio::test]
    async fn test_nested_notifications() {
        let controller = controller_with(ScriptedClient::default());
        controller.init(callback()).await.unwrap();

        let first = controller.enter_notification().unwrap();
        assert_eq!(controller.status(), ControllerStatus::Busy);
        assert_eq!(controller.notifications_ongoing(), 1);

        let second = controller.enter_notification().unwrap();
        assert_eq!(controller.notifications_ongoing(), 2);

        drop(first);
        assert_eq!(controller.status(), ControllerStatus::Busy);
        assert_eq!(controller.notifications_ongoing(), 1);

        drop(second);
        assert_eq!(controller.status(), ControllerStatus::Idle);
        assert_eq!(controller.notifications_ongoing(), 0);
    }

    #[tokio::test]
    async fn test_close_refused_while_busy() {
        let controller = controller_with(ScriptedClient::default());
        controller.init(callback()).await.unwrap();
        let guard = controller.enter_notification().unwrap();

        let err = controller.close().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot close the distribution client as the controller is currently in BUSY state"
        );
        assert_eq!(controller.status(), ControllerStatus::Busy);

        drop(guard);
        controller.close().await.unwrap();
        assert_eq!(controller.status(), ControllerStatus::Stopped);
        assert!(controller.client().is_none());
    }

    #[tokio::test]
    async fn test_stop_failure_keeps_client() {
        let controller = controller_with(ScriptedClient {
            fail_stop: Some("timeout".to_string()),
            ..Default::default()
        });
        controller.init(callback()).await.unwrap();

        let err = controller.close().await.unwrap_err();
        assert_eq!(err.to_string(), "SDC client stop failed with reason:timeout");
        assert_eq!(controller.status(), ControllerStatus::Idle);
        assert!(controller.client().is_some());
    }

    #[tokio::test]
    async fn test_notification_rejected_when_stopped() {
        let controller = controller_with(ScriptedClient::default());
        assert!(controller.enter_notification().is_err());
        assert_eq!(controller.status(), ControllerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_close_after_failed_init_releases_client_without_stop() {
        let client = Arc::new(ScriptedClient {
            fail_init: Some("unreachable".to_string()),
            ..Default::default()
        });
        let handle: Arc<dyn DistributionClient> = client.clone();
        let controller = DistributionController::new(
            "sdcHandler",
            SdcReceptionHandlerConfigurationParameterGroup::default(),
            Arc::new(move || handle.clone()),
        );
        controller.init(callback()).await.unwrap_err();
        assert!(controller.client().is_some());

        controller.close().await.unwrap();
        assert_eq!(client.stops.load(Ordering::SeqCst), 0);
        assert!(controller.client().is_none());
        assert_eq!(controller.status(), ControllerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_close_then_init_again() {
        let controller = controller_with(ScriptedClient::default());
        controller.init(callback()).await.unwrap();
        let first = controller.configuration().await.unwrap();
        controller.close().await.unwrap();
        controller.init(callback()).await.unwrap();
        let second = controller.configuration().await.unwrap();
        assert_ne!(first.instance_name(), second.instance_name());
    }
}
