// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution Controller Lifecycle State Machine
//!
//! Formal FSM for the controller that wraps a distribution client.
//!
//! # States
//!
//! - Stopped: Initial, no client running
//! - Starting: Client init/start in progress; notifications are counted
//! - Idle: Client started, no notification being processed
//! - Busy: One or more (re-entrant) notifications being processed
//! - Closing: Client stop in progress; new notifications are refused
//!
//! # Inputs
//!
//! - Initializing: Stopped → Starting
//! - Initialized: Starting → Idle, or Busy if notifications arrived meanwhile
//! - InitializationFailed: Starting → Stopped
//! - NotificationStarted: Starting|Idle|Busy, counter + 1
//! - NotificationFinished: counter - 1, Busy → Idle at zero; accepted everywhere
//! - Closing: Idle|Stopped → Closing, refused while Busy
//! - Closed: Closing → Stopped
//! - CloseFailed: Closing → Idle

use serde::Serialize;
use std::fmt;

use super::{StateInvariant, StateMachine, TransitionError, TransitionResult};

/// Controller status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerStatus {
    Stopped,
    Starting,
    Idle,
    Busy,
    Closing,
}

impl fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ControllerStatus::Stopped => "STOPPED",
            ControllerStatus::Starting => "STARTING",
            ControllerStatus::Idle => "IDLE",
            ControllerStatus::Busy => "BUSY",
            ControllerStatus::Closing => "CLOSING",
        };
        f.write_str(text)
    }
}

/// Lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Client init and start are about to run
    Initializing,

    /// Client init and start both succeeded
    Initialized,

    /// Client init or start failed
    InitializationFailed,

    /// A notification callback was entered
    NotificationStarted,

    /// A notification callback was left
    NotificationFinished,

    /// Client stop is about to run
    Closing,

    /// Client stopped and released
    Closed,

    /// Client stop failed, the client keeps running
    CloseFailed,
}

/// Status plus the number of notifications currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub status: ControllerStatus,
    pub notifications_ongoing: u32,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            status: ControllerStatus::Stopped,
            notifications_ongoing: 0,
        }
    }
}

impl ControllerState {
    fn with(status: ControllerStatus, notifications_ongoing: u32) -> Self {
        Self {
            status,
            notifications_ongoing,
        }
    }

    /// Idle or Busy depending on the notifications in flight
    fn running(notifications_ongoing: u32) -> Self {
        if notifications_ongoing > 0 {
            Self::with(ControllerStatus::Busy, notifications_ongoing)
        } else {
            Self::with(ControllerStatus::Idle, 0)
        }
    }

    fn invalid(&self, to: ControllerStatus) -> TransitionError {
        TransitionError::InvalidTransition {
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}

const ALREADY_INITIALIZED: &str = "The distribution client is already initialized, call close first";
const CLOSE_WHILE_BUSY: &str =
    "Cannot close the distribution client as the controller is currently in BUSY state";

impl StateMachine for ControllerState {
    type Input = ControllerCommand;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use ControllerCommand as C;
        use ControllerStatus::*;

        let n = self.notifications_ongoing;
        let next = match (self.status, input) {
            (Stopped, C::Initializing) => Self::with(Starting, 0),
            (Starting | Idle | Busy | Closing, C::Initializing) => {
                return Err(TransitionError::BusinessRuleViolation(ALREADY_INITIALIZED.to_string()))
            }

            (Starting, C::Initialized) => Self::running(n),
            (Idle | Busy, C::Initialized) => {
                return Err(TransitionError::BusinessRuleViolation(ALREADY_INITIALIZED.to_string()))
            }
            (Stopped | Closing, C::Initialized) => return Err(self.invalid(Idle)),

            (Starting, C::InitializationFailed) => Self::with(Stopped, 0),
            (_, C::InitializationFailed) => return Err(self.invalid(Stopped)),

            (Starting, C::NotificationStarted) => Self::with(Starting, n + 1),
            (Idle | Busy, C::NotificationStarted) => Self::with(Busy, n + 1),
            (Stopped | Closing, C::NotificationStarted) => return Err(self.invalid(Busy)),

            (Starting, C::NotificationFinished) => Self::with(Starting, n.saturating_sub(1)),
            (Idle | Busy, C::NotificationFinished) => Self::running(n.saturating_sub(1)),
            (Stopped | Closing, C::NotificationFinished) => *self,

            (Busy, C::Closing) => {
                return Err(TransitionError::BusinessRuleViolation(CLOSE_WHILE_BUSY.to_string()))
            }
            (Idle | Stopped, C::Closing) => Self::with(Closing, 0),
            (Starting | Closing, C::Closing) => return Err(self.invalid(Closing)),

            (Closing, C::Closed) => Self::with(Stopped, 0),
            (_, C::Closed) => return Err(self.invalid(Stopped)),

            (Closing, C::CloseFailed) => Self::with(Idle, 0),
            (_, C::CloseFailed) => return Err(self.invalid(Idle)),
        };
        Ok((next, ()))
    }
}

impl StateInvariant for ControllerState {
    fn check_invariants(&self) -> Result<(), String> {
        match (self.status, self.notifications_ongoing) {
            (ControllerStatus::Busy, 0) => Err("BUSY with no notification ongoing".to_string()),
            (ControllerStatus::Idle | ControllerStatus::Stopped | ControllerStatus::Closing, n)
                if n > 0 =>
            {
                Err(format!("{} with {} notification(s) ongoing", self.status, n))
            }
            _ => Ok(()),
        }
    }
}
