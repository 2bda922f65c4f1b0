// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Controller Lifecycle
//!
//! Drives [`ControllerState`] with arbitrary command sequences, applying a
//! command only when the machine accepts it, the way the controller does.

use policy_distribution::state_machine::{
    ControllerCommand, ControllerState, ControllerStatus, StateInvariant, StateMachine,
};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

fn command() -> impl Strategy<Value = ControllerCommand> {
    prop_oneof![
        Just(ControllerCommand::Initializing),
        Just(ControllerCommand::Initialized),
        Just(ControllerCommand::InitializationFailed),
        Just(ControllerCommand::NotificationStarted),
        Just(ControllerCommand::NotificationFinished),
        Just(ControllerCommand::Closing),
        Just(ControllerCommand::Closed),
        Just(ControllerCommand::CloseFailed),
    ]
}

fn command_sequence() -> impl Strategy<Value = Vec<ControllerCommand>> {
    prop::collection::vec(command(), 0..64)
}

/// Apply every accepted command, returning all states visited
fn run(commands: &[ControllerCommand]) -> Vec<ControllerState> {
    let mut state = ControllerState::default();
    let mut visited = vec![state];
    for command in commands {
        if let Ok((next, ())) = state.transition(command) {
            state = next;
            visited.push(state);
        }
    }
    visited
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Invariants hold in every reachable state
    ///
    /// BUSY always has a notification in flight; IDLE, STOPPED and CLOSING
    /// never do.
    #[test]
    fn prop_invariants_always_hold(commands in command_sequence()) {
        for state in run(&commands) {
            prop_assert!(state.check_invariants().is_ok(), "violated in {:?}", state);
        }
    }

    /// Property: Close is never accepted while BUSY
    #[test]
    fn prop_close_refused_while_busy(commands in command_sequence()) {
        for state in run(&commands) {
            if state.status == ControllerStatus::Busy {
                prop_assert!(!state.can_transition(&ControllerCommand::Closing));
            }
        }
    }

    /// Property: Balanced notifications return to IDLE
    ///
    /// From IDLE, n entries followed by n exits always ends in IDLE with no
    /// notification in flight.
    #[test]
    fn prop_balanced_notifications_return_to_idle(n in 1usize..32) {
        let mut commands = vec![ControllerCommand::Initializing, ControllerCommand::Initialized];
        commands.extend(std::iter::repeat(ControllerCommand::NotificationStarted).take(n));
        commands.extend(std::iter::repeat(ControllerCommand::NotificationFinished).take(n));

        let visited = run(&commands);
        let peak = visited.iter().map(|s| s.notifications_ongoing).max().unwrap_or(0);
        let last = visited.last().copied().unwrap_or_default();

        prop_assert_eq!(peak as usize, n);
        prop_assert_eq!(last.status, ControllerStatus::Idle);
        prop_assert_eq!(last.notifications_ongoing, 0);
    }

    /// Property: A CLOSING controller admits no notification
    #[test]
    fn prop_closing_refuses_notifications(commands in command_sequence()) {
        for state in run(&commands) {
            if state.status == ControllerStatus::Closing {
                prop_assert!(!state.can_transition(&ControllerCommand::NotificationStarted));
            }
        }
    }
}
