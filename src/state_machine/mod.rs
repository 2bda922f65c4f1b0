// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic state machine types used to model plugin lifecycles. Transitions
//! are pure functions of `(state, input)`; the owner of the state decides
//! where it lives and how it is locked.
//!
//! ## Mealy Machine
//!
//! Output depends on both current state and input:
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! # Example
//!
//! ```rust
//! use policy_distribution::state_machine::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Switch {
//!     Off,
//!     On,
//! }
//!
//! impl StateMachine for Switch {
//!     type Input = ();
//!     type Output = ();
//!
//!     fn transition(&self, _input: &()) -> TransitionResult<(Self, ())> {
//!         match self {
//!             Switch::Off => Ok((Switch::On, ())),
//!             Switch::On => Ok((Switch::Off, ())),
//!         }
//!     }
//! }
//!
//! let (next, _) = Switch::Off.transition(&()).unwrap();
//! assert_eq!(next, Switch::On);
//! ```

pub mod controller_lifecycle;

pub use controller_lifecycle::{ControllerCommand, ControllerState, ControllerStatus};

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Business rule prevents transition
    #[error("{0}")]
    BusinessRuleViolation(String),
}

/// Trait for finite state machines
///
/// Implement this trait to define a state machine with typed states,
/// inputs, and outputs.
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    ///
    /// # Returns
    /// - Ok((new_state, output)) if transition is valid
    /// - Err(TransitionError) if transition is invalid
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }
}

/// Trait for states with invariants
///
/// States can have invariants that must hold true.
/// These are checked after every applied transition.
pub trait StateInvariant {
    /// Check if state invariants hold
    fn check_invariants(&self) -> Result<(), String>;
}
