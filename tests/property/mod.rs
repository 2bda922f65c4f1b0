// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify
//! properties of parameter validation and the controller state machine.

mod controller_lifecycle;
mod parameter_validation;
