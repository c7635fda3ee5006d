//! CLI infrastructure for the floe toolkit
//!
//! This module provides the command-line interface for running headless
//! training sessions and exporting saved session state.

pub mod commands;
