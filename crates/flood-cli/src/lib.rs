//! Flood pipeline command-line library
//!
//! Argument parsing and configuration layering, shared by the `flood` binary
//! and its tests.

pub mod cli;
pub mod config;
