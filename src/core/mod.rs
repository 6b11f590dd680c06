//! Core application module
//!
//! This module contains:
//! - Command-line parsing for the headless binary
//! - The driver that runs session commands against a renderer until idle

pub mod app;

pub use app::{Cli, run, settle};
