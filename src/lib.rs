//! Drag-to-edit TikZ figures
//!
//! The document text stays the single source of truth: shapes are scanned
//! from it, a render with injected color markers calibrates document units
//! against pixels, and each finished drag rewrites only the literals it
//! touched.

pub mod calibration;
pub mod compile;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod extract;
pub mod patch;
pub mod properties;
pub mod render;
pub mod samples;
pub mod session;
pub mod surface;

pub use error::{Error, Result};
