//! Pure domain types with minimal dependencies
//!
//! This module contains the types shared by the extractor, the calibration
//! engine, the editing surface and patch-back. Nothing here knows about
//! regexes, images or processes.

pub mod edit;
pub mod geometry;
pub mod shape;
pub mod snapshot;

pub use edit::*;
pub use geometry::*;
pub use shape::*;
pub use snapshot::*;
