//! Handle rendering module
//!
//! Draws the editable handles onto a rendered raster with tiny-skia, for
//! hosts without their own canvas and for the `handles --overlay` command.

pub mod overlay;

pub use overlay::draw_handles;
