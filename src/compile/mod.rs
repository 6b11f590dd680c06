//! Rendering collaborator
//!
//! The compiler and rasterizer are opaque: they take a prepared document and
//! hand back one flat raster or a failure. This module prepares documents,
//! decides when a compile may start, and talks to the external tools.

#[cfg(test)]
pub(crate) mod fake;
pub mod inject;
pub mod latex;
pub mod scheduler;

pub use inject::{GridSettings, has_drawing_block, prepare_for_render, wrap_tikz_document};
pub use latex::LatexRenderer;
pub use scheduler::{CompileJob, CompileScheduler, SchedulerAction};

use futures::future::BoxFuture;
use image::RgbaImage;
use thiserror::Error;

/// One successful render
#[derive(Clone, Debug)]
pub struct RenderedPage {
    pub image: RgbaImage,
    /// Combined tool output
    pub log: String,
}

impl RenderedPage {
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed ({status})")]
    Failed {
        tool: String,
        status: String,
        log: String,
    },

    #[error("render cancelled")]
    Cancelled,

    #[error("rendered image unreadable: {0}")]
    Image(#[from] image::ImageError),

    #[error("work directory: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Tool output captured before the failure, if any
    pub fn log(&self) -> Option<&str> {
        match self {
            RenderError::Failed { log, .. } => Some(log),
            _ => None,
        }
    }
}

/// Asynchronous render service: at most one job is expected in flight
pub trait Renderer: Send + Sync {
    /// Render an already prepared document
    fn submit(&self, source: String) -> BoxFuture<'static, Result<RenderedPage, RenderError>>;

    /// Best-effort abort of the running job; it then completes with [`RenderError::Cancelled`]
    fn cancel(&self);
}
