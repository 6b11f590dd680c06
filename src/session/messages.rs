//! Message types for an editor session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - Command enum for the work a session asks its host to perform

use std::time::Duration;

use crate::compile::{CompileJob, RenderError, RenderedPage};
use crate::config::EditorConfig;
use crate::domain::{HandleRef, ScreenPoint};
use crate::properties::{GeometryValues, StyleSettings};

// ============================================================================
// Pointer/View Types
// ============================================================================

/// Pointer events in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMsg {
    /// Primary button pressed
    Press(ScreenPoint),
    /// Pointer moved (with or without a button held)
    Move(ScreenPoint),
    /// Primary button released
    Release(ScreenPoint),
    /// Pointer session aborted (e.g. focus lost); nothing is emitted
    Cancel,
}

/// View manipulation messages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMsg {
    /// Wheel rotation in notches (120 angle units each)
    Wheel(f64),
    /// Widget resized
    Resized(u32, u32),
    /// Back to fit-to-widget, no pan
    Reset,
}

// ============================================================================
// Document Types
// ============================================================================

/// Document text messages
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentMsg {
    /// Whole text replaced (typing, file load, example)
    Replaced(String),
    /// Undo the last text change
    Undo,
    /// Redo an undone text change
    Redo,
}

// ============================================================================
// Property Types
// ============================================================================

/// Selection and property-panel messages
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyMsg {
    /// Select a shape (`None` clears the selection)
    Select(Option<HandleRef>),
    /// Write typed geometry into the selected shape
    ApplyGeometry(GeometryValues),
    /// Rewrite the options of the command holding the selected shape
    ApplyStyle(StyleSettings),
}

// ============================================================================
// Compile Types
// ============================================================================

/// Compile pipeline messages
#[derive(Debug)]
pub enum CompileMsg {
    /// Compile the current text now
    Requested,
    /// The debounce for `version` elapsed
    Due(u64),
    /// The job for `version` completed
    Finished {
        version: u64,
        result: Result<RenderedPage, RenderError>,
    },
}

// ============================================================================
// Top-level Message
// ============================================================================

#[derive(Debug)]
pub enum Msg {
    Pointer(PointerMsg),
    View(ViewMsg),
    Document(DocumentMsg),
    Property(PropertyMsg),
    Compile(CompileMsg),
    /// Settings edited (snap step, grid extent, tools)
    Settings(EditorConfig),
}

impl From<PointerMsg> for Msg {
    fn from(msg: PointerMsg) -> Self {
        Msg::Pointer(msg)
    }
}

impl From<ViewMsg> for Msg {
    fn from(msg: ViewMsg) -> Self {
        Msg::View(msg)
    }
}

impl From<DocumentMsg> for Msg {
    fn from(msg: DocumentMsg) -> Self {
        Msg::Document(msg)
    }
}

impl From<PropertyMsg> for Msg {
    fn from(msg: PropertyMsg) -> Self {
        Msg::Property(msg)
    }
}

impl From<CompileMsg> for Msg {
    fn from(msg: CompileMsg) -> Self {
        Msg::Compile(msg)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Work the host performs on behalf of the session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Submit this job to the renderer, then report [`CompileMsg::Finished`]
    StartCompile(CompileJob),
    /// Ask the renderer to abort the running job
    CancelCompile,
    /// Send [`CompileMsg::Due`] for `version` after `delay`
    CompileAfter { version: u64, delay: Duration },
    /// Status line for the user
    Log(String),
    /// Something visible changed
    Redraw,
}
