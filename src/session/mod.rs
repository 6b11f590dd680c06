//! Editor session management module
//!
//! This module contains:
//! - Text storage with undo history
//! - Message and command types exchanged with the host
//! - The session state value that closes the edit -> patch -> compile -> calibrate loop

pub mod document;
pub mod messages;
pub mod state;

pub use document::{MemoryStore, TextStore};
pub use messages::{Command, CompileMsg, DocumentMsg, Msg, PointerMsg, PropertyMsg, ViewMsg};
pub use state::{EditorSession, Frame};
