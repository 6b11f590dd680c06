//! Immutable, versioned text snapshots

use std::sync::Arc;

/// One immutable version of the document text
///
/// Byte spans are only meaningful against the snapshot they were scanned
/// from; the version number is how patch-back detects staleness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSnapshot {
    version: u64,
    text: Arc<str>,
}

impl TextSnapshot {
    pub fn new(version: u64, text: impl Into<Arc<str>>) -> Self {
        Self {
            version,
            text: text.into(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
