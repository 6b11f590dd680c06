//! Typed errors shared across the library

use thiserror::Error;

use crate::calibration::CalibrationError;
use crate::compile::RenderError;
use crate::patch::PatchError;
use crate::properties::PropertyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("unknown handle '{0}' (expected kind:index[:sub])")]
    UnknownHandle(String),

    #[error("unknown example '{0}'")]
    UnknownExample(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_their_message() {
        let span = crate::domain::ByteSpan::new(4, 4);
        let err: Error = PatchError::EmptySpan(span).into();
        assert_eq!(err.to_string(), PatchError::EmptySpan(span).to_string());
        let err: Error = CalibrationError::EmptyImage.into();
        assert!(matches!(err, Error::Calibration(CalibrationError::EmptyImage)));
    }
}
