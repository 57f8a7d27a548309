//! Unified error type for the sevenseg-lib crate.
//!
//! [`SevensegError`] wraps module-specific errors (`CodecError`,
//! `DeviceError`), config problems and JSON output failures. `From` impls
//! allow `?` to propagate across module boundaries.

use std::fmt;

use crate::codec::CodecError;
use crate::device::DeviceError;

/// Unified error type for sevenseg-lib operations.
#[derive(Debug)]
pub enum SevensegError {
    /// Segment index or frame error.
    Codec(CodecError),
    /// Device file read/write error.
    Device(DeviceError),
    /// Configuration validation error.
    Config(String),
    /// JSON rendering of command output failed.
    Json(serde_json::Error),
}

impl fmt::Display for SevensegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SevensegError::Codec(e) => write!(f, "{e}"),
            SevensegError::Device(e) => write!(f, "{e}"),
            SevensegError::Config(e) => write!(f, "Config error: {e}"),
            SevensegError::Json(e) => write!(f, "JSON output error: {e}"),
        }
    }
}

impl std::error::Error for SevensegError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SevensegError::Codec(e) => Some(e),
            SevensegError::Device(e) => Some(e),
            SevensegError::Config(_) => None,
            SevensegError::Json(e) => Some(e),
        }
    }
}

impl From<CodecError> for SevensegError {
    fn from(e: CodecError) -> Self {
        SevensegError::Codec(e)
    }
}

impl From<DeviceError> for SevensegError {
    fn from(e: DeviceError) -> Self {
        SevensegError::Device(e)
    }
}

impl From<serde_json::Error> for SevensegError {
    fn from(e: serde_json::Error) -> Self {
        SevensegError::Json(e)
    }
}

/// Crate-level Result alias using [`SevensegError`].
pub type Result<T> = std::result::Result<T, SevensegError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_codec_error() {
        let e: SevensegError = CodecError::InvalidSegmentIndex(9).into();
        assert!(matches!(
            e,
            SevensegError::Codec(CodecError::InvalidSegmentIndex(9))
        ));
    }

    #[test]
    fn from_device_error() {
        let e: SevensegError = DeviceError::ReadFailed("test".into()).into();
        assert!(matches!(e, SevensegError::Device(DeviceError::ReadFailed(_))));
    }

    #[test]
    fn from_json_error() {
        let json_err = serde_json::from_str::<u8>("not json").unwrap_err();
        let e: SevensegError = json_err.into();
        assert!(matches!(e, SevensegError::Json(_)));
        assert!(e.to_string().starts_with("JSON output error: "), "got: {e}");
        assert!(!e.to_string().contains("Config error"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn display_codec_error() {
        let e = SevensegError::Codec(CodecError::InvalidSegmentIndex(0));
        assert_eq!(e.to_string(), "Invalid segment index 0 (expected 1-7)");
    }

    #[test]
    fn display_unknown_segment() {
        let e = SevensegError::Codec(CodecError::UnknownSegment("H".into()));
        assert_eq!(e.to_string(), "Unknown segment \"H\" (expected 1-7 or A-G)");
    }

    #[test]
    fn display_config_error() {
        let e = SevensegError::Config("invalid input".into());
        assert_eq!(e.to_string(), "Config error: invalid input");
    }

    #[test]
    fn source_chains_device_error() {
        let e = SevensegError::Device(DeviceError::WriteFailed("timeout".into()));
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("timeout"));
    }

    #[test]
    fn source_none_for_config() {
        let e = SevensegError::Config("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_device_to_sevenseg() {
        fn inner() -> crate::device::Result<()> {
            Err(DeviceError::ReadFailed("gone".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, SevensegError::Device(DeviceError::ReadFailed(_))));
    }
}
