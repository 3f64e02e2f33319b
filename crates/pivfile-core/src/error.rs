use thiserror::Error;

use crate::header::HeaderError;
use crate::source::SourceError;

/// Errors returned by decoding and by accesses on a decoded [`crate::Buffer`].
///
/// The first five kinds mirror the reader status codes 1..=5; the rest are
/// raised locally by the decode session.
///
/// # Examples
/// ```
/// use pivfile_core::PivError;
///
/// let err = PivError::from_status(3, "field.vc7").unwrap_err();
/// assert!(matches!(err, PivError::Format(_)));
/// assert!(PivError::from_status(0, "field.vc7").is_ok());
/// ```
#[derive(Debug, Error)]
pub enum PivError {
    #[error("cannot open file: {0}")]
    FileOpen(String),
    #[error("incorrect header: {0}")]
    Header(String),
    #[error("incorrect format: {0}")]
    Format(String),
    #[error("error while reading data: {0}")]
    Data(String),
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("invalid scale attribute {key}: {value:?}")]
    InvalidScale { key: String, value: String },
    #[error("invalid selector value {value} at row {row}, column {col}")]
    InvalidSelector { row: usize, col: usize, value: f32 },
    #[error("frame {index} out of range: buffer has {frames} frames")]
    FrameOutOfRange { index: usize, frames: usize },
    #[error("buffer used after release")]
    UseAfterRelease,
}

impl PivError {
    /// Map a reader status code onto an error; 0 is success.
    pub fn from_status(code: i32, context: &str) -> Result<(), PivError> {
        match SourceError::from_status(code, context) {
            None => Ok(()),
            Some(err) => Err(err.into()),
        }
    }
}

impl From<SourceError> for PivError {
    fn from(value: SourceError) -> Self {
        match value {
            SourceError::FileOpen(err) => PivError::FileOpen(err.to_string()),
            SourceError::Header(message) => PivError::Header(message),
            SourceError::Format(message) => PivError::Format(message),
            SourceError::Data(message) => PivError::Data(message),
            SourceError::Memory(message) => PivError::OutOfMemory(message),
        }
    }
}

impl From<HeaderError> for PivError {
    fn from(value: HeaderError) -> Self {
        match value {
            HeaderError::UnknownFormat { .. } => PivError::Format(value.to_string()),
            _ => PivError::Header(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PivError;
    use crate::header::HeaderError;

    #[test]
    fn status_codes_map_one_to_one() {
        assert!(PivError::from_status(0, "x").is_ok());
        assert!(matches!(
            PivError::from_status(1, "x"),
            Err(PivError::FileOpen(_))
        ));
        assert!(matches!(
            PivError::from_status(2, "x"),
            Err(PivError::Header(_))
        ));
        assert!(matches!(
            PivError::from_status(3, "x"),
            Err(PivError::Format(_))
        ));
        assert!(matches!(PivError::from_status(4, "x"), Err(PivError::Data(_))));
        assert!(matches!(
            PivError::from_status(5, "x"),
            Err(PivError::OutOfMemory(_))
        ));
    }

    #[test]
    fn unknown_format_code_is_a_format_error() {
        let err: PivError = HeaderError::UnknownFormat { code: 42 }.into();
        assert!(matches!(err, PivError::Format(_)));
        let err: PivError = HeaderError::TooShort {
            needed: 256,
            actual: 3,
        }
        .into();
        assert!(matches!(err, PivError::Header(_)));
    }
}
