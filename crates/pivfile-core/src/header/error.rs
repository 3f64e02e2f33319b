use thiserror::Error;

/// Errors returned by header parsing and disambiguation.
///
/// Note: this error type lives in an internal module; the example is
/// illustrative and not compiled as a public doctest.
///
/// # Examples
/// ```text
/// use pivfile_core::header::HeaderError;
///
/// let err = HeaderError::UnknownFormat { code: 9 };
/// assert!(err.to_string().contains("unknown buffer format"));
/// ```
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("header too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("unknown buffer format code: {code}")]
    UnknownFormat { code: i16 },
    #[error("unknown image type: {value}")]
    UnknownImageType { value: i16 },
    #[error(
        "no consistent header layout for nx={nx} (IM7 sizeX={current_size_x}, IMX columns={legacy_columns:?})"
    )]
    Inconsistent {
        nx: usize,
        current_size_x: i32,
        legacy_columns: Option<i32>,
    },
}
