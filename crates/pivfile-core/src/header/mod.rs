//! Header disambiguation.
//!
//! Files carry one of two incompatible fixed layouts. The prefix is first read
//! as a Current header; when its `size_x` disagrees with the buffer width the
//! reader produced, the same bytes are read again as a Legacy header. The
//! result is resolved once into a tagged [`Header`].
//!
//! Byte offsets live in `current::layout` and `legacy::layout`; both parsers
//! share the bounds-checked `reader`.

pub mod current;
pub mod error;
pub mod format;
pub mod legacy;
pub mod reader;

use serde::{Deserialize, Serialize};

pub use current::CurrentHeader;
pub use error::HeaderError;
pub use format::BufferFormat;
pub use legacy::{ImageType, LegacyHeader, LegacyScaleFields};

/// Which header layout a file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    Current,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Header {
    Current {
        #[serde(flatten)]
        fields: CurrentHeader,
        format: BufferFormat,
    },
    Legacy(LegacyHeader),
}

impl Header {
    pub fn kind(&self) -> ReaderKind {
        match self {
            Header::Current { .. } => ReaderKind::Current,
            Header::Legacy(_) => ReaderKind::Legacy,
        }
    }

    /// Legacy files only hold images.
    pub fn buffer_format(&self) -> BufferFormat {
        match self {
            Header::Current { format, .. } => *format,
            Header::Legacy(_) => BufferFormat::Image,
        }
    }

    pub fn vector_grid(&self) -> i32 {
        match self {
            Header::Current { fields, .. } => i32::from(fields.vector_grid),
            Header::Legacy(header) => i32::from(header.vector_grid),
        }
    }
}

/// Decode `prefix` for a buffer `nx` samples wide.
///
/// # Examples
/// ```text
/// use pivfile_core::header::{decode_header, ReaderKind};
///
/// let mut prefix = vec![0u8; 256];
/// prefix[8..12].copy_from_slice(&3i32.to_le_bytes());
/// let header = decode_header(&prefix, 3).unwrap();
/// assert_eq!(header.kind(), ReaderKind::Current);
/// ```
pub fn decode_header(prefix: &[u8], nx: usize) -> Result<Header, HeaderError> {
    let fields = current::parse_current_header(prefix)?;
    if usize::try_from(fields.size_x).ok() == Some(nx) {
        let format = BufferFormat::from_code(fields.buffer_format)?;
        return Ok(Header::Current { fields, format });
    }

    let inconsistent = |legacy_columns| HeaderError::Inconsistent {
        nx,
        current_size_x: fields.size_x,
        legacy_columns,
    };
    let legacy = match legacy::parse_legacy_header(prefix) {
        Ok(legacy) => legacy,
        Err(HeaderError::UnknownImageType { .. }) | Err(HeaderError::TooShort { .. }) => {
            return Err(inconsistent(None));
        }
        Err(err) => return Err(err),
    };
    let columns = legacy.resolved_columns();
    if usize::try_from(columns).ok() != Some(nx) {
        return Err(inconsistent(Some(columns)));
    }
    Ok(Header::Legacy(legacy))
}

#[cfg(test)]
mod tests {
    use super::{BufferFormat, Header, HeaderError, ReaderKind, decode_header};
    use crate::header::current::layout as current_layout;
    use crate::header::legacy::layout as legacy_layout;

    fn current_prefix(size_x: i32, buffer_format: i16) -> Vec<u8> {
        let mut prefix = vec![0u8; 256];
        prefix[current_layout::BUFFER_FORMAT_RANGE].copy_from_slice(&buffer_format.to_le_bytes());
        prefix[current_layout::SIZE_X_RANGE].copy_from_slice(&size_x.to_le_bytes());
        prefix[current_layout::VECTOR_GRID_RANGE].copy_from_slice(&8i16.to_le_bytes());
        prefix
    }

    fn legacy_prefix(columns: i16) -> Vec<u8> {
        let mut prefix = vec![0u8; 256];
        prefix[legacy_layout::IMAGE_TYPE_RANGE].copy_from_slice(&18i16.to_le_bytes());
        prefix[legacy_layout::ROWS_RANGE].copy_from_slice(&4i16.to_le_bytes());
        prefix[legacy_layout::COLUMNS_RANGE].copy_from_slice(&columns.to_le_bytes());
        prefix[legacy_layout::VECTOR_GRID_RANGE].copy_from_slice(&1i16.to_le_bytes());
        prefix[legacy_layout::VERSION_OFFSET] = 60;
        prefix
    }

    #[test]
    fn current_when_width_matches() {
        let header = decode_header(&current_prefix(3, 4), 3).unwrap();
        assert_eq!(header.kind(), ReaderKind::Current);
        assert_eq!(header.buffer_format(), BufferFormat::Vector3d);
        assert_eq!(header.vector_grid(), 8);
    }

    #[test]
    fn falls_back_to_legacy() {
        // Legacy bytes 8..12 hold `extended`/rows, never equal to the width here.
        let header = decode_header(&legacy_prefix(5), 5).unwrap();
        assert_eq!(header.kind(), ReaderKind::Legacy);
        assert_eq!(header.buffer_format(), BufferFormat::Image);
        assert!(matches!(header, Header::Legacy(_)));
    }

    #[test]
    fn neither_layout_fits() {
        let err = decode_header(&legacy_prefix(5), 6).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::Inconsistent {
                nx: 6,
                legacy_columns: Some(5),
                ..
            }
        ));
        let err = decode_header(&current_prefix(3, 0), 4).unwrap_err();
        assert!(matches!(err, HeaderError::Inconsistent { legacy_columns: None, .. }));
    }

    #[test]
    fn unknown_buffer_format() {
        let err = decode_header(&current_prefix(3, 7), 3).unwrap_err();
        assert!(matches!(err, HeaderError::UnknownFormat { code: 7 }));
    }

    #[test]
    fn prefix_too_short() {
        let err = decode_header(&[0u8; 10], 3).unwrap_err();
        assert!(matches!(err, HeaderError::TooShort { needed: 30, actual: 10 }));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let header = decode_header(&current_prefix(3, 2), 3).unwrap();
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["kind"], "current");
        assert_eq!(json["format"], "VECTOR_2D");
        assert_eq!(json["size_x"], 3);
    }
}
