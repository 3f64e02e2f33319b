use serde::{Deserialize, Serialize};

use super::error::HeaderError;

/// Closed set of buffer format codes found in the Current header.
///
/// Positive codes describe vector buffers made of a fixed number of blocks;
/// zero and negative codes describe image storage.
///
/// # Examples
/// ```
/// use pivfile_core::BufferFormat;
///
/// let format = BufferFormat::from_code(3).unwrap();
/// assert_eq!(format, BufferFormat::Vector2dExtendedPeak);
/// assert_eq!(format.vector_block_count(), Some(10));
/// assert!(BufferFormat::from_code(9).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BufferFormat {
    Rgb32,
    Color,
    FloatValid,
    Double,
    Word,
    Float,
    MemPackWord,
    NotUsed,
    Image,
    #[serde(rename = "VECTOR_2D_EXTENDED")]
    Vector2dExtended,
    #[serde(rename = "VECTOR_2D")]
    Vector2d,
    #[serde(rename = "VECTOR_2D_EXTENDED_PEAK")]
    Vector2dExtendedPeak,
    #[serde(rename = "VECTOR_3D")]
    Vector3d,
    #[serde(rename = "VECTOR_3D_EXTENDED_PEAK")]
    Vector3dExtendedPeak,
}

/// Blocks per vector format, indexed by `code - 1`.
const VECTOR_BLOCK_COUNTS: [usize; 5] = [9, 2, 10, 3, 14];

impl BufferFormat {
    pub const ALL: [BufferFormat; 14] = [
        BufferFormat::Rgb32,
        BufferFormat::Color,
        BufferFormat::FloatValid,
        BufferFormat::Double,
        BufferFormat::Word,
        BufferFormat::Float,
        BufferFormat::MemPackWord,
        BufferFormat::NotUsed,
        BufferFormat::Image,
        BufferFormat::Vector2dExtended,
        BufferFormat::Vector2d,
        BufferFormat::Vector2dExtendedPeak,
        BufferFormat::Vector3d,
        BufferFormat::Vector3dExtendedPeak,
    ];

    pub fn from_code(code: i16) -> Result<Self, HeaderError> {
        let format = match code {
            -11 => BufferFormat::Rgb32,
            -10 => BufferFormat::Color,
            -6 => BufferFormat::FloatValid,
            -5 => BufferFormat::Double,
            -4 => BufferFormat::Word,
            -3 => BufferFormat::Float,
            -2 => BufferFormat::MemPackWord,
            -1 => BufferFormat::NotUsed,
            0 => BufferFormat::Image,
            1 => BufferFormat::Vector2dExtended,
            2 => BufferFormat::Vector2d,
            3 => BufferFormat::Vector2dExtendedPeak,
            4 => BufferFormat::Vector3d,
            5 => BufferFormat::Vector3dExtendedPeak,
            other => return Err(HeaderError::UnknownFormat { code: other }),
        };
        Ok(format)
    }

    pub fn code(self) -> i16 {
        match self {
            BufferFormat::Rgb32 => -11,
            BufferFormat::Color => -10,
            BufferFormat::FloatValid => -6,
            BufferFormat::Double => -5,
            BufferFormat::Word => -4,
            BufferFormat::Float => -3,
            BufferFormat::MemPackWord => -2,
            BufferFormat::NotUsed => -1,
            BufferFormat::Image => 0,
            BufferFormat::Vector2dExtended => 1,
            BufferFormat::Vector2d => 2,
            BufferFormat::Vector2dExtendedPeak => 3,
            BufferFormat::Vector3d => 4,
            BufferFormat::Vector3dExtendedPeak => 5,
        }
    }

    pub fn is_vector(self) -> bool {
        self.code() > 0
    }

    /// Number of ny×nx blocks a vector buffer is made of.
    pub fn vector_block_count(self) -> Option<usize> {
        let code = self.code();
        if code > 0 {
            VECTOR_BLOCK_COUNTS.get(code as usize - 1).copied()
        } else {
            None
        }
    }

    /// Lines per data row as stored by the writer (`ny` multiplier).
    pub fn component_count(self) -> usize {
        self.vector_block_count().unwrap_or(1)
    }

    /// Stored as 16-bit words rather than floats.
    pub fn is_word_storage(self) -> bool {
        matches!(self, BufferFormat::Word | BufferFormat::MemPackWord)
    }

    /// Extended formats carry a per-pixel selector in block 0.
    pub fn has_selector(self) -> bool {
        matches!(
            self,
            BufferFormat::Vector2dExtended
                | BufferFormat::Vector2dExtendedPeak
                | BufferFormat::Vector3dExtendedPeak
        )
    }
}
