//! Raw file reading.
//!
//! A [`RawSource`] turns a path into a [`RawRecord`]: the header byte prefix,
//! the flat data block and the attribute chain. Interpretation of those
//! bytes happens in `header` and `decode`; sources only do I/O and
//! unpacking. Failures are reported with the reader status codes 1..=5.

mod attributes;
pub mod davis;

use std::path::Path;

use thiserror::Error;

use crate::scale::LinearScale;

pub use attributes::{AttributeChain, AttributeMap, AttributeNode, Iter as AttributeIter};
pub use davis::DavisFileSource;

pub const STATUS_OK: i32 = 0;
pub const STATUS_FILE_OPEN: i32 = 1;
pub const STATUS_HEADER: i32 = 2;
pub const STATUS_FORMAT: i32 = 3;
pub const STATUS_DATA: i32 = 4;
pub const STATUS_MEMORY: i32 = 5;

/// Flat sample storage, either float or 16-bit word pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum RawData {
    Float(Vec<f32>),
    Word(Vec<u16>),
}

impl RawData {
    pub fn len(&self) -> usize {
        match self {
            RawData::Float(values) => values.len(),
            RawData::Word(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_float(&self) -> bool {
        matches!(self, RawData::Float(_))
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            RawData::Float(values) => values.clone(),
            RawData::Word(values) => values.iter().map(|v| f32::from(*v)).collect(),
        }
    }
}

/// Buffer as filled by the reader: dimensions, flat data and default scales.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBuffer {
    pub is_float: bool,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub nf: usize,
    pub total_lines: usize,
    pub vector_grid: i32,
    pub image_sub_type: i32,
    pub data: RawData,
    pub scale_x: LinearScale,
    pub scale_y: LinearScale,
    pub scale_i: LinearScale,
}

impl RawBuffer {
    /// Buffer with `total_lines = ny * nz * nf` and pixel/count identity scales.
    pub fn new(
        nx: usize,
        ny: usize,
        nz: usize,
        nf: usize,
        vector_grid: i32,
        image_sub_type: i32,
        data: RawData,
    ) -> Self {
        Self {
            is_float: data.is_float(),
            nx,
            ny,
            nz,
            nf,
            total_lines: ny * nz * nf,
            vector_grid,
            image_sub_type,
            data,
            scale_x: LinearScale::identity("pixel"),
            scale_y: LinearScale::identity("pixel"),
            scale_i: LinearScale::identity("counts"),
        }
    }
}

/// Everything one read call hands over to the decode session.
#[derive(Debug)]
pub struct RawRecord {
    pub header: Vec<u8>,
    pub buffer: RawBuffer,
    pub attributes: AttributeChain,
}

pub trait RawSource {
    fn read_raw(&self, path: &Path) -> Result<RawRecord, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open file: {0}")]
    FileOpen(#[source] std::io::Error),
    #[error("incorrect header: {0}")]
    Header(String),
    #[error("unsupported format: {0}")]
    Format(String),
    #[error("data read error: {0}")]
    Data(String),
    #[error("out of memory: {0}")]
    Memory(String),
}

impl SourceError {
    pub fn status(&self) -> i32 {
        match self {
            SourceError::FileOpen(_) => STATUS_FILE_OPEN,
            SourceError::Header(_) => STATUS_HEADER,
            SourceError::Format(_) => STATUS_FORMAT,
            SourceError::Data(_) => STATUS_DATA,
            SourceError::Memory(_) => STATUS_MEMORY,
        }
    }

    /// Rebuild an error from a reader status code; `None` for success.
    ///
    /// Codes outside 1..=5 are reported as data errors.
    pub fn from_status(code: i32, context: &str) -> Option<Self> {
        let context = context.to_string();
        match code {
            STATUS_OK => None,
            STATUS_FILE_OPEN => Some(SourceError::FileOpen(std::io::Error::other(context))),
            STATUS_HEADER => Some(SourceError::Header(context)),
            STATUS_FORMAT => Some(SourceError::Format(context)),
            STATUS_DATA => Some(SourceError::Data(context)),
            STATUS_MEMORY => Some(SourceError::Memory(context)),
            other => Some(SourceError::Data(format!(
                "{context}: unknown reader status {other}"
            ))),
        }
    }
}

impl From<davis::error::DavisError> for SourceError {
    fn from(value: davis::error::DavisError) -> Self {
        use davis::error::DavisError;
        match value {
            DavisError::Open(err) => SourceError::FileOpen(err),
            DavisError::HeaderTooShort { .. } | DavisError::Header(_) => {
                SourceError::Header(value.to_string())
            }
            DavisError::Unsupported { .. } => SourceError::Format(value.to_string()),
            DavisError::Truncated { .. } | DavisError::Corrupt { .. } => {
                SourceError::Data(value.to_string())
            }
            DavisError::Allocation { .. } => SourceError::Memory(value.to_string()),
        }
    }
}
