//! pivfile core library for decoding LaVision DaVis PIV files.
//!
//! This crate turns IM7/VC7/IMX/IMG/VEC files into physically scaled image
//! and vector-field arrays. A raw source does the file I/O and unpacking, the
//! header decoder picks one of two fixed layouts (layout/reader/parser), and
//! the decode session resolves linear scales, segments the flat data into
//! blocks and extracts velocity components on demand.
//!
//! Invariants:
//! - The header layout is decided from content, never from the file name.
//! - Blocks must cover the flat buffer exactly; a mismatch is a format error.
//! - A missing scale attribute is the only non-fatal condition.
//! - No access to a buffer is valid after `release`.
//!
//! Version française (résumé):
//! Cette crate décode les fichiers PIV DaVis : source brute -> en-tête
//! (deux formats fixes) -> échelles linéaires -> blocs -> composantes de
//! vitesse. Les E/S restent dans `source`, les conventions binaires dans les
//! modules `layout` et `reader`.
//!
//! # Examples
//! ```no_run
//! use pivfile_core::read;
//!
//! let (mut buffer, attributes) = read("B00001.vc7")?;
//! println!("format: {:?}", buffer.buffer_format()?);
//! println!("vmag shape: {:?}", buffer.vmag()?.shape());
//! println!("{} attributes", attributes.len());
//! buffer.release()?;
//! # Ok::<(), pivfile_core::PivError>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod decode;
mod error;
pub mod export;
pub mod header;
mod inspect;
pub mod scale;
pub mod source;

pub use decode::components::VectorField;
pub use decode::grid::Positions;
pub use decode::mask::{MaskedArray, apply_mask, disabled_vectors};
pub use decode::scale::{ScaleAxis, Scales, parse_scale_attribute};
pub use decode::{Buffer, Dimensions, read, read_with};
pub use error::PivError;
pub use export::{PivmatField, pivmat_field};
pub use header::{BufferFormat, Header, ReaderKind};
pub use inspect::{inspect_file, inspect_source, summarize};
pub use scale::LinearScale;
pub use source::{
    AttributeChain, AttributeMap, DavisFileSource, RawBuffer, RawData, RawRecord, RawSource,
    SourceError,
};

/// Current summary schema version.
pub const REPORT_VERSION: u32 = 1;

/// Description of one decoded file.
///
/// # Examples
/// ```
/// use pivfile_core::{BufferFormat, Dimensions, InputInfo, LinearScale, ReaderKind, Scales, make_summary};
///
/// let scales = Scales {
///     x: LinearScale::identity("pixel"),
///     y: LinearScale::identity("pixel"),
///     i: LinearScale::identity("counts"),
/// };
/// let dimensions = Dimensions {
///     nx: 4,
///     ny: 3,
///     nz: 1,
///     nf: 1,
///     total_lines: 3,
///     vector_grid: 1,
///     is_float: false,
/// };
/// let input = InputInfo {
///     path: "frame.im7".to_string(),
///     bytes: 300,
/// };
/// let summary = make_summary(input, ReaderKind::Current, BufferFormat::Word, dimensions, scales);
/// assert_eq!(summary.report_version, pivfile_core::REPORT_VERSION);
/// assert!(summary.field.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Summary schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input file metadata.
    pub input: InputInfo,
    /// Header layout the file was decoded with.
    pub reader: ReaderKind,
    pub buffer_format: BufferFormat,
    /// Extents after segmentation.
    pub dimensions: Dimensions,
    pub block_count: usize,
    pub scales: Scales,
    /// Axes that fell back to an identity scale.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_scales: Vec<ScaleAxis>,
    pub attribute_count: usize,
    /// Vector statistics, for vector buffers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldSummary>,
}

/// Tool metadata embedded in summaries.
///
/// # Examples
/// ```
/// use pivfile_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "pivfile".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "pivfile");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "pivfile").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Velocity magnitude statistics over enabled vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSummary {
    /// Number of grid cells.
    pub vectors: usize,
    /// Cells whose selector is not 0.
    pub enabled: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmag_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmag_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmag_mean: Option<f64>,
}

/// Build a summary with base fields filled and no field statistics.
pub fn make_summary(
    input: InputInfo,
    reader: ReaderKind,
    buffer_format: BufferFormat,
    dimensions: Dimensions,
    scales: Scales,
) -> Summary {
    Summary {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "pivfile".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input,
        reader,
        buffer_format,
        dimensions,
        block_count: 0,
        scales,
        missing_scales: Vec::new(),
        attribute_count: 0,
        field: None,
    }
}
