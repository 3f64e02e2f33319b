//! Legacy (IMX/IMG/VEC) header layout.
//!
//! A 256-byte packed record with 16-bit extents, per-axis scale blocks and
//! fixed-width strings. Sizes depend on the header version; the resolved
//! row, column and frame counts are exposed as methods on [`LegacyHeader`].

pub mod layout;
pub mod parser;

pub use parser::{ImageType, LegacyHeader, LegacyScaleFields, parse_legacy_header};
