//! Current (IM7/VC7) header layout.
//!
//! A flat little-endian record: version, packing, buffer format, sparse flag,
//! four 32-bit extents, scalar count, vector grid and extra flags. Offsets
//! live in `layout`.

pub mod layout;
pub mod parser;

pub use parser::{CurrentHeader, parse_current_header};
