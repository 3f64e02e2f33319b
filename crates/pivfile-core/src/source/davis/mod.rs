//! DaVis file reader.
//!
//! Loads a file, decodes its data block and attribute trailer into a
//! [`crate::source::RawRecord`]. Current files support uncompressed, IMX,
//! zlib and 12-bit packed data; Legacy files support uncompressed word and
//! float images and IMX packed words. Byte offsets and codes live in
//! `layout`, cursor helpers in `reader`.
//!
//! Sizes taken from the header are checked against the bytes left in the
//! file before any sample buffer is allocated.

pub mod error;
mod imx;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::DavisFileSource;
