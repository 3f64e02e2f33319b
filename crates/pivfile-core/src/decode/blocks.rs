use ndarray::Array3;

use crate::error::PivError;
use crate::header::{BufferFormat, ReaderKind};
use crate::source::RawBuffer;

/// Flat data reshaped into `(blocks, ny, nx)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmented {
    pub blocks: Array3<f32>,
    /// Rows per block, when a vector reshape recomputed it.
    pub ny: Option<usize>,
}

/// Number of blocks the flat buffer splits into.
pub fn block_count(raw: &RawBuffer, format: BufferFormat, kind: ReaderKind) -> usize {
    if kind == ReaderKind::Legacy || format == BufferFormat::Image {
        raw.nf
    } else if let Some(count) = format.vector_block_count() {
        count
    } else {
        raw.nf * raw.nz
    }
}

pub fn segment(
    raw: &RawBuffer,
    format: BufferFormat,
    kind: ReaderKind,
) -> Result<Segmented, PivError> {
    let expected = raw.total_lines * raw.nx;
    if raw.data.len() != expected {
        return Err(PivError::Data(format!(
            "buffer holds {} samples, header implies {} ({} lines of {})",
            raw.data.len(),
            expected,
            raw.total_lines,
            raw.nx
        )));
    }

    let count = block_count(raw, format, kind);
    let (rows, recomputed) = if kind == ReaderKind::Legacy || format == BufferFormat::Image {
        (raw.ny, None)
    } else if format.is_vector() {
        if count == 0 || raw.total_lines % count != 0 {
            return Err(PivError::Format(format!(
                "{} lines do not split into {} blocks",
                raw.total_lines, count
            )));
        }
        let rows = raw.total_lines / count;
        (rows, Some(rows))
    } else {
        (raw.ny, None)
    };
    if count * rows != raw.total_lines {
        return Err(PivError::Format(format!(
            "{} blocks of {} lines do not cover {} lines",
            count, rows, raw.total_lines
        )));
    }

    let blocks = Array3::from_shape_vec((count, rows, raw.nx), raw.data.to_f32_vec())
        .map_err(|err| PivError::Format(err.to_string()))?;
    log::debug!("segmented {:?} buffer into {:?}", format, blocks.shape());
    Ok(Segmented {
        blocks,
        ny: recomputed,
    })
}
