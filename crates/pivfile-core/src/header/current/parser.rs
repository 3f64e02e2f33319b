use serde::Serialize;

use super::layout;
use crate::header::error::HeaderError;
use crate::header::reader::HeaderReader;

/// Header of IM7/VC7 files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentHeader {
    pub version: i16,
    pub pack_type: i16,
    pub buffer_format: i16,
    pub is_sparse: i16,
    pub size_x: i32,
    pub size_y: i32,
    pub size_z: i32,
    pub size_f: i32,
    pub scalar_n: i16,
    pub vector_grid: i16,
    pub extra_flags: i16,
}

pub fn parse_current_header(prefix: &[u8]) -> Result<CurrentHeader, HeaderError> {
    let reader = HeaderReader::new(prefix);
    reader.require_len(layout::MIN_LEN)?;

    Ok(CurrentHeader {
        version: reader.read_i16_le(layout::VERSION_RANGE)?,
        pack_type: reader.read_i16_le(layout::PACK_TYPE_RANGE)?,
        buffer_format: reader.read_i16_le(layout::BUFFER_FORMAT_RANGE)?,
        is_sparse: reader.read_i16_le(layout::IS_SPARSE_RANGE)?,
        size_x: reader.read_i32_le(layout::SIZE_X_RANGE)?,
        size_y: reader.read_i32_le(layout::SIZE_Y_RANGE)?,
        size_z: reader.read_i32_le(layout::SIZE_Z_RANGE)?,
        size_f: reader.read_i32_le(layout::SIZE_F_RANGE)?,
        scalar_n: reader.read_i16_le(layout::SCALAR_N_RANGE)?,
        vector_grid: reader.read_i16_le(layout::VECTOR_GRID_RANGE)?,
        extra_flags: reader.read_i16_le(layout::EXTRA_FLAGS_RANGE)?,
    })
}
