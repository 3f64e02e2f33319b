use std::ops::Range;

/// Bytes needed to decode every Current header field.
pub const MIN_LEN: usize = 30;

pub const VERSION_RANGE: Range<usize> = 0..2;
pub const PACK_TYPE_RANGE: Range<usize> = 2..4;
pub const BUFFER_FORMAT_RANGE: Range<usize> = 4..6;
pub const IS_SPARSE_RANGE: Range<usize> = 6..8;
pub const SIZE_X_RANGE: Range<usize> = 8..12;
pub const SIZE_Y_RANGE: Range<usize> = 12..16;
pub const SIZE_Z_RANGE: Range<usize> = 16..20;
pub const SIZE_F_RANGE: Range<usize> = 20..24;
pub const SCALAR_N_RANGE: Range<usize> = 24..26;
pub const VECTOR_GRID_RANGE: Range<usize> = 26..28;
pub const EXTRA_FLAGS_RANGE: Range<usize> = 28..30;
