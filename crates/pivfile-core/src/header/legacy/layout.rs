use std::ops::Range;

/// Full Legacy header record.
pub const HEADER_LEN: usize = 256;

pub const IMAGE_TYPE_RANGE: Range<usize> = 0..2;
pub const X_START_RANGE: Range<usize> = 2..4;
pub const Y_START_RANGE: Range<usize> = 4..6;
pub const ROWS_RANGE: Range<usize> = 10..12;
pub const COLUMNS_RANGE: Range<usize> = 12..14;
pub const IMAGE_SUB_TYPE_RANGE: Range<usize> = 14..16;
pub const Y_DIM_RANGE: Range<usize> = 16..18;
pub const F_DIM_RANGE: Range<usize> = 18..20;
pub const VECTOR_GRID_RANGE: Range<usize> = 20..22;
pub const VERSION_OFFSET: usize = 33;
pub const DATE_RANGE: Range<usize> = 34..43;
pub const TIME_RANGE: Range<usize> = 43..52;

/// Offsets of one axis scale block (`init`, `a`, `b`, `dim`, `units`).
pub struct ScaleLayout {
    pub init: Range<usize>,
    pub factor: Range<usize>,
    pub offset: Range<usize>,
    pub dim: Range<usize>,
    pub units: Range<usize>,
}

pub const X_SCALE: ScaleLayout = ScaleLayout {
    init: 52..54,
    factor: 54..58,
    offset: 58..62,
    dim: 62..73,
    units: 73..84,
};

pub const Y_SCALE: ScaleLayout = ScaleLayout {
    init: 84..86,
    factor: 86..90,
    offset: 90..94,
    dim: 94..105,
    units: 105..116,
};

pub const I_SCALE: ScaleLayout = ScaleLayout {
    init: 116..118,
    factor: 118..122,
    offset: 122..126,
    dim: 126..137,
    units: 137..148,
};

pub const COMMENT1_RANGE: Range<usize> = 148..188;
pub const COMMENT2_RANGE: Range<usize> = 188..228;
pub const LONG_ROWS_RANGE: Range<usize> = 228..232;
pub const LONG_COLUMNS_RANGE: Range<usize> = 232..236;
pub const LONG_Z_DIM_RANGE: Range<usize> = 236..240;

/// Versions from here on store `f_dim` as frame count.
pub const VERSION_EXT_HEADER: u8 = 54;
/// Versions from here on store `long_z_dim` as volume depth.
pub const VERSION_VOLUME_BUFFER: u8 = 55;
/// Versions at or above this are the old 1.x/2.x numbering.
pub const VERSION_OLD_NUMBERING: u8 = 100;
/// Old versions below this have a fixed image size.
pub const VERSION_FIXED_SIZE_END: u8 = 210;
pub const FIXED_SIZE_COLUMNS: i32 = 384;
pub const FIXED_SIZE_ROWS: i32 = 286;
