use std::ops::RangeInclusive;

/// Both header layouts occupy the first 256 bytes.
pub const HEADER_PREFIX_LEN: usize = 256;

/// First-field values that select the Legacy layout (Image_t codes).
pub const LEGACY_IMAGE_TYPES: RangeInclusive<i16> = 18..=23;

pub const PACK_TYPE_UNCOMPRESSED: i16 = 0;
pub const PACK_TYPE_IMX: i16 = 1;
pub const PACK_TYPE_ZLIB: i16 = 2;
pub const PACK_TYPE_FIXED_12: i16 = 3;

pub const IMX_ESCAPE_WORD: i8 = -128;
pub const IMX_ESCAPE_WORDS: i8 = 127;
pub const IMX_ESCAPE_NIBBLES: i8 = -127;
pub const IMX_NIBBLE_END: u8 = 0x08;

/// Upper bound of the deflate expansion ratio.
pub const MAX_DEFLATE_RATIO: usize = 1032;

/// Stored lines per row of a vector buffer, indexed by buffer format.
pub const COMPONENT_COUNTS: [usize; 6] = [1, 9, 2, 10, 3, 14];

pub const BUFFER_FORMAT_MEMPACKWORD: i16 = -2;
pub const BUFFER_FORMAT_WORD: i16 = -4;

/// `{type: i32, size: i32}`
pub const ATTRIBUTE_ITEM_LEN: usize = 8;

pub const ATTR_END: i32 = 0;
pub const ATTR_SCALE_X: i32 = 1;
pub const ATTR_SCALE_Y: i32 = 2;
pub const ATTR_SCALE_Z: i32 = 3;
pub const ATTR_SCALE_I: i32 = 4;
pub const ATTR_COMMENT: i32 = 5;
pub const ATTR_ATTRIBUTE: i32 = 6;
pub const ATTR_SCALE_F: i32 = 7;
pub const ATTR_TIME: i32 = 11;
pub const ATTR_DATE: i32 = 12;
