use serde::Serialize;

use super::layout::{self, ScaleLayout};
use crate::header::error::HeaderError;
use crate::header::reader::HeaderReader;

/// Image type codes stored in the first Legacy header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Img,
    Imx,
    Float,
    SparseWord,
    SparseFloat,
    PackedWord,
}

impl ImageType {
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            18 => Some(ImageType::Img),
            19 => Some(ImageType::Imx),
            20 => Some(ImageType::Float),
            21 => Some(ImageType::SparseWord),
            22 => Some(ImageType::SparseFloat),
            23 => Some(ImageType::PackedWord),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            ImageType::Img => 18,
            ImageType::Imx => 19,
            ImageType::Float => 20,
            ImageType::SparseWord => 21,
            ImageType::SparseFloat => 22,
            ImageType::PackedWord => 23,
        }
    }

    pub fn is_sparse(self) -> bool {
        matches!(self, ImageType::SparseWord | ImageType::SparseFloat)
    }
}

/// Raw scale fields of one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyScaleFields {
    pub init: i16,
    pub a: f32,
    pub b: f32,
    pub dim: String,
    pub units: String,
}

/// Header of IMX/IMG/VEC files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyHeader {
    pub image_type: ImageType,
    pub x_start: i16,
    pub y_start: i16,
    pub rows: i16,
    pub columns: i16,
    pub image_sub_type: i16,
    pub y_dim: i16,
    pub f_dim: i16,
    pub vector_grid: i16,
    pub version: u8,
    pub date: String,
    pub time: String,
    pub x: LegacyScaleFields,
    pub y: LegacyScaleFields,
    pub i: LegacyScaleFields,
    pub comment1: String,
    pub comment2: String,
    pub long_rows: i32,
    pub long_columns: i32,
    pub long_z_dim: i32,
}

impl LegacyHeader {
    fn is_old_numbering(&self) -> bool {
        self.version >= layout::VERSION_OLD_NUMBERING
    }

    fn has_fixed_size(&self) -> bool {
        self.version > 99 && self.version < layout::VERSION_FIXED_SIZE_END
    }

    /// Stored row count: all frames stacked, long field when `rows == -1`.
    pub fn resolved_rows(&self) -> i32 {
        if self.has_fixed_size() {
            layout::FIXED_SIZE_ROWS
        } else if self.rows == -1 {
            self.long_rows
        } else {
            i32::from(self.rows)
        }
    }

    pub fn resolved_columns(&self) -> i32 {
        if self.has_fixed_size() {
            layout::FIXED_SIZE_COLUMNS
        } else if self.columns == -1 {
            self.long_columns
        } else {
            i32::from(self.columns)
        }
    }

    pub fn frame_count(&self) -> i32 {
        if self.version >= layout::VERSION_EXT_HEADER && !self.is_old_numbering() {
            i32::from(self.f_dim)
        } else {
            1
        }
    }

    pub fn depth(&self) -> i32 {
        if self.version >= layout::VERSION_VOLUME_BUFFER && !self.is_old_numbering() {
            self.long_z_dim
        } else {
            1
        }
    }

    /// Rows of one frame. Versions that predate volume buffers stack frames
    /// into the row count.
    pub fn frame_rows(&self) -> i32 {
        let rows = self.resolved_rows();
        let frames = self.frame_count();
        if (self.version < layout::VERSION_VOLUME_BUFFER || self.is_old_numbering()) && frames > 0
        {
            rows / frames
        } else {
            rows
        }
    }

    pub fn is_float(&self) -> bool {
        self.image_type == ImageType::Float
    }
}

pub fn parse_legacy_header(prefix: &[u8]) -> Result<LegacyHeader, HeaderError> {
    let reader = HeaderReader::new(prefix);
    reader.require_len(layout::HEADER_LEN)?;

    let code = reader.read_i16_le(layout::IMAGE_TYPE_RANGE)?;
    let image_type = ImageType::from_code(code).ok_or(HeaderError::UnknownImageType { value: code })?;

    Ok(LegacyHeader {
        image_type,
        x_start: reader.read_i16_le(layout::X_START_RANGE)?,
        y_start: reader.read_i16_le(layout::Y_START_RANGE)?,
        rows: reader.read_i16_le(layout::ROWS_RANGE)?,
        columns: reader.read_i16_le(layout::COLUMNS_RANGE)?,
        image_sub_type: reader.read_i16_le(layout::IMAGE_SUB_TYPE_RANGE)?,
        y_dim: reader.read_i16_le(layout::Y_DIM_RANGE)?,
        f_dim: reader.read_i16_le(layout::F_DIM_RANGE)?,
        vector_grid: reader.read_i16_le(layout::VECTOR_GRID_RANGE)?,
        version: reader.read_u8(layout::VERSION_OFFSET)?,
        date: reader.read_c_string(layout::DATE_RANGE)?,
        time: reader.read_c_string(layout::TIME_RANGE)?,
        x: read_scale(&reader, &layout::X_SCALE)?,
        y: read_scale(&reader, &layout::Y_SCALE)?,
        i: read_scale(&reader, &layout::I_SCALE)?,
        comment1: reader.read_c_string(layout::COMMENT1_RANGE)?,
        comment2: reader.read_c_string(layout::COMMENT2_RANGE)?,
        long_rows: reader.read_i32_le(layout::LONG_ROWS_RANGE)?,
        long_columns: reader.read_i32_le(layout::LONG_COLUMNS_RANGE)?,
        long_z_dim: reader.read_i32_le(layout::LONG_Z_DIM_RANGE)?,
    })
}

fn read_scale(reader: &HeaderReader<'_>, fields: &ScaleLayout) -> Result<LegacyScaleFields, HeaderError> {
    Ok(LegacyScaleFields {
        init: reader.read_i16_le(fields.init.clone())?,
        a: reader.read_f32_le(fields.factor.clone())?,
        b: reader.read_f32_le(fields.offset.clone())?,
        dim: reader.read_c_string(fields.dim.clone())?,
        units: reader.read_c_string(fields.units.clone())?,
    })
}
