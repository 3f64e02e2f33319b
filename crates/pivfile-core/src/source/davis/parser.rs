use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;

use flate2::read::ZlibDecoder;

use super::error::DavisError;
use super::imx::read_imx;
use super::layout;
use super::reader::{DavisReader, allocate, byte_len, until_nul};
use crate::header::current::{CurrentHeader, parse_current_header};
use crate::header::legacy::{ImageType, LegacyHeader, parse_legacy_header};
use crate::scale::LinearScale;
use crate::source::{AttributeChain, RawBuffer, RawData, RawRecord, RawSource, SourceError};

/// Reads DaVis IM7/VC7/IMX/IMG/VEC files from disk.
///
/// The whole file is loaded, then dispatched on its first header field:
/// Image_t codes select the Legacy layout, anything else the Current one.
#[derive(Debug, Default, Clone, Copy)]
pub struct DavisFileSource;

impl DavisFileSource {
    pub fn new() -> Self {
        Self
    }
}

impl RawSource for DavisFileSource {
    fn read_raw(&self, path: &Path) -> Result<RawRecord, SourceError> {
        let bytes = fs::read(path).map_err(DavisError::Open)?;
        log::debug!("read {} bytes from {}", bytes.len(), path.display());
        Ok(parse_file(&bytes)?)
    }
}

/// Parse a complete file image.
pub fn parse_file(bytes: &[u8]) -> Result<RawRecord, DavisError> {
    if bytes.len() < layout::HEADER_PREFIX_LEN {
        return Err(DavisError::HeaderTooShort {
            needed: layout::HEADER_PREFIX_LEN,
            actual: bytes.len(),
        });
    }
    let prefix = &bytes[..layout::HEADER_PREFIX_LEN];
    let mut reader = DavisReader::new(bytes);
    reader.take(layout::HEADER_PREFIX_LEN, "header")?;

    let first = i16::from_le_bytes([prefix[0], prefix[1]]);
    let buffer = if layout::LEGACY_IMAGE_TYPES.contains(&first) {
        let header = parse_legacy_header(prefix)?;
        read_legacy(&header, &mut reader)?
    } else {
        let header = parse_current_header(prefix)?;
        read_current(&header, &mut reader)?
    };
    let attributes = read_attributes(&mut reader);

    Ok(RawRecord {
        header: prefix.to_vec(),
        buffer,
        attributes,
    })
}

fn extent(value: i32, context: &'static str) -> Result<usize, DavisError> {
    usize::try_from(value).map_err(|_| DavisError::Unsupported { context, value })
}

fn sample_count(nx: usize, lines: &[usize]) -> Result<usize, DavisError> {
    lines
        .iter()
        .try_fold(nx, |acc, n| acc.checked_mul(*n))
        .ok_or(DavisError::Allocation { bytes: usize::MAX })
}

fn read_current(
    header: &CurrentHeader,
    reader: &mut DavisReader<'_>,
) -> Result<RawBuffer, DavisError> {
    if header.is_sparse != 0 {
        return Err(DavisError::Unsupported {
            context: "sparse buffer",
            value: i32::from(header.is_sparse),
        });
    }

    let format = header.buffer_format;
    let nx = extent(header.size_x, "size_x")?;
    let mut ny = extent(header.size_y, "size_y")?;
    let nz = extent(header.size_z, "size_z")?;
    let nf = extent(header.size_f, "size_f")?;
    if format > 0 {
        let count = layout::COMPONENT_COUNTS
            .get(format as usize)
            .copied()
            .ok_or(DavisError::Unsupported {
                context: "buffer format",
                value: i32::from(format),
            })?;
        ny = ny
            .checked_mul(count)
            .ok_or(DavisError::Allocation { bytes: usize::MAX })?;
    }
    let is_float =
        format != layout::BUFFER_FORMAT_WORD && format != layout::BUFFER_FORMAT_MEMPACKWORD;
    let samples = sample_count(nx, &[ny, nz, nf])?;
    log::debug!(
        "current header: format {}, pack type {}, {}x{}x{}x{}",
        format,
        header.pack_type,
        nx,
        ny,
        nz,
        nf
    );

    let data = match header.pack_type {
        layout::PACK_TYPE_UNCOMPRESSED => {
            let bytes_per_pixel = format == layout::BUFFER_FORMAT_MEMPACKWORD;
            read_uncompressed(reader, samples, is_float, bytes_per_pixel)?
        }
        layout::PACK_TYPE_ZLIB => read_zlib(reader, samples, is_float)?,
        layout::PACK_TYPE_FIXED_12 if !is_float => read_fixed_12(reader, nx, samples)?,
        layout::PACK_TYPE_IMX if !is_float => RawData::Word(read_imx(reader, samples)?),
        other => {
            return Err(DavisError::Unsupported {
                context: "pack type",
                value: i32::from(other),
            });
        }
    };

    Ok(RawBuffer::new(
        nx,
        ny,
        nz,
        nf,
        i32::from(header.vector_grid),
        i32::from(format),
        data,
    ))
}

fn read_legacy(
    header: &LegacyHeader,
    reader: &mut DavisReader<'_>,
) -> Result<RawBuffer, DavisError> {
    if header.image_type.is_sparse() {
        return Err(DavisError::Unsupported {
            context: "sparse image type",
            value: i32::from(header.image_type.code()),
        });
    }
    let nx = extent(header.resolved_columns(), "columns")?;
    let ny = extent(header.frame_rows(), "rows")?;
    let nz = extent(header.depth(), "z dimension")?;
    let nf = extent(header.frame_count(), "frame count")?;
    let samples = sample_count(nx, &[ny, nz, nf])?;
    log::debug!(
        "legacy header: version {}, image type {:?}, {}x{}x{}x{}",
        header.version,
        header.image_type,
        nx,
        ny,
        nz,
        nf
    );

    let data = if header.image_type == ImageType::Imx {
        RawData::Word(read_imx(reader, samples)?)
    } else {
        read_uncompressed(reader, samples, header.is_float(), false)?
    };
    let mut buffer = RawBuffer::new(
        nx,
        ny,
        nz,
        nf,
        i32::from(header.vector_grid),
        i32::from(header.image_sub_type),
        data,
    );
    buffer.scale_x = LinearScale::new(header.x.a, header.x.b, &header.x.dim, &header.x.units);
    buffer.scale_y = LinearScale::new(header.y.a, header.y.b, &header.y.dim, &header.y.units);
    buffer.scale_i = LinearScale::new(header.i.a, header.i.b, &header.i.dim, &header.i.units);
    Ok(buffer)
}

fn read_uncompressed(
    reader: &mut DavisReader<'_>,
    samples: usize,
    is_float: bool,
    bytes_per_pixel: bool,
) -> Result<RawData, DavisError> {
    let width = match (is_float, bytes_per_pixel) {
        (true, _) => 4,
        (false, true) => 1,
        (false, false) => 2,
    };
    reader.require(byte_len(samples, width)?, "pixel data")?;
    if is_float {
        let mut values = allocate::<f32>(samples)?;
        reader.read_floats(&mut values, "float data")?;
        Ok(RawData::Float(values))
    } else {
        let mut values = allocate::<u16>(samples)?;
        if bytes_per_pixel {
            reader.read_byte_words(&mut values, "byte data")?;
        } else {
            reader.read_words(&mut values, "word data")?;
        }
        Ok(RawData::Word(values))
    }
}

fn read_zlib(
    reader: &mut DavisReader<'_>,
    samples: usize,
    is_float: bool,
) -> Result<RawData, DavisError> {
    let source_len = reader.read_i32_le("compressed length")?;
    let source_len = usize::try_from(source_len).map_err(|_| DavisError::Corrupt {
        context: "compressed length",
        message: format!("negative length {source_len}"),
    })?;
    let source = reader.take(source_len, "compressed data")?;

    let width = if is_float { 4 } else { 2 };
    let needed = byte_len(samples, width)?;
    if needed / layout::MAX_DEFLATE_RATIO > source.len() {
        return Err(DavisError::Truncated {
            context: "zlib stream",
            needed,
            actual: source.len().saturating_mul(layout::MAX_DEFLATE_RATIO),
        });
    }
    let mut output = allocate::<u8>(needed)?;
    let mut decoder = ZlibDecoder::new(source);
    if let Err(err) = decoder.read_exact(&mut output) {
        return Err(match err.kind() {
            ErrorKind::UnexpectedEof => DavisError::Truncated {
                context: "zlib stream",
                needed: output.len(),
                actual: decoder.total_out() as usize,
            },
            _ => DavisError::Corrupt {
                context: "zlib stream",
                message: err.to_string(),
            },
        });
    }

    if is_float {
        let mut values = allocate::<f32>(samples)?;
        DavisReader::new(&output).read_floats(&mut values, "float data")?;
        Ok(RawData::Float(values))
    } else {
        let mut values = allocate::<u16>(samples)?;
        DavisReader::new(&output).read_words(&mut values, "word data")?;
        Ok(RawData::Word(values))
    }
}

/// 12-bit packing: three words carry four pixels; a row tail shorter than
/// four pixels is stored as plain words.
fn read_fixed_12(
    reader: &mut DavisReader<'_>,
    nx: usize,
    samples: usize,
) -> Result<RawData, DavisError> {
    if nx == 0 {
        return Ok(RawData::Word(Vec::new()));
    }
    let words_per_row = nx / 4 * 3 + nx % 4;
    let words = (samples / nx)
        .checked_mul(words_per_row)
        .ok_or(DavisError::Allocation { bytes: usize::MAX })?;
    reader.require(byte_len(words, 2)?, "12-bit data")?;
    let mut values = allocate::<u16>(samples)?;
    for row in values.chunks_exact_mut(nx) {
        let mut groups = row.chunks_exact_mut(4);
        for pixels in &mut groups {
            let mut packed = [0u16; 3];
            reader.read_words(&mut packed, "12-bit data")?;
            let [a0, a1, a2] = packed;
            pixels[0] = a0 & 0x0FFF;
            pixels[1] = (a0 >> 12) | ((a1 & 0x00FF) << 4);
            pixels[2] = ((a1 & 0xFF00) >> 8) | ((a2 & 0x000F) << 8);
            pixels[3] = a2 >> 4;
        }
        let tail = groups.into_remainder();
        reader.read_words(tail, "12-bit data")?;
    }
    Ok(RawData::Word(values))
}

/// Read the attribute trailer. A truncated item ends the list.
fn read_attributes(reader: &mut DavisReader<'_>) -> AttributeChain {
    let mut chain = AttributeChain::new();
    while reader.remaining() >= layout::ATTRIBUTE_ITEM_LEN {
        let (Ok(kind), Ok(size)) = (reader.read_i32_le("item type"), reader.read_i32_le("item size"))
        else {
            break;
        };
        let Ok(size) = usize::try_from(size) else {
            continue;
        };
        if size == 0 {
            continue;
        }
        let Ok(data) = reader.take(size, "attribute data") else {
            log::debug!("attribute item of {} bytes truncated at {}", size, reader.position());
            break;
        };

        match kind {
            layout::ATTR_END => {}
            layout::ATTR_SCALE_X
            | layout::ATTR_SCALE_Y
            | layout::ATTR_SCALE_Z
            | layout::ATTR_SCALE_I
            | layout::ATTR_SCALE_F => {
                let name = match kind {
                    layout::ATTR_SCALE_X => "_SCALE_X",
                    layout::ATTR_SCALE_Y => "_SCALE_Y",
                    layout::ATTR_SCALE_Z => "_SCALE_Z",
                    layout::ATTR_SCALE_I => "_SCALE_I",
                    _ => "_SCALE_F",
                };
                chain.push_front(name, null_to_break(data));
            }
            layout::ATTR_COMMENT => chain.push_front("_COMMENT", until_nul(data)),
            layout::ATTR_TIME => chain.push_front("_TIME", until_nul(data)),
            layout::ATTR_DATE => chain.push_front("_DATE", until_nul(data)),
            layout::ATTR_ATTRIBUTE => {
                let text = until_nul(data);
                if let Some((name, value)) = text.split_once('=') {
                    chain.push_front(name, value);
                }
            }
            other => log::debug!("skipping attribute item type {}", other),
        }
    }
    chain
}

fn null_to_break(data: &[u8]) -> String {
    let text: Vec<u8> = data
        .iter()
        .map(|b| if *b == 0 { b'\n' } else { *b })
        .collect();
    String::from_utf8_lossy(&text).into_owned()
}
