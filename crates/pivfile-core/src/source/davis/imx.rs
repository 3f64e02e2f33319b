//! IMX run-length delta packing.
//!
//! A preview image (`u8` width, `u8` height, then one byte per preview
//! pixel) precedes the pixel stream. Each pixel is stored as a signed
//! difference from the previous one, starting from 0 in byte mode:
//! - `-128`: one absolute little-endian word follows
//! - `127`: a count byte follows, then that many absolute words
//! - `-127`: switch to nibble mode, two signed 4-bit deltas per byte, high
//!   nibble first; a low nibble of `8` switches back to byte mode
//!
//! Pixel values wrap at 16 bits.

use super::error::DavisError;
use super::layout;
use super::reader::{DavisReader, allocate};

const CONTEXT: &str = "IMX data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Byte,
    HighNibble,
    LowNibble,
    Word { remaining: u8 },
}

fn high_nibble(byte: i8) -> i16 {
    i16::from(byte >> 4)
}

fn low_nibble(byte: i8) -> i16 {
    let nibble = i16::from(byte.to_le_bytes()[0] & 0x0F);
    if nibble & 0x08 != 0 { nibble - 16 } else { nibble }
}

/// Decode `samples` word pixels.
pub fn read_imx(reader: &mut DavisReader<'_>, samples: usize) -> Result<Vec<u16>, DavisError> {
    let preview_x = reader.read_u8("IMX preview")?;
    let preview_y = reader.read_u8("IMX preview")?;
    reader.take(usize::from(preview_x) * usize::from(preview_y), "IMX preview")?;
    // Nibble mode is the densest encoding: two pixels per byte.
    reader.require(samples.div_ceil(2), CONTEXT)?;

    let mut pixels = allocate::<u16>(samples)?;
    let mut mode = Mode::Byte;
    let mut last = 0u16;
    let mut byte = 0i8;
    for pixel in pixels.iter_mut() {
        if matches!(mode, Mode::Byte | Mode::HighNibble) {
            byte = reader.read_i8(CONTEXT)?;
        }

        let mut value = last;
        match mode {
            Mode::HighNibble => {
                value = last.wrapping_add_signed(high_nibble(byte));
                mode = Mode::LowNibble;
            }
            Mode::LowNibble => {
                if byte.to_le_bytes()[0] & 0x0F == layout::IMX_NIBBLE_END {
                    mode = Mode::Byte;
                    byte = reader.read_i8(CONTEXT)?;
                } else {
                    value = last.wrapping_add_signed(low_nibble(byte));
                    mode = Mode::HighNibble;
                }
            }
            Mode::Byte | Mode::Word { .. } => {}
        }

        if mode == Mode::Byte {
            match byte {
                layout::IMX_ESCAPE_WORD => mode = Mode::Word { remaining: 1 },
                layout::IMX_ESCAPE_WORDS => {
                    mode = Mode::Word {
                        remaining: reader.read_u8(CONTEXT)?,
                    }
                }
                layout::IMX_ESCAPE_NIBBLES => {
                    byte = reader.read_i8(CONTEXT)?;
                    value = last.wrapping_add_signed(high_nibble(byte));
                    mode = Mode::LowNibble;
                }
                delta => value = last.wrapping_add_signed(i16::from(delta)),
            }
        }

        if let Mode::Word { remaining } = mode {
            value = reader.read_u16_le(CONTEXT)?;
            // A zero count runs for 256 words.
            let remaining = remaining.wrapping_sub(1);
            mode = if remaining == 0 {
                Mode::Byte
            } else {
                Mode::Word { remaining }
            };
        }

        *pixel = value;
        last = value;
    }
    Ok(pixels)
}
