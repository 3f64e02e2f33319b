#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;

pub const HEADER_LEN: usize = 256;

pub const ATTR_SCALE_X: i32 = 1;
pub const ATTR_SCALE_Y: i32 = 2;
pub const ATTR_SCALE_I: i32 = 4;
pub const ATTR_COMMENT: i32 = 5;
pub const ATTR_ATTRIBUTE: i32 = 6;
pub const ATTR_TIME: i32 = 11;

/// Builder for Current-layout (IM7/VC7) files.
pub struct CurrentFile {
    header: Vec<u8>,
    body: Vec<u8>,
    trailer: Vec<u8>,
}

impl CurrentFile {
    pub fn new(format: i16, pack_type: i16, nx: i32, ny: i32) -> Self {
        let mut header = vec![0u8; HEADER_LEN];
        header[0..2].copy_from_slice(&1i16.to_le_bytes());
        header[2..4].copy_from_slice(&pack_type.to_le_bytes());
        header[4..6].copy_from_slice(&format.to_le_bytes());
        header[8..12].copy_from_slice(&nx.to_le_bytes());
        header[12..16].copy_from_slice(&ny.to_le_bytes());
        header[16..20].copy_from_slice(&1i32.to_le_bytes());
        header[20..24].copy_from_slice(&1i32.to_le_bytes());
        header[26..28].copy_from_slice(&1i16.to_le_bytes());
        Self {
            header,
            body: Vec::new(),
            trailer: Vec::new(),
        }
    }

    pub fn frames(mut self, nf: i32) -> Self {
        self.header[20..24].copy_from_slice(&nf.to_le_bytes());
        self
    }

    pub fn vector_grid(mut self, grid: i16) -> Self {
        self.header[26..28].copy_from_slice(&grid.to_le_bytes());
        self
    }

    pub fn floats(mut self, values: &[f32]) -> Self {
        for v in values {
            self.body.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    pub fn words(mut self, values: &[u16]) -> Self {
        for v in values {
            self.body.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    /// Append bytes to the body as they are, e.g. an IMX stream.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Replace the body with its zlib stream, prefixed by the stream length.
    pub fn deflate(mut self) -> Self {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.body).expect("deflate body");
        let compressed = encoder.finish().expect("finish deflate");
        self.body = (compressed.len() as i32).to_le_bytes().to_vec();
        self.body.extend_from_slice(&compressed);
        self
    }

    pub fn item(mut self, kind: i32, data: &[u8]) -> Self {
        self.trailer.extend_from_slice(&kind.to_le_bytes());
        self.trailer
            .extend_from_slice(&(data.len() as i32).to_le_bytes());
        self.trailer.extend_from_slice(data);
        self
    }

    pub fn scale(self, kind: i32, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        self.item(kind, &data)
    }

    pub fn attribute(self, name: &str, value: &str) -> Self {
        let mut data = format!("{name}={value}").into_bytes();
        data.push(0);
        self.item(ATTR_ATTRIBUTE, &data)
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = self.header.clone();
        bytes.extend_from_slice(&self.body);
        bytes.extend_from_slice(&self.trailer);
        bytes
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.bytes()).expect("write fixture");
        path
    }
}

fn legacy_header(image_type: i16, rows: i16, columns: i16) -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_LEN];
    bytes[0..2].copy_from_slice(&image_type.to_le_bytes());
    bytes[10..12].copy_from_slice(&rows.to_le_bytes());
    bytes[12..14].copy_from_slice(&columns.to_le_bytes());
    bytes[18..20].copy_from_slice(&1i16.to_le_bytes());
    bytes[20..22].copy_from_slice(&1i16.to_le_bytes());
    bytes[33] = 60;
    bytes[54..58].copy_from_slice(&0.25f32.to_le_bytes());
    bytes[62..63].copy_from_slice(b"x");
    bytes[73..75].copy_from_slice(b"mm");
    bytes[86..90].copy_from_slice(&1f32.to_le_bytes());
    bytes[118..122].copy_from_slice(&1f32.to_le_bytes());
    bytes[236..240].copy_from_slice(&1i32.to_le_bytes());
    bytes
}

/// Legacy (IMX-era) word image with an x scale in the header.
pub fn legacy_image(rows: i16, columns: i16, pixels: &[u16]) -> Vec<u8> {
    let mut bytes = legacy_header(18, rows, columns);
    for v in pixels {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Legacy image packed with IMX run-length deltas; `stream` starts with the
/// preview size bytes.
pub fn legacy_imx(rows: i16, columns: i16, stream: &[u8]) -> Vec<u8> {
    let mut bytes = legacy_header(19, rows, columns);
    bytes.extend_from_slice(stream);
    bytes
}
