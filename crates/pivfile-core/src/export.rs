//! PIVMAT-style field export.
//!
//! Builds a serializable field document from the public accessors of a
//! decoded [`Buffer`]. Masked cells serialize as `null`.

use ndarray::{Array2, Axis};
use serde::Serialize;

use crate::decode::Buffer;
use crate::decode::mask::{MaskedArray, apply_mask, disabled_vectors};
use crate::error::PivError;

pub const PIVMAT_VERSION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivmatField {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: f64,
    pub vx: Vec<Vec<Option<f64>>>,
    pub vy: Vec<Vec<Option<f64>>>,
    pub vz: Vec<Vec<Option<f64>>>,
    #[serde(rename = "namex")]
    pub name_x: String,
    #[serde(rename = "namey")]
    pub name_y: String,
    #[serde(rename = "namevx")]
    pub name_vx: String,
    #[serde(rename = "namevy")]
    pub name_vy: String,
    #[serde(rename = "unitx")]
    pub unit_x: String,
    #[serde(rename = "unity")]
    pub unit_y: String,
    #[serde(rename = "unitvx")]
    pub unit_vx: String,
    #[serde(rename = "unitvy")]
    pub unit_vy: String,
    pub ysign: String,
    /// Selector block in file layout, for the extended formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Vec<Vec<f32>>>,
    pub name: String,
    pub setname: String,
    pub source: String,
    pub history: Vec<String>,
    pub pivmat_version: String,
}

/// Build the export document; with `mask_disabled`, vectors with selector 0
/// are written as `null`.
pub fn pivmat_field(buffer: &mut Buffer, mask_disabled: bool) -> Result<PivmatField, PivError> {
    let mask = if mask_disabled {
        disabled_vectors(buffer)?
    } else {
        Array2::from_elem(buffer.vx()?.raw_dim(), false)
    };
    let field = buffer.field()?;
    let masked = apply_mask(&mask, &[&field.vx, &field.vy, &field.vz], &[])?;
    let mut rows = masked.iter().map(MaskedArray::to_rows);
    let (vx, vy, vz) = (
        rows.next().unwrap_or_default(),
        rows.next().unwrap_or_default(),
        rows.next().unwrap_or_default(),
    );

    let format = buffer.buffer_format()?;
    let choice = if format.has_selector() {
        let blocks = buffer.blocks()?;
        let first = blocks.index_axis(Axis(0), 0);
        Some(first.outer_iter().map(|row| row.to_vec()).collect())
    } else {
        None
    };

    let scales = buffer.scales()?.clone();
    let positions = buffer.positions()?.clone();
    let path = buffer.path();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let setname = path
        .parent()
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(PivmatField {
        x: positions.x.to_vec(),
        y: positions.y.to_vec(),
        z: positions.z,
        vx,
        vy,
        vz,
        name_x: "x".to_string(),
        name_y: "y".to_string(),
        name_vx: "vx".to_string(),
        name_vy: "vy".to_string(),
        unit_x: strip_brackets(&scales.x.unit),
        unit_y: strip_brackets(&scales.y.unit),
        unit_vx: scales.i.unit.clone(),
        unit_vy: scales.i.unit.clone(),
        ysign: if scales.y.factor > 0.0 {
            "Y axis downward"
        } else {
            "Y axis upward"
        }
        .to_string(),
        choice,
        name,
        setname,
        source: path.display().to_string(),
        history: Vec::new(),
        pivmat_version: PIVMAT_VERSION.to_string(),
    })
}

fn strip_brackets(unit: &str) -> String {
    unit.trim_matches(|c| c == '[' || c == ']').to_string()
}
