use serde::{Deserialize, Serialize};

use crate::error::PivError;
use crate::header::{Header, LegacyScaleFields};
use crate::scale::LinearScale;
use crate::source::{AttributeMap, RawBuffer};

/// Axes that carry a linear scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleAxis {
    X,
    Y,
    I,
}

impl ScaleAxis {
    pub const ALL: [ScaleAxis; 3] = [ScaleAxis::X, ScaleAxis::Y, ScaleAxis::I];

    pub fn attribute_key(self) -> &'static str {
        match self {
            ScaleAxis::X => "_SCALE_X",
            ScaleAxis::Y => "_SCALE_Y",
            ScaleAxis::I => "_SCALE_I",
        }
    }
}

/// The X, Y and intensity scales of one buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scales {
    pub x: LinearScale,
    pub y: LinearScale,
    pub i: LinearScale,
}

impl Scales {
    pub fn get(&self, axis: ScaleAxis) -> &LinearScale {
        match axis {
            ScaleAxis::X => &self.x,
            ScaleAxis::Y => &self.y,
            ScaleAxis::I => &self.i,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScales {
    pub scales: Scales,
    /// Axes without a scale attribute; identity was substituted.
    pub missing: Vec<ScaleAxis>,
}

/// Resolve scales from the header (Legacy) or the attribute map (Current).
pub fn resolve_scales(
    header: &Header,
    raw: &RawBuffer,
    attributes: &AttributeMap,
) -> Result<ResolvedScales, PivError> {
    match header {
        Header::Legacy(legacy) => {
            log::info!("setting scales from header");
            let scale = |fields: &LegacyScaleFields| {
                LinearScale::new(fields.a, fields.b, &fields.dim, &fields.units)
            };
            Ok(ResolvedScales {
                scales: Scales {
                    x: scale(&legacy.x),
                    y: scale(&legacy.y),
                    i: scale(&legacy.i),
                },
                missing: Vec::new(),
            })
        }
        Header::Current { .. } => {
            log::info!("setting scales from attributes");
            let mut missing = Vec::new();
            let mut resolve = |axis: ScaleAxis, fallback: &LinearScale| -> Result<LinearScale, PivError> {
                let key = axis.attribute_key();
                match attributes.get(key) {
                    Some(value) => {
                        let scale = parse_scale_attribute(key, value)?;
                        log::info!("scale {:?}: {}", axis, scale);
                        Ok(scale)
                    }
                    None => {
                        log::warn!("{} not in attribute list", key);
                        missing.push(axis);
                        Ok(LinearScale::new(1.0, 0.0, &fallback.description, &fallback.unit))
                    }
                }
            };
            let x = resolve(ScaleAxis::X, &raw.scale_x)?;
            let y = resolve(ScaleAxis::Y, &raw.scale_y)?;
            let i = resolve(ScaleAxis::I, &raw.scale_i)?;
            Ok(ResolvedScales {
                scales: Scales { x, y, i },
                missing,
            })
        }
    }
}

/// Parse `"factor offset unit description"`, whitespace or newline
/// delimited. Missing unit or description are left empty.
///
/// # Examples
/// ```
/// use pivfile_core::parse_scale_attribute;
///
/// let scale = parse_scale_attribute("_SCALE_X", "0.5 -2\nmm\nx position\n").unwrap();
/// assert_eq!(scale.factor, 0.5);
/// assert_eq!(scale.offset, -2.0);
/// assert_eq!(scale.unit, "mm");
/// assert_eq!(scale.description, "x position");
/// ```
pub fn parse_scale_attribute(key: &str, value: &str) -> Result<LinearScale, PivError> {
    let invalid = || PivError::InvalidScale {
        key: key.to_string(),
        value: value.to_string(),
    };
    let text = value.strip_suffix('\n').unwrap_or(value);
    let mut tokens = text.split_whitespace();
    let factor: f32 = tokens
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(invalid)?;
    let offset: f32 = tokens
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(invalid)?;
    let unit = tokens.next().unwrap_or("");
    let description = tokens.collect::<Vec<_>>().join(" ");
    Ok(LinearScale::new(factor, offset, &description, unit))
}
