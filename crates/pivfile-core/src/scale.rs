use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Maximum stored length of scale descriptions and units, in bytes.
pub const SCALE_TEXT_LEN: usize = 16;

/// Affine transform from array index (or raw value) to physical units.
///
/// A negative `factor` marks an inverted physical axis.
///
/// # Examples
/// ```
/// use pivfile_core::LinearScale;
///
/// let scale = LinearScale::new(2.0, 10.0, "x", "mm");
/// assert_eq!(scale.apply(&[0.0, 1.0, 2.0], 1.0), vec![10.0, 12.0, 14.0]);
/// assert_eq!(scale.label(), "x mm");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub factor: f32,
    pub offset: f32,
    pub description: String,
    pub unit: String,
}

impl LinearScale {
    /// Build a scale, truncating `description` and `unit` to
    /// [`SCALE_TEXT_LEN`] bytes.
    pub fn new(factor: f32, offset: f32, description: &str, unit: &str) -> Self {
        Self {
            factor,
            offset,
            description: truncate_text(description, SCALE_TEXT_LEN),
            unit: truncate_text(unit, SCALE_TEXT_LEN),
        }
    }

    pub fn identity(unit: &str) -> Self {
        Self::new(1.0, 0.0, "", unit)
    }

    pub fn is_inverted(&self) -> bool {
        self.factor < 0.0
    }

    /// `offset + value * factor * grid`
    pub fn apply_value(&self, value: f64, grid: f64) -> f64 {
        f64::from(self.offset) + value * f64::from(self.factor) * grid
    }

    pub fn apply(&self, values: &[f64], grid: f64) -> Vec<f64> {
        values.iter().map(|v| self.apply_value(*v, grid)).collect()
    }

    pub fn apply_array(&self, values: &Array2<f64>, grid: f64) -> Array2<f64> {
        values.mapv(|v| self.apply_value(v, grid))
    }

    /// Scaled cell centers `0.5, 1.5, ..., count - 0.5`.
    pub fn centers(&self, count: usize, grid: f64) -> Array1<f64> {
        Array1::from_iter((0..count).map(|i| self.apply_value(i as f64 + 0.5, grid)))
    }

    /// Axis label in the form `description unit`, skipping empty parts.
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [self.description.as_str(), self.unit.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        parts.join(" ")
    }
}

impl fmt::Display for LinearScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.description.is_empty() {
            write!(f, "{} ", self.description)?;
        }
        write!(f, "({:.3}) + n * ({:.3})", self.offset, self.factor)?;
        if !self.unit.is_empty() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

/// Truncate to at most `max_bytes`, never splitting a character.
pub(crate) fn truncate_text(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::{LinearScale, truncate_text};

    #[test]
    fn apply_matches_affine_transform() {
        let scale = LinearScale::new(2.0, 10.0, "", "");
        assert_eq!(scale.apply(&[0.0, 1.0, 2.0], 1.0), vec![10.0, 12.0, 14.0]);
        assert_eq!(scale.apply_value(1.0, 4.0), 18.0);
    }

    #[test]
    fn centers_start_at_half_cell() {
        let scale = LinearScale::new(1.0, 0.0, "", "pixel");
        let centers = scale.centers(3, 2.0);
        assert_eq!(centers.to_vec(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn text_fields_are_truncated() {
        let scale = LinearScale::new(1.0, 0.0, "a very long description", "millimetres-per-second");
        assert_eq!(scale.description.len(), 16);
        assert_eq!(scale.unit, "millimetres-per-");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_text("ééééééééé", 5), "éé");
        assert_eq!(truncate_text("mm", 16), "mm");
    }

    #[test]
    fn negative_factor_is_inverted() {
        assert!(LinearScale::new(-0.5, 0.0, "", "").is_inverted());
        assert!(!LinearScale::identity("pixel").is_inverted());
    }

    #[test]
    fn display_and_label() {
        let scale = LinearScale::new(0.25, -1.0, "y", "mm");
        assert_eq!(scale.to_string(), "y (-1.000) + n * (0.250) mm");
        assert_eq!(LinearScale::identity("counts").label(), "counts");
    }
}
