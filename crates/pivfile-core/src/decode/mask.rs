use ndarray::{Array2, Axis};

use super::Buffer;
use super::components::{selectors, to_physical_layout};
use crate::error::PivError;

/// A field with a boolean mask; `true` marks an invalid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    pub data: Array2<f64>,
    pub mask: Array2<bool>,
}

impl MaskedArray {
    pub fn new(data: Array2<f64>, mask: Array2<bool>) -> Result<Self, PivError> {
        if data.shape() != mask.shape() {
            return Err(PivError::Shape {
                expected: data.shape().to_vec(),
                actual: mask.shape().to_vec(),
            });
        }
        Ok(Self { data, mask })
    }

    pub fn get(&self, index: (usize, usize)) -> Option<f64> {
        match self.mask.get(index) {
            Some(false) => self.data.get(index).copied(),
            _ => None,
        }
    }

    pub fn count_valid(&self) -> usize {
        self.mask.iter().filter(|masked| !**masked).count()
    }

    /// Row-major nested rows, masked cells as `None`.
    pub fn to_rows(&self) -> Vec<Vec<Option<f64>>> {
        self.data
            .outer_iter()
            .zip(self.mask.outer_iter())
            .map(|(values, masks)| {
                values
                    .iter()
                    .zip(masks.iter())
                    .map(|(value, masked)| if *masked { None } else { Some(*value) })
                    .collect()
            })
            .collect()
    }
}

/// Mask `fields` and `extras` with the same predicate result.
///
/// Every array must have the mask's shape.
pub fn apply_mask(
    mask: &Array2<bool>,
    fields: &[&Array2<f64>],
    extras: &[Array2<f64>],
) -> Result<Vec<MaskedArray>, PivError> {
    let expected = fields
        .first()
        .map(|field| field.shape().to_vec())
        .unwrap_or_else(|| mask.shape().to_vec());
    if mask.shape() != expected.as_slice() {
        return Err(PivError::Shape {
            expected,
            actual: mask.shape().to_vec(),
        });
    }
    fields
        .iter()
        .copied()
        .chain(extras.iter())
        .map(|array| {
            if array.shape() != expected.as_slice() {
                return Err(PivError::Shape {
                    expected: expected.clone(),
                    actual: array.shape().to_vec(),
                });
            }
            MaskedArray::new(array.clone(), mask.clone())
        })
        .collect()
}

/// Predicate marking vectors whose selector is 0, in field layout.
///
/// Buffers without a selector block have no disabled vectors.
///
/// # Examples
/// ```no_run
/// use pivfile_core::{disabled_vectors, read};
///
/// let (mut buffer, _) = read("B00001.vc7")?;
/// let masked = buffer.filter(disabled_vectors, &[])?;
/// println!("{} valid vectors", masked[0].count_valid());
/// # Ok::<(), pivfile_core::PivError>(())
/// ```
pub fn disabled_vectors(buffer: &mut Buffer) -> Result<Array2<bool>, PivError> {
    let format = buffer.buffer_format()?;
    let flip = buffer.scales()?.y.is_inverted();
    let blocks = buffer.blocks()?;
    let first = blocks.index_axis(Axis(0), 0);
    if !format.has_selector() {
        let (ny, nx) = first.dim();
        return Ok(Array2::from_elem((nx, ny), false));
    }
    let choice = selectors(first)?;
    Ok(to_physical_layout(choice.mapv(|value| value == 0).view(), flip))
}
