use ndarray::{Array2, Array3, ArrayView2, Axis, Zip, s};

use crate::error::PivError;
use crate::header::BufferFormat;
use crate::scale::LinearScale;

/// Velocity components in x-major layout (`[nx, ny]`).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    pub vx: Array2<f64>,
    pub vy: Array2<f64>,
    pub vz: Array2<f64>,
    pub vmag: Array2<f64>,
    /// Correlation peak ratio, unscaled.
    pub peak: Option<Array2<f64>>,
}

type Selection = [Option<usize>; 6];

// Indexed by selector value; 0 marks a disabled vector and 5 reuses the
// post-processed source of 4.
const EXT_2D_VX: Selection = [None, Some(1), Some(3), Some(5), Some(7), Some(7)];
const EXT_2D_VY: Selection = [None, Some(2), Some(4), Some(6), Some(8), Some(8)];
const EXT_3D_VX: Selection = [None, Some(1), Some(4), Some(7), Some(10), Some(10)];
const EXT_3D_VY: Selection = [None, Some(2), Some(5), Some(8), Some(11), Some(11)];
const EXT_3D_VZ: Selection = [None, Some(3), Some(6), Some(9), Some(12), Some(12)];

#[derive(Debug, Clone, Copy)]
enum Source {
    Block(usize),
    Zero,
    Select(&'static Selection),
}

struct ComponentLayout {
    vx: Source,
    vy: Source,
    vz: Source,
    peak: Option<usize>,
}

fn layout_for(format: BufferFormat) -> Result<ComponentLayout, PivError> {
    let layout = match format {
        BufferFormat::Vector2d => ComponentLayout {
            vx: Source::Block(0),
            vy: Source::Block(1),
            vz: Source::Zero,
            peak: None,
        },
        BufferFormat::Vector2dExtended => ComponentLayout {
            vx: Source::Select(&EXT_2D_VX),
            vy: Source::Select(&EXT_2D_VY),
            vz: Source::Zero,
            peak: None,
        },
        BufferFormat::Vector2dExtendedPeak => ComponentLayout {
            vx: Source::Select(&EXT_2D_VX),
            vy: Source::Select(&EXT_2D_VY),
            vz: Source::Zero,
            peak: Some(9),
        },
        BufferFormat::Vector3d => ComponentLayout {
            vx: Source::Block(0),
            vy: Source::Block(1),
            vz: Source::Block(2),
            peak: None,
        },
        BufferFormat::Vector3dExtendedPeak => ComponentLayout {
            vx: Source::Select(&EXT_3D_VX),
            vy: Source::Select(&EXT_3D_VY),
            vz: Source::Select(&EXT_3D_VZ),
            peak: Some(13),
        },
        other => {
            return Err(PivError::Format(format!(
                "{other:?} buffer does not hold a vector field"
            )));
        }
    };
    Ok(layout)
}

/// Per-pixel selector values of block 0, truncated toward zero.
pub fn selectors(block: ArrayView2<'_, f32>) -> Result<Array2<usize>, PivError> {
    let mut choice = Array2::zeros(block.raw_dim());
    for ((row, col), value) in block.indexed_iter() {
        let truncated = value.trunc();
        if !truncated.is_finite() || !(0.0..=5.0).contains(&truncated) {
            return Err(PivError::InvalidSelector {
                row,
                col,
                value: *value,
            });
        }
        choice[[row, col]] = truncated as usize;
    }
    Ok(choice)
}

fn gather(
    source: Source,
    blocks: &Array3<f32>,
    choice: Option<&Array2<usize>>,
) -> Result<Array2<f64>, PivError> {
    let (_, ny, nx) = blocks.dim();
    match source {
        Source::Block(index) => Ok(blocks.index_axis(Axis(0), index).mapv(f64::from)),
        Source::Zero => Ok(Array2::zeros((ny, nx))),
        Source::Select(table) => {
            let choice = choice.ok_or_else(|| {
                PivError::Format("selector table used without selector block".to_string())
            })?;
            Ok(Array2::from_shape_fn((ny, nx), |(row, col)| {
                match table[choice[[row, col]]] {
                    Some(block) => f64::from(blocks[[block, row, col]]),
                    None => 0.0,
                }
            }))
        }
    }
}

/// Transpose a `(ny, nx)` block to x-major and optionally reverse y.
pub fn to_physical_layout<T: Clone>(block: ArrayView2<'_, T>, flip_y: bool) -> Array2<T> {
    let transposed = block.reversed_axes();
    let oriented = if flip_y {
        transposed.slice_move(s![.., ..;-1])
    } else {
        transposed
    };
    oriented.as_standard_layout().into_owned()
}

/// Extract vx, vy, vz (and peak) from segmented vector blocks.
///
/// # Examples
/// ```text
/// use ndarray::Array3;
/// use pivfile_core::decode::components::extract;
/// use pivfile_core::{BufferFormat, LinearScale};
///
/// let blocks = Array3::from_elem((2, 1, 1), 3.0f32);
/// let pixel = LinearScale::identity("pixel");
/// let field = extract(&blocks, BufferFormat::Vector2d, &pixel, &pixel).unwrap();
/// assert_eq!(field.vmag[[0, 0]], 18f64.sqrt());
/// ```
pub fn extract(
    blocks: &Array3<f32>,
    format: BufferFormat,
    scale_y: &LinearScale,
    scale_i: &LinearScale,
) -> Result<VectorField, PivError> {
    let layout = layout_for(format)?;
    let needed = format.vector_block_count().unwrap_or(0);
    let available = blocks.len_of(Axis(0));
    if available < needed {
        return Err(PivError::Format(format!(
            "{format:?} needs {needed} blocks, buffer has {available}"
        )));
    }

    let choice = if format.has_selector() {
        Some(selectors(blocks.index_axis(Axis(0), 0))?)
    } else {
        None
    };
    let vx = gather(layout.vx, blocks, choice.as_ref())?;
    let mut vy = gather(layout.vy, blocks, choice.as_ref())?;
    let vz = gather(layout.vz, blocks, choice.as_ref())?;

    let flip = scale_y.is_inverted();
    if flip {
        log::info!("inverting y axis");
        vy.mapv_inplace(|v| -v);
    }
    let vx = scale_i.apply_array(&to_physical_layout(vx.view(), flip), 1.0);
    let vy = scale_i.apply_array(&to_physical_layout(vy.view(), flip), 1.0);
    let vz = scale_i.apply_array(&to_physical_layout(vz.view(), flip), 1.0);
    let vmag = Zip::from(&vx)
        .and(&vy)
        .and(&vz)
        .map_collect(|x, y, z| (x * x + y * y + z * z).sqrt());
    let peak = layout.peak.map(|index| {
        to_physical_layout(blocks.index_axis(Axis(0), index), flip).mapv(f64::from)
    });

    Ok(VectorField {
        vx,
        vy,
        vz,
        vmag,
        peak,
    })
}
