use ndarray::{Array1, s};

use crate::scale::LinearScale;

/// Physical cell-center coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Positions {
    pub x: Array1<f64>,
    /// Reversed when the Y scale is inverted, so it runs with the field.
    pub y: Array1<f64>,
    /// Placeholder; planar buffers have no z coordinate.
    pub z: f64,
}

pub fn positions(
    nx: usize,
    ny: usize,
    vector_grid: i32,
    scale_x: &LinearScale,
    scale_y: &LinearScale,
) -> Positions {
    let grid = f64::from(vector_grid);
    let x = scale_x.centers(nx, grid);
    let mut y = scale_y.centers(ny, grid);
    if scale_y.is_inverted() {
        y = y.slice(s![..;-1]).to_owned();
    }
    Positions { x, y, z: 0.0 }
}
