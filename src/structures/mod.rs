//! Uniform 2D structures: arrays, masks, coordinate grids and convolution kernels
//!
//! All structures share the same geometry: a `(rows, cols)` shape, `(y, x)`
//! pixel scales in arcsec and an origin at the centre of the array.
//! Coordinates are always ordered `[y, x]`.

mod array;
mod grid;
mod kernel;
mod mask;

pub use array::Array2D;
pub use grid::Grid;
pub use kernel::Kernel;
pub use mask::Mask;

#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("{len} values do not fill an array of shape {shape:?}")]
    Shape { len: usize, shape: (usize, usize) },
    #[error("kernel shape {0:?} must be odd along both axes")]
    EvenKernel((usize, usize)),
    #[error("expected {expected} sub-pixel values for the grid, found {found}")]
    GridValues { expected: usize, found: usize },
    #[error("arrays of shape {0:?} and {1:?} cannot be combined")]
    Mismatch((usize, usize), (usize, usize)),
}
type Result<T> = std::result::Result<T, StructureError>;

/// Returns the `[y, x]` coordinates of the centre of pixel `(row, col)`
pub fn pixel_centre(
    shape: (usize, usize),
    pixel_scales: (f64, f64),
    row: usize,
    col: usize,
) -> [f64; 2] {
    let (rows, cols) = shape;
    let y = (0.5 * (rows as f64 - 1.) - row as f64) * pixel_scales.0;
    let x = (col as f64 - 0.5 * (cols as f64 - 1.)) * pixel_scales.1;
    [y, x]
}

/// Returns the pixel `(row, col)` containing the coordinates `[y, x]`, if any
pub fn pixel_at(
    shape: (usize, usize),
    pixel_scales: (f64, f64),
    coords: [f64; 2],
) -> Option<(usize, usize)> {
    let (rows, cols) = shape;
    let row = (0.5 * (rows as f64 - 1.) - coords[0] / pixel_scales.0).round();
    let col = (coords[1] / pixel_scales.1 + 0.5 * (cols as f64 - 1.)).round();
    if row < 0. || col < 0. || row >= rows as f64 || col >= cols as f64 {
        None
    } else {
        Some((row as usize, col as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_and_pixel_agree() {
        let shape = (5, 4);
        let pixel_scales = (0.1, 0.2);
        for row in 0..5 {
            for col in 0..4 {
                let c = pixel_centre(shape, pixel_scales, row, col);
                assert_eq!(pixel_at(shape, pixel_scales, c), Some((row, col)));
            }
        }
    }

    #[test]
    fn origin_is_central() {
        assert_eq!(pixel_centre((3, 3), (1., 1.), 1, 1), [0., 0.]);
        assert_eq!(pixel_centre((3, 3), (1., 1.), 0, 0), [1., -1.]);
        assert_eq!(pixel_at((3, 3), (1., 1.), [5., 0.]), None);
    }
}
