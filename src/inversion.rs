//! Linear inversion of imaging data on a rectangular pixelization
//!
//! The pixelization covers the bounding box of the masked grid. Each
//! sub-pixel maps to the rectangular pixel it falls in, the mapping matrix is
//! blurred by the PSF and the regularized linear system
//! `(F + H) s = D` is solved for the reconstruction `s` by Cholesky
//! decomposition, `F` being the curvature matrix, `H` the constant
//! regularization matrix and `D` the data vector.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::structures::{Array2D, Grid, Kernel, StructureError};

/// Added to the regularization matrix diagonal to keep it positive definite
const REGULARIZATION_FLOOR: f64 = 1e-8;

#[derive(Debug, thiserror::Error)]
pub enum InversionError {
    #[error("cannot invert an empty grid")]
    EmptyGrid,
    #[error("the regularized curvature matrix is not positive definite")]
    Singular,
    #[error(transparent)]
    Structure(#[from] StructureError),
}
type Result<T> = std::result::Result<T, InversionError>;

/// Rectangular pixelization with a constant regularization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pixelization {
    pub shape: (usize, usize),
    pub coefficient: f64,
}
impl Default for Pixelization {
    fn default() -> Self {
        Self {
            shape: (20, 20),
            coefficient: 1.,
        }
    }
}

/// Extent of the pixelization: `[y_min, y_max, x_min, x_max]`
fn extent(grid: &Grid) -> [f64; 4] {
    grid.iter().fold(
        [f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY],
        |[y0, y1, x0, x1], &[y, x]| [y0.min(y), y1.max(y), x0.min(x), x1.max(x)],
    )
}

/// Regularization matrix penalizing differences between neighbouring pixels
fn regularization_matrix(shape: (usize, usize), coefficient: f64) -> DMatrix<f64> {
    let (rows, cols) = shape;
    let n = rows * cols;
    let c2 = coefficient * coefficient;
    let mut h = DMatrix::<f64>::zeros(n, n);
    for row in 0..rows {
        for col in 0..cols {
            let i = row * cols + col;
            let neighbours = [
                (row + 1 < rows).then(|| i + cols),
                (col + 1 < cols).then(|| i + 1),
            ];
            for j in neighbours.into_iter().flatten() {
                h[(i, i)] += c2;
                h[(j, j)] += c2;
                h[(i, j)] -= c2;
                h[(j, i)] -= c2;
            }
            h[(i, i)] += REGULARIZATION_FLOOR;
        }
    }
    h
}

fn log_det(cholesky: &nalgebra::Cholesky<f64, nalgebra::Dyn>) -> f64 {
    2. * cholesky.l_dirty().diagonal().iter().map(|x| x.ln()).sum::<f64>()
}

#[derive(Debug, Clone)]
pub struct Inversion {
    pixelization: Pixelization,
    extent: [f64; 4],
    pub reconstruction: Vec<f64>,
    pub errors: Vec<f64>,
    pub reconstructed_image: Array2D,
    pub residual_map: Array2D,
    pub normalized_residual_map: Array2D,
    pub chi_squared_map: Array2D,
    pub regularization_weights: Vec<f64>,
    regularization_term: f64,
    log_det_curvature_reg_matrix_term: f64,
    log_det_regularization_matrix_term: f64,
}
impl Inversion {
    /// Reconstructs `image` (with `noise_map`, masked pixels ignored) on `pixelization`
    pub fn imaging(
        image: &Array2D,
        noise_map: &Array2D,
        psf: &Kernel,
        grid: &Grid,
        pixelization: &Pixelization,
    ) -> Result<Self> {
        if grid.is_empty() {
            return Err(InversionError::EmptyGrid);
        }
        let mask = grid.mask();
        let pixels: Vec<(usize, usize)> = mask.unmasked_pixels().collect();
        let (p_rows, p_cols) = pixelization.shape;
        let n_source = p_rows * p_cols;
        let extent = extent(grid);
        let [y_min, y_max, x_min, x_max] = extent;
        let dy = (y_max - y_min).max(f64::EPSILON) / p_rows as f64;
        let dx = (x_max - x_min).max(f64::EPSILON) / p_cols as f64;
        let source_pixel = |[y, x]: [f64; 2]| {
            let row = (((y_max - y) / dy) as usize).min(p_rows - 1);
            let col = (((x - x_min) / dx) as usize).min(p_cols - 1);
            row * p_cols + col
        };

        // mapping matrix, one row per unmasked image pixel
        let n_sub = grid.sub_size() * grid.sub_size();
        let fraction = 1. / n_sub as f64;
        let mut mapping = DMatrix::<f64>::zeros(pixels.len(), n_source);
        for (i, sub_coords) in grid.chunks(n_sub).enumerate() {
            for &coords in sub_coords {
                mapping[(i, source_pixel(coords))] += fraction;
            }
        }
        let mut blurred_mapping = DMatrix::<f64>::zeros(pixels.len(), n_source);
        for j in 0..n_source {
            let column = mapping.column(j);
            if column.iter().all(|&x| x == 0.) {
                continue;
            }
            let mut image_j = Array2D::zeros(mask.shape(), mask.pixel_scales());
            for (&(row, col), &value) in pixels.iter().zip(column.iter()) {
                image_j.set(row, col, value);
            }
            let blurred = psf.convolve(&image_j);
            for (i, &(row, col)) in pixels.iter().enumerate() {
                blurred_mapping[(i, j)] = blurred.get(row, col);
            }
        }

        let data = DVector::from_iterator(pixels.len(), pixels.iter().map(|&(r, c)| image.get(r, c)));
        let weights = DVector::from_iterator(
            pixels.len(),
            pixels.iter().map(|&(r, c)| noise_map.get(r, c).powi(-2)),
        );
        let weighted = DMatrix::from_fn(pixels.len(), n_source, |i, j| {
            blurred_mapping[(i, j)] * weights[i]
        });
        let data_vector = weighted.transpose() * &data;
        let curvature = weighted.transpose() * &blurred_mapping;
        let regularization = regularization_matrix(pixelization.shape, pixelization.coefficient);
        let curvature_reg = &curvature + &regularization;

        let cholesky = curvature_reg
            .clone()
            .cholesky()
            .ok_or(InversionError::Singular)?;
        let reconstruction = cholesky.solve(&data_vector);
        let errors: Vec<f64> = cholesky
            .inverse()
            .diagonal()
            .iter()
            .map(|x| x.max(0.).sqrt())
            .collect();
        let log_det_curvature_reg_matrix_term = log_det(&cholesky);
        let log_det_regularization_matrix_term = regularization
            .clone()
            .cholesky()
            .map(|c| log_det(&c))
            .ok_or(InversionError::Singular)?;
        let regularization_term = (reconstruction.transpose() * &regularization * &reconstruction)[(0, 0)];

        let model = &blurred_mapping * &reconstruction;
        let mut reconstructed_image = Array2D::zeros(mask.shape(), mask.pixel_scales());
        for (&(row, col), &value) in pixels.iter().zip(model.iter()) {
            reconstructed_image.set(row, col, value);
        }
        let residual_map = mask.apply(&image.zip_with(&reconstructed_image, |d, m| d - m)?)?;
        let normalized_residual_map = mask.apply(&residual_map.zip_with(noise_map, |r, n| r / n)?)?;
        let chi_squared_map = normalized_residual_map.map(|x| x * x);

        log::debug!(
            "inversion of {} pixels on a {:?} pixelization",
            pixels.len(),
            pixelization.shape
        );
        Ok(Self {
            pixelization: *pixelization,
            extent,
            reconstruction: reconstruction.iter().cloned().collect(),
            errors,
            reconstructed_image,
            residual_map,
            normalized_residual_map,
            chi_squared_map,
            regularization_weights: vec![pixelization.coefficient; n_source],
            regularization_term,
            log_det_curvature_reg_matrix_term,
            log_det_regularization_matrix_term,
        })
    }
    pub fn pixelization(&self) -> &Pixelization {
        &self.pixelization
    }
    fn on_pixelization(&self, values: &[f64]) -> Result<Array2D> {
        let [y_min, y_max, x_min, x_max] = self.extent;
        let (rows, cols) = self.pixelization.shape;
        let pixel_scales = (
            (y_max - y_min).max(f64::EPSILON) / rows as f64,
            (x_max - x_min).max(f64::EPSILON) / cols as f64,
        );
        Ok(Array2D::new(
            self.pixelization.shape,
            pixel_scales,
            values.to_vec(),
        )?)
    }
    /// Reconstruction laid out on the rectangular pixelization
    pub fn interpolated_reconstruction(&self) -> Result<Array2D> {
        self.on_pixelization(&self.reconstruction)
    }
    pub fn interpolated_errors(&self) -> Result<Array2D> {
        self.on_pixelization(&self.errors)
    }
    pub fn regularization_weights_map(&self) -> Result<Array2D> {
        self.on_pixelization(&self.regularization_weights)
    }
    pub fn chi_squared(&self) -> f64 {
        self.chi_squared_map.sum()
    }
    /// Bayesian evidence terms of the regularized reconstruction
    pub fn evidence_terms(&self) -> f64 {
        -0.5 * (self.regularization_term + self.log_det_curvature_reg_matrix_term
            - self.log_det_regularization_matrix_term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::Mask;

    #[test]
    fn reconstructs_flat_image() {
        let mask = Mask::circular((9, 9), (0.1, 0.1), 0.35);
        let grid = Grid::from_mask(mask.clone(), 1);
        let image = mask.apply(&Array2D::full(2., (9, 9), (0.1, 0.1))).unwrap();
        let noise_map = Array2D::full(0.1, (9, 9), (0.1, 0.1));
        let inversion = Inversion::imaging(
            &image,
            &noise_map,
            &Kernel::no_blur((0.1, 0.1)),
            &grid,
            &Pixelization {
                shape: (3, 3),
                coefficient: 1e-3,
            },
        )
        .unwrap();
        assert_eq!(inversion.reconstruction.len(), 9);
        assert!(inversion.chi_squared() < 1e-2);
        let (row, col) = mask.unmasked_pixels().next().unwrap();
        assert!((inversion.reconstructed_image.get(row, col) - 2.).abs() < 1e-2);
        assert_eq!(inversion.interpolated_reconstruction().unwrap().shape(), (3, 3));
        assert!(inversion.errors.iter().all(|e| e.is_finite()));
    }

    #[test]
    fn regularization_is_symmetric() {
        let h = regularization_matrix((2, 3), 2.);
        assert_eq!(h.transpose(), h);
        assert!((h.row_sum().iter().sum::<f64>() - 6. * REGULARIZATION_FLOOR).abs() < 1e-12);
    }
}
