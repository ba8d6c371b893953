//! Fits of galaxy models to datasets
//!
//! A fit is computed once, at construction, and is read-only afterwards.

use std::f64::consts::PI;

use crate::{
    galaxy::Named,
    inversion::InversionError,
    profiles::EvalError,
    structures::{Array2D, Mask, StructureError},
};

mod galaxy;
mod imaging;
mod interferometer;

pub use galaxy::FitGalaxy;
pub use imaging::FitImaging;
pub use interferometer::FitInterferometer;

#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("{0} visibilities in the mask, expected {1}")]
    VisibilitiesMask(usize, usize),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Inversion(#[from] InversionError),
}
type Result<T> = std::result::Result<T, FitError>;

/// Residual, normalized residual and chi-squared maps of a model, zero outside the mask
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Residuals {
    pub residual_map: Array2D,
    pub normalized_residual_map: Array2D,
    pub chi_squared_map: Array2D,
}
impl Residuals {
    pub fn new(data: &Array2D, noise_map: &Array2D, model: &Array2D, mask: &Mask) -> Result<Self> {
        let residual_map = mask.apply(&data.zip_with(model, |d, m| d - m)?)?;
        let normalized_residual_map =
            mask.apply(&residual_map.zip_with(noise_map, |r, n| r / n)?)?;
        let chi_squared_map = normalized_residual_map.map(|x| x * x);
        Ok(Self {
            residual_map,
            normalized_residual_map,
            chi_squared_map,
        })
    }
}

/// Gaussian log likelihood of the unmasked pixels
pub(crate) fn log_likelihood(chi_squared_map: &Array2D, noise_map: &Array2D, mask: &Mask) -> f64 {
    let noise_normalization: f64 = mask
        .unmasked_pixels()
        .map(|(row, col)| (2. * PI * noise_map.get(row, col).powi(2)).ln())
        .sum();
    -0.5 * (chi_squared_map.sum() + noise_normalization)
}

/// Looks up the named map of a galaxy
pub fn of_galaxy<'a>(maps: &'a [Named<Array2D>], name: &str) -> Option<&'a Array2D> {
    maps.iter().find(|m| m.name == name).map(|m| &m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residuals_skip_masked_pixels() {
        let mask = Mask::from_vec((1, 3), (1., 1.), vec![false, false, true]).unwrap();
        let data = Array2D::new((1, 3), (1., 1.), vec![3., 1., 9.]).unwrap();
        let noise = Array2D::full(2., (1, 3), (1., 1.));
        let model = Array2D::full(1., (1, 3), (1., 1.));
        let residuals = Residuals::new(&data, &noise, &model, &mask).unwrap();
        assert_eq!(residuals.residual_map.data(), &[2., 0., 0.]);
        assert_eq!(residuals.chi_squared_map.data(), &[1., 0., 0.]);
        let expected = -0.5 * (1. + 2. * (2. * PI * 4.).ln());
        assert!((log_likelihood(&residuals.chi_squared_map, &noise, &mask) - expected).abs() < 1e-12);
    }
}
