use std::f64::consts::PI;

use super::{FitError, Result};
use crate::{
    dataset::{Interferometer, Transformer},
    galaxy::{Named, Plane},
    structures::{Array2D, Grid, Mask},
};

/// Fit of a plane of galaxies to interferometer visibilities
///
/// The plane image is computed on the sub-grid of the real-space mask, binned
/// to one value per unmasked pixel and Fourier transformed at the baselines.
/// Visibility maps are `[real, imag]` pairs, masked visibilities are set to zero.
#[derive(Debug, Clone)]
pub struct FitInterferometer {
    pub real_space_mask: Mask,
    pub visibilities_mask: Vec<bool>,
    pub plane: Plane,
    pub visibilities: Vec<[f64; 2]>,
    pub noise_map: Vec<[f64; 2]>,
    pub uv_wavelengths: Vec<[f64; 2]>,
    pub model_visibilities: Vec<[f64; 2]>,
    pub residual_map: Vec<[f64; 2]>,
    pub normalized_residual_map: Vec<[f64; 2]>,
    pub chi_squared_map: Vec<[f64; 2]>,
    /// Unblurred image of the plane in real space
    pub model_image: Array2D,
    pub model_images_of_galaxies: Vec<Named<Array2D>>,
    pub log_likelihood: f64,
}
impl FitInterferometer {
    pub fn new(
        interferometer: &Interferometer,
        visibilities_mask: &[bool],
        real_space_mask: &Mask,
        plane: &Plane,
        sub_size: usize,
    ) -> Result<Self> {
        if visibilities_mask.len() != interferometer.len() {
            return Err(FitError::VisibilitiesMask(
                visibilities_mask.len(),
                interferometer.len(),
            ));
        }
        let grid = Grid::from_mask(real_space_mask.clone(), sub_size);
        let pixel_grid = Grid::from_mask(real_space_mask.clone(), 1);
        let transformer = Transformer::new(&interferometer.uv_wavelengths, &pixel_grid);

        let mut model_images_of_galaxies = Vec::with_capacity(plane.galaxies.len());
        let mut model_image = Array2D::zeros(real_space_mask.shape(), real_space_mask.pixel_scales());
        for (galaxy, values) in plane
            .galaxies
            .iter()
            .zip(plane.images_of_galaxies(&grid)?)
        {
            let image = grid.array_from_sub_values(&values)?;
            model_image = model_image.zip_with(&image, |a, b| a + b)?;
            model_images_of_galaxies.push(Named::new(galaxy.name.clone(), image));
        }
        let pixel_values: Vec<f64> = real_space_mask
            .unmasked_pixels()
            .map(|(row, col)| model_image.get(row, col))
            .collect();
        let model_visibilities = transformer.visibilities(&pixel_values);

        let keep = |masked: bool, pair: [f64; 2]| if masked { [0.; 2] } else { pair };
        let residual_map: Vec<[f64; 2]> = interferometer
            .visibilities
            .iter()
            .zip(&model_visibilities)
            .zip(visibilities_mask)
            .map(|((d, m), &masked)| keep(masked, [d[0] - m[0], d[1] - m[1]]))
            .collect();
        let normalized_residual_map: Vec<[f64; 2]> = residual_map
            .iter()
            .zip(&interferometer.noise_map)
            .map(|(r, n)| [r[0] / n[0], r[1] / n[1]])
            .collect();
        let chi_squared_map: Vec<[f64; 2]> = normalized_residual_map
            .iter()
            .map(|r| [r[0] * r[0], r[1] * r[1]])
            .collect();
        let noise_normalization: f64 = interferometer
            .noise_map
            .iter()
            .zip(visibilities_mask)
            .filter(|(_, masked)| !**masked)
            .map(|(n, _)| (2. * PI * n[0] * n[0]).ln() + (2. * PI * n[1] * n[1]).ln())
            .sum();
        let chi_squared: f64 = chi_squared_map.iter().map(|c| c[0] + c[1]).sum();

        Ok(Self {
            real_space_mask: real_space_mask.clone(),
            visibilities_mask: visibilities_mask.to_vec(),
            plane: plane.clone(),
            visibilities: interferometer.visibilities.clone(),
            noise_map: interferometer.noise_map.clone(),
            uv_wavelengths: interferometer.uv_wavelengths.clone(),
            model_visibilities,
            residual_map,
            normalized_residual_map,
            chi_squared_map,
            model_image,
            model_images_of_galaxies,
            log_likelihood: -0.5 * (chi_squared + noise_normalization),
        })
    }
    pub fn signal_to_noise_map(&self) -> Vec<[f64; 2]> {
        self.visibilities
            .iter()
            .zip(&self.noise_map)
            .map(|(v, n)| [v[0] / n[0], v[1] / n[1]])
            .collect()
    }
    pub fn chi_squared(&self) -> f64 {
        self.chi_squared_map.iter().map(|c| c[0] + c[1]).sum()
    }
    pub fn galaxy_names(&self) -> Vec<String> {
        self.plane.names().map(String::from).collect()
    }
}
