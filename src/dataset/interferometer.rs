use std::f64::consts::PI;

use super::{DatasetError, Result};
use crate::structures::Grid;

const ARCSEC_TO_RADIANS: f64 = PI / 180. / 3600.;

/// Interferometer data: complex visibilities `[real, imag]` sampled at `[u, v]` baselines
#[derive(Debug, Clone, PartialEq)]
pub struct Interferometer {
    pub name: String,
    pub visibilities: Vec<[f64; 2]>,
    pub noise_map: Vec<[f64; 2]>,
    /// Baselines in wavelengths
    pub uv_wavelengths: Vec<[f64; 2]>,
}
impl Interferometer {
    pub fn new(
        name: impl Into<String>,
        visibilities: Vec<[f64; 2]>,
        noise_map: Vec<[f64; 2]>,
        uv_wavelengths: Vec<[f64; 2]>,
    ) -> Result<Self> {
        let n = visibilities.len();
        if noise_map.len() != n || uv_wavelengths.len() != n {
            return Err(DatasetError::Visibilities {
                visibilities: n,
                noise_map: noise_map.len(),
                uv_wavelengths: uv_wavelengths.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            visibilities,
            noise_map,
            uv_wavelengths,
        })
    }
    pub fn len(&self) -> usize {
        self.visibilities.len()
    }
    pub fn is_empty(&self) -> bool {
        self.visibilities.is_empty()
    }
    pub fn signal_to_noise_map(&self) -> Vec<[f64; 2]> {
        self.visibilities
            .iter()
            .zip(&self.noise_map)
            .map(|(v, n)| [v[0] / n[0], v[1] / n[1]])
            .collect()
    }
    /// A mask keeping every visibility
    pub fn visibilities_mask(&self) -> Vec<bool> {
        vec![false; self.len()]
    }
    pub fn u_wavelengths(&self) -> Vec<f64> {
        self.uv_wavelengths.iter().map(|uv| uv[0]).collect()
    }
    pub fn v_wavelengths(&self) -> Vec<f64> {
        self.uv_wavelengths.iter().map(|uv| uv[1]).collect()
    }
}

/// Direct Fourier transform of real-space images to visibilities
#[derive(Debug, Clone)]
pub struct Transformer {
    uv_wavelengths: Vec<[f64; 2]>,
    grid_radians: Vec<[f64; 2]>,
}
impl Transformer {
    pub fn new(uv_wavelengths: &[[f64; 2]], grid: &Grid) -> Self {
        Self {
            uv_wavelengths: uv_wavelengths.to_vec(),
            grid_radians: grid
                .iter()
                .map(|&[y, x]| [y * ARCSEC_TO_RADIANS, x * ARCSEC_TO_RADIANS])
                .collect(),
        }
    }
    /// Visibilities of the image values sampled at the grid coordinates
    pub fn visibilities(&self, image: &[f64]) -> Vec<[f64; 2]> {
        self.uv_wavelengths
            .iter()
            .map(|&[u, v]| {
                self.grid_radians.iter().zip(image).fold(
                    [0f64; 2],
                    |[re, im], (&[y, x], &value)| {
                        let (sin, cos) = (-2. * PI * (u * x + v * y)).sin_cos();
                        [re + value * cos, im + value * sin]
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_source_at_origin_is_flat() {
        let grid = Grid::uniform((3, 3), (0.1, 0.1), 1);
        let mut image = vec![0f64; 9];
        image[4] = 2.;
        let transformer = Transformer::new(&[[1e4, 0.], [-3e5, 2e5]], &grid);
        for [re, im] in transformer.visibilities(&image) {
            assert!((re - 2.).abs() < 1e-12);
            assert!(im.abs() < 1e-12);
        }
    }

    #[test]
    fn lengths_must_agree() {
        assert!(Interferometer::new("test", vec![[1., 0.]], vec![], vec![[0., 0.]]).is_err());
    }
}
