use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};

use super::{DatasetError, Imaging, Instrument, Interferometer, Result, Transformer};
use crate::{
    galaxy::Plane,
    profiles::Evaluable,
    structures::{Array2D, Grid},
};

/// Largest simulated baseline in wavelengths
const UV_MAXIMUM: f64 = 4e5;

/// Simulates CCD imaging of a plane of galaxies
#[derive(Debug, Clone)]
pub struct SimulatorImaging {
    instrument: Instrument,
    sub_size: usize,
    add_noise: bool,
    seed: u64,
}
impl SimulatorImaging {
    pub fn from_instrument(instrument: Instrument) -> Self {
        Self {
            instrument,
            sub_size: 4,
            add_noise: true,
            seed: 1,
        }
    }
    pub fn sub_size(self, sub_size: usize) -> Self {
        Self { sub_size, ..self }
    }
    pub fn add_noise(self, add_noise: bool) -> Self {
        Self { add_noise, ..self }
    }
    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }
    pub fn simulate(&self, plane: &Plane) -> Result<Imaging> {
        let instrument = self.instrument;
        let grid = Grid::uniform(instrument.shape(), instrument.pixel_scales(), self.sub_size);
        let image = grid.array_from_sub_values(&plane.profile_image(&grid)?)?;
        let psf = instrument.psf()?;
        let blurred = psf.convolve(&image);

        let exposure = instrument.exposure_time();
        let sky = instrument.background_sky_level();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut counts = blurred.map(|x| ((x + sky) * exposure).max(0.));
        if self.add_noise {
            let mut noisy = Vec::with_capacity(counts.len());
            for &lambda in counts.iter() {
                noisy.push(if lambda > 0. {
                    Poisson::new(lambda)
                        .map_err(|e| DatasetError::Distribution(e.to_string()))?
                        .sample(&mut rng)
                } else {
                    0.
                });
            }
            counts = Array2D::new(counts.shape(), counts.pixel_scales(), noisy)?;
        }
        let image = counts.map(|c| c / exposure - sky);
        let noise_map = counts.map(|c| c.max(1.).sqrt() / exposure);
        log::info!(
            "Simulated {} imaging of shape {:?}",
            instrument,
            image.shape()
        );
        Imaging::new("simulated", image, noise_map, psf)
    }
}

/// Simulates interferometer visibilities of a plane of galaxies
#[derive(Debug, Clone)]
pub struct SimulatorInterferometer {
    instrument: Instrument,
    noise_sigma: f64,
    seed: u64,
}
impl SimulatorInterferometer {
    pub fn from_instrument(instrument: Instrument) -> Self {
        Self {
            instrument,
            noise_sigma: 0.1,
            seed: 1,
        }
    }
    pub fn noise_sigma(self, noise_sigma: f64) -> Self {
        Self {
            noise_sigma,
            ..self
        }
    }
    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }
    pub fn simulate(&self, plane: &Plane) -> Result<Interferometer> {
        let instrument = self.instrument;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let uv_wavelengths: Vec<[f64; 2]> = (0..instrument.n_visibilities())
            .map(|_| {
                [
                    rng.gen_range(-UV_MAXIMUM..UV_MAXIMUM),
                    rng.gen_range(-UV_MAXIMUM..UV_MAXIMUM),
                ]
            })
            .collect();
        let grid = Grid::uniform(instrument.shape(), instrument.pixel_scales(), 1);
        let image = plane.profile_image(&grid)?;
        let transformer = Transformer::new(&uv_wavelengths, &grid);
        let normal = Normal::new(0., self.noise_sigma)
            .map_err(|e| DatasetError::Distribution(e.to_string()))?;
        let visibilities: Vec<[f64; 2]> = transformer
            .visibilities(&image)
            .into_iter()
            .map(|[re, im]| [re + normal.sample(&mut rng), im + normal.sample(&mut rng)])
            .collect();
        let noise_map = vec![[self.noise_sigma; 2]; visibilities.len()];
        log::info!(
            "Simulated {} visibilities with {}",
            visibilities.len(),
            instrument
        );
        Interferometer::new("simulated", visibilities, noise_map, uv_wavelengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        galaxy::{Galaxy, Named},
        profiles::EllipticalSersic,
    };

    fn plane() -> Plane {
        Plane::new(vec![Named::new(
            "galaxy",
            Galaxy::new(0.5).light(
                "bulge",
                EllipticalSersic {
                    intensity: 0.3,
                    ..Default::default()
                },
            ),
        )])
    }

    #[test]
    fn noiseless_imaging_recovers_blurred_image() {
        let imaging = SimulatorImaging::from_instrument(Instrument::Vro)
            .add_noise(false)
            .simulate(&plane())
            .unwrap();
        assert_eq!(imaging.shape(), (40, 40));
        let (_, max) = imaging.image.minmax().unwrap();
        assert!(max > 0.);
        assert!(imaging.noise_map.iter().all(|&n| n > 0.));
    }

    #[test]
    fn seeded_interferometer_is_reproducible() {
        let simulator = SimulatorInterferometer::from_instrument(Instrument::Sma).seed(7);
        // An empty plane has no light to simulate
        assert!(simulator.simulate(&Plane::default()).is_err());
        let plane = plane();
        let a = simulator.simulate(&plane).unwrap();
        let b = simulator.simulate(&plane).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 190);
    }
}
