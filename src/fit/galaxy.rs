use super::{log_likelihood, Residuals, Result};
use crate::{
    dataset::GalaxyData,
    galaxy::Plane,
    structures::{Array2D, Grid},
};

/// Fit of galaxies to a map of one of their quantities
#[derive(Debug, Clone)]
pub struct FitGalaxy {
    pub data: GalaxyData,
    pub plane: Plane,
    pub image: Array2D,
    pub noise_map: Array2D,
    pub model_image: Array2D,
    pub residual_map: Array2D,
    pub normalized_residual_map: Array2D,
    pub chi_squared_map: Array2D,
    pub log_likelihood: f64,
}
impl FitGalaxy {
    pub fn new(data: &GalaxyData, plane: &Plane) -> Result<Self> {
        let mask = &data.mask;
        let grid = Grid::from_mask(mask.clone(), data.sub_size);
        let model_image = grid.array_from_sub_values(&data.quantity.evaluate(plane, &grid)?)?;
        let image = mask.apply(&data.image)?;
        let noise_map = mask.apply(&data.noise_map)?;
        let Residuals {
            residual_map,
            normalized_residual_map,
            chi_squared_map,
        } = Residuals::new(&image, &noise_map, &model_image, mask)?;
        let log_likelihood = log_likelihood(&chi_squared_map, &noise_map, mask);
        Ok(Self {
            data: data.clone(),
            plane: plane.clone(),
            image,
            noise_map,
            model_image,
            residual_map,
            normalized_residual_map,
            chi_squared_map,
            log_likelihood,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::GalaxyQuantity,
        galaxy::{Galaxy, Named},
        fit::FitError,
        profiles::{EvalError, SphericalIsothermal},
        structures::Mask,
    };

    #[test]
    fn deflection_components() {
        let mask = Mask::circular((7, 7), (0.1, 0.1), 0.3);
        let plane = Plane::new(vec![Named::new(
            "lens",
            Galaxy::new(0.5).mass(
                "sis",
                SphericalIsothermal {
                    centre: [0., 0.],
                    einstein_radius: 1.,
                },
            ),
        )]);
        let noise = Array2D::full(1., (7, 7), (0.1, 0.1));
        let zeros = Array2D::zeros((7, 7), (0.1, 0.1));
        let data = GalaxyData::new(zeros.clone(), noise.clone(), GalaxyQuantity::DeflectionsX, mask.clone());
        let fit = FitGalaxy::new(&data, &plane).unwrap();
        // pixel (3, 4) lies on the positive x axis
        assert!((fit.model_image.get(3, 4) - 1.).abs() < 1e-12);
        assert!(fit.model_image.get(2, 3).abs() < 1e-12);

        let data = GalaxyData::new(zeros, noise, GalaxyQuantity::Image, mask);
        assert!(matches!(
            FitGalaxy::new(&data, &plane),
            Err(FitError::Eval(EvalError::Unsupported { .. }))
        ));
    }
}
