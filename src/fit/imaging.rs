use super::{log_likelihood, Residuals, Result};
use crate::{
    dataset::Imaging,
    galaxy::{Named, Plane},
    inversion::Inversion,
    profiles::Evaluable,
    structures::{Array2D, Grid, Mask},
};

/// Fit of a plane of galaxies to imaging
///
/// The image of every galaxy is computed on the sub-grid of the mask, binned,
/// blurred by the PSF and summed into the model image. Hyper galaxies scale
/// the noise map with their contribution maps. If a galaxy carries a
/// pixelization, the residual light is reconstructed by an [Inversion].
#[derive(Debug, Clone)]
pub struct FitImaging {
    pub mask: Mask,
    pub plane: Plane,
    pub image: Array2D,
    pub noise_map: Array2D,
    pub psf: Array2D,
    pub model_image: Array2D,
    pub residual_map: Array2D,
    pub normalized_residual_map: Array2D,
    pub chi_squared_map: Array2D,
    /// Blurred image of every galaxy
    pub model_images_of_galaxies: Vec<Named<Array2D>>,
    pub inversion: Option<Inversion>,
    pub log_likelihood: f64,
}
impl FitImaging {
    pub fn new(imaging: &Imaging, mask: &Mask, plane: &Plane, sub_size: usize) -> Result<Self> {
        let grid = Grid::from_mask(mask.clone(), sub_size);
        let image = mask.apply(&imaging.image)?;

        let mut noise_map = imaging.noise_map.clone();
        for galaxy in plane.galaxies.iter().map(|g| &g.value) {
            if let (Some(hyper), Some(contribution_map)) =
                (galaxy.hyper_galaxy, galaxy.contribution_map())
            {
                let hyper_noise = hyper.hyper_noise_map(&imaging.noise_map, &contribution_map)?;
                noise_map = noise_map.zip_with(&hyper_noise, |n, h| n + h)?;
            }
        }

        let mut model_images_of_galaxies = Vec::with_capacity(plane.galaxies.len());
        let mut model_image = Array2D::zeros(mask.shape(), mask.pixel_scales());
        for (galaxy, values) in plane
            .galaxies
            .iter()
            .zip(plane.images_of_galaxies(&grid)?)
        {
            let blurred = mask.apply(&imaging.psf.convolve(&grid.array_from_sub_values(&values)?))?;
            model_image = model_image.zip_with(&blurred, |a, b| a + b)?;
            model_images_of_galaxies.push(Named::new(galaxy.name.clone(), blurred));
        }

        let inversion = match plane.pixelization() {
            Some(pixelization) => {
                let profile_subtracted = image.zip_with(&model_image, |d, m| d - m)?;
                let inversion = Inversion::imaging(
                    &profile_subtracted,
                    &noise_map,
                    &imaging.psf,
                    &grid,
                    pixelization,
                )?;
                model_image =
                    model_image.zip_with(&inversion.reconstructed_image, |a, b| a + b)?;
                Some(inversion)
            }
            None => None,
        };

        let noise_map = mask.apply(&noise_map)?;
        let Residuals {
            residual_map,
            normalized_residual_map,
            chi_squared_map,
        } = Residuals::new(&image, &noise_map, &model_image, mask)?;
        let log_likelihood = log_likelihood(&chi_squared_map, &noise_map, mask)
            + inversion
                .as_ref()
                .map_or(0., |inversion| inversion.evidence_terms());

        Ok(Self {
            mask: mask.clone(),
            plane: plane.clone(),
            image,
            noise_map,
            psf: imaging.psf.array().clone(),
            model_image,
            residual_map,
            normalized_residual_map,
            chi_squared_map,
            model_images_of_galaxies,
            inversion,
            log_likelihood,
        })
    }
    pub fn signal_to_noise_map(&self) -> Result<Array2D> {
        Ok(self
            .image
            .zip_with(&self.noise_map, |s, n| if n > 0. { s / n } else { 0. })?)
    }
    /// Image minus the model images of every other galaxy
    pub fn subtracted_images_of_galaxies(&self) -> Result<Vec<Named<Array2D>>> {
        self.model_images_of_galaxies
            .iter()
            .map(|galaxy| {
                let others = self.model_image.zip_with(&galaxy.value, |m, g| m - g)?;
                Ok(Named::new(
                    galaxy.name.clone(),
                    self.image.zip_with(&others, |d, o| d - o)?,
                ))
            })
            .collect()
    }
    pub fn galaxy_names(&self) -> Vec<String> {
        self.plane.names().map(String::from).collect()
    }
    pub fn chi_squared(&self) -> f64 {
        self.chi_squared_map.sum()
    }
    /// Unblurred image of the plane on the mask grid
    pub fn plane_image(&self, sub_size: usize) -> Result<Array2D> {
        let grid = Grid::from_mask(self.mask.clone(), sub_size);
        Ok(grid.array_from_sub_values(&self.plane.profile_image(&grid)?)?)
    }
}
