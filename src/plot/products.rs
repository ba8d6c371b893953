//! Figures of the data products
//!
//! Every product lists the quantities it can plot, named by their key in its
//! section of the plots configuration, and the files each quantity produces.

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};

use super::{Figure, Include, Result, Visuals};
use crate::{
    config::Section,
    dataset::{Imaging, Interferometer},
    fit::{FitGalaxy, FitImaging, FitInterferometer},
    inversion::Inversion,
    structures::{Array2D, Mask},
};

/// A data product with configurable figures
pub trait Product {
    type Quantity: IntoEnumIterator + AsRef<str> + Copy + std::fmt::Debug;
    /// Section of the plots configuration
    const SECTION: Section;
    /// Named figures of one quantity
    fn figures(&self, quantity: Self::Quantity) -> Result<Vec<(String, Figure)>>;
    /// Overlays of the array figures
    fn visuals(&self, include: &Include) -> Result<Visuals>;
    /// Named figures of every quantity
    fn all_figures(&self) -> Result<Vec<(String, Figure)>> {
        let mut figures = Vec::new();
        for quantity in Self::Quantity::iter() {
            figures.extend(self.figures(quantity)?);
        }
        Ok(figures)
    }
}

fn named(name: &str, figure: impl Into<Figure>) -> Vec<(String, Figure)> {
    vec![(name.to_string(), figure.into())]
}

/// Complex values `[real, imag]` as points with the imaginary part on the vertical axis
fn complex_points(values: &[[f64; 2]]) -> Figure {
    Figure::Points(values.iter().map(|&[re, im]| [im, re]).collect())
}

fn indexed_line(values: Vec<f64>) -> Figure {
    Figure::Line {
        points: values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as f64, v))
            .collect(),
        log_y: false,
    }
}

fn origin_only(include: &Include, array: &Array2D) -> Result<Visuals> {
    let geometry = Mask::unmasked(array.shape(), array.pixel_scales());
    Ok(include.visuals(&geometry, None, None, None)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ImagingPlot {
    Data,
    NoiseMap,
    Psf,
    InverseNoiseMap,
    SignalToNoiseMap,
    AbsoluteSignalToNoiseMap,
    PotentialChiSquaredMap,
}
impl Product for Imaging {
    type Quantity = ImagingPlot;
    const SECTION: Section = Section::Dataset;
    fn figures(&self, quantity: ImagingPlot) -> Result<Vec<(String, Figure)>> {
        use ImagingPlot::*;
        Ok(match quantity {
            Data => named("image", self.image.clone()),
            NoiseMap => named("noise_map", self.noise_map.clone()),
            Psf => named("psf", self.psf.array().clone()),
            InverseNoiseMap => named("inverse_noise_map", self.inverse_noise_map()),
            SignalToNoiseMap => named("signal_to_noise_map", self.signal_to_noise_map()),
            AbsoluteSignalToNoiseMap => named(
                "absolute_signal_to_noise_map",
                self.absolute_signal_to_noise_map(),
            ),
            PotentialChiSquaredMap => {
                named("potential_chi_squared_map", self.potential_chi_squared_map())
            }
        })
    }
    fn visuals(&self, include: &Include) -> Result<Visuals> {
        origin_only(include, &self.image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FitImagingPlot {
    Data,
    NoiseMap,
    SignalToNoiseMap,
    ModelData,
    ResidualMap,
    ChiSquaredMap,
    NormalizedResidualMap,
    SubtractedImagesOfGalaxies,
    ModelImagesOfGalaxies,
}
impl Product for FitImaging {
    type Quantity = FitImagingPlot;
    const SECTION: Section = Section::Fit;
    fn figures(&self, quantity: FitImagingPlot) -> Result<Vec<(String, Figure)>> {
        use FitImagingPlot::*;
        Ok(match quantity {
            Data => named("image", self.image.clone()),
            NoiseMap => named("noise_map", self.noise_map.clone()),
            SignalToNoiseMap => named("signal_to_noise_map", self.signal_to_noise_map()?),
            ModelData => named("model_image", self.model_image.clone()),
            ResidualMap => named("residual_map", self.residual_map.clone()),
            ChiSquaredMap => named("chi_squared_map", self.chi_squared_map.clone()),
            NormalizedResidualMap => {
                named("normalized_residual_map", self.normalized_residual_map.clone())
            }
            SubtractedImagesOfGalaxies => self
                .subtracted_images_of_galaxies()?
                .into_iter()
                .map(|g| (format!("subtracted_image_of_{}", g.name), g.value.into()))
                .collect(),
            ModelImagesOfGalaxies => self
                .model_images_of_galaxies
                .iter()
                .map(|g| (format!("model_image_of_{}", g.name), g.value.clone().into()))
                .collect(),
        })
    }
    fn visuals(&self, include: &Include) -> Result<Visuals> {
        Ok(include.visuals(&self.mask, Some(&self.mask), Some(&self.plane), None)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum InterferometerPlot {
    Data,
    UvWavelengths,
}
impl Product for Interferometer {
    type Quantity = InterferometerPlot;
    const SECTION: Section = Section::Dataset;
    fn figures(&self, quantity: InterferometerPlot) -> Result<Vec<(String, Figure)>> {
        Ok(match quantity {
            InterferometerPlot::Data => named("visibilities", complex_points(&self.visibilities)),
            InterferometerPlot::UvWavelengths => vec![
                (String::from("u_wavelengths"), indexed_line(self.u_wavelengths())),
                (String::from("v_wavelengths"), indexed_line(self.v_wavelengths())),
            ],
        })
    }
    fn visuals(&self, _include: &Include) -> Result<Visuals> {
        Ok(Visuals::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FitInterferometerPlot {
    Data,
    NoiseMap,
    SignalToNoiseMap,
    ModelData,
    ResidualMap,
    NormalizedResidualMap,
    ChiSquaredMap,
}
impl Product for FitInterferometer {
    type Quantity = FitInterferometerPlot;
    const SECTION: Section = Section::Fit;
    fn figures(&self, quantity: FitInterferometerPlot) -> Result<Vec<(String, Figure)>> {
        use FitInterferometerPlot::*;
        let (name, values) = match quantity {
            Data => ("visibilities", self.visibilities.clone()),
            NoiseMap => ("noise_map", self.noise_map.clone()),
            SignalToNoiseMap => ("signal_to_noise_map", self.signal_to_noise_map()),
            ModelData => ("model_visibilities", self.model_visibilities.clone()),
            ResidualMap => ("residual_map", self.residual_map.clone()),
            NormalizedResidualMap => {
                ("normalized_residual_map", self.normalized_residual_map.clone())
            }
            ChiSquaredMap => ("chi_squared_map", self.chi_squared_map.clone()),
        };
        Ok(named(name, complex_points(&values)))
    }
    /// Overlays of the real space figures
    fn visuals(&self, include: &Include) -> Result<Visuals> {
        Ok(include.visuals(
            &self.real_space_mask,
            Some(&self.real_space_mask),
            Some(&self.plane),
            None,
        )?)
    }
}
impl FitInterferometer {
    /// Real space model image followed by the model image of every galaxy
    pub fn real_space_figures(&self) -> Vec<(String, Figure)> {
        let mut figures = named("model_image", self.model_image.clone());
        figures.extend(
            self.model_images_of_galaxies
                .iter()
                .map(|g| (format!("model_image_of_{}", g.name), g.value.clone().into())),
        );
        figures
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum InversionPlot {
    Reconstruction,
    Errors,
    ResidualMap,
    NormalizedResidualMap,
    ChiSquaredMap,
    RegularizationWeights,
    InterpolatedReconstruction,
    InterpolatedErrors,
}
impl Product for Inversion {
    type Quantity = InversionPlot;
    const SECTION: Section = Section::Inversion;
    fn figures(&self, quantity: InversionPlot) -> Result<Vec<(String, Figure)>> {
        use InversionPlot::*;
        Ok(match quantity {
            Reconstruction => vec![
                (
                    String::from("reconstructed_image"),
                    self.reconstructed_image.clone().into(),
                ),
                (
                    String::from("reconstruction"),
                    indexed_line(self.reconstruction.clone()),
                ),
            ],
            Errors => named("errors", indexed_line(self.errors.clone())),
            ResidualMap => named("residual_map", self.residual_map.clone()),
            NormalizedResidualMap => {
                named("normalized_residual_map", self.normalized_residual_map.clone())
            }
            ChiSquaredMap => named("chi_squared_map", self.chi_squared_map.clone()),
            RegularizationWeights => {
                named("regularization_weights", self.regularization_weights_map()?)
            }
            InterpolatedReconstruction => named(
                "interpolated_reconstruction",
                self.interpolated_reconstruction()?,
            ),
            InterpolatedErrors => named("interpolated_errors", self.interpolated_errors()?),
        })
    }
    fn visuals(&self, include: &Include) -> Result<Visuals> {
        origin_only(include, &self.reconstructed_image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GalaxyFitPlot {
    Image,
    NoiseMap,
    ModelImage,
    ResidualMap,
    ChiSquaredMap,
}
impl Product for FitGalaxy {
    type Quantity = GalaxyFitPlot;
    const SECTION: Section = Section::GalaxyFit;
    fn figures(&self, quantity: GalaxyFitPlot) -> Result<Vec<(String, Figure)>> {
        use GalaxyFitPlot::*;
        let (name, array) = match quantity {
            Image => ("image", &self.image),
            NoiseMap => ("noise_map", &self.noise_map),
            ModelImage => ("model_image", &self.model_image),
            ResidualMap => ("residual_map", &self.residual_map),
            ChiSquaredMap => ("chi_squared_map", &self.chi_squared_map),
        };
        Ok(named(name, array.clone()))
    }
    fn visuals(&self, include: &Include) -> Result<Visuals> {
        let mask = &self.data.mask;
        Ok(include.visuals(mask, Some(mask), Some(&self.plane), None)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::Kernel;

    #[test]
    fn configuration_keys() {
        let keys: Vec<String> = FitImagingPlot::iter()
            .map(|q| q.as_ref().to_string())
            .collect();
        assert_eq!(keys[0], "data");
        assert!(keys.iter().any(|key| key == "subtracted_images_of_galaxies"));
        assert_eq!(InterferometerPlot::UvWavelengths.as_ref(), "uv_wavelengths");
    }

    #[test]
    fn imaging_file_names() {
        let array = Array2D::full(1., (3, 3), (0.1, 0.1));
        let imaging = Imaging::new(
            "test",
            array.clone(),
            array,
            Kernel::no_blur((0.1, 0.1)),
        )
        .unwrap();
        let names: Vec<String> = imaging
            .all_figures()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "image");
        assert_eq!(names[2], "psf");
    }
}
