//! Configuration driven figures of the data products
//!
//! For every product the [Visualizer] looks up one flag per quantity in the
//! product section of the plots configuration and writes the figures of the
//! quantities that are switched on, under a subfolder of the image path named
//! after the product. Post-fit calls may write every figure again, as PNG and
//! as FITS.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use strum::IntoEnumIterator;

use crate::{
    config::{Config, Section},
    dataset::{Imaging, Interferometer},
    fit::{FitGalaxy, FitImaging, FitInterferometer},
    galaxy::Named,
    inversion::Inversion,
    plot::{
        products::Product, ArrayPlotter, Figure, Format, Include, Plotter, Result, SubPlotter,
        Visuals,
    },
    structures::{Array2D, Mask},
};

pub const FIT_IMAGING_FOLDER: &str = "fit_imaging";
pub const FIT_INTERFEROMETER_FOLDER: &str = "fit_interferometer";

pub struct Visualizer {
    image_path: PathBuf,
    config: Rc<Config>,
    include: Include,
    /// Whether the fit without the hyper galaxies is plotted as well
    pub plot_fit_no_hyper: bool,
}
impl Visualizer {
    pub fn new<P: AsRef<Path>>(image_path: P, config: Rc<Config>) -> Result<Self> {
        let plot_fit_no_hyper = config.plot_setting(Section::Hyper, "fit_no_hyper")?;
        Ok(Self {
            image_path: image_path.as_ref().to_path_buf(),
            include: config.include_config().clone(),
            config,
            plot_fit_no_hyper,
        })
    }
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }
    fn should_plot(&self, section: Section, name: &str) -> Result<bool> {
        Ok(self.config.plot_setting(section, name)?)
    }
    fn plotter(&self, subfolders: &str) -> Result<Plotter> {
        Plotter::from_config(&self.config, self.image_path.join(subfolders), Format::Png)
    }
    /// Figures of the quantities switched on, or of every quantity if `all`
    fn figure_individuals<P: Product>(
        &self,
        product: &P,
        plotter: &mut Plotter,
        all: bool,
    ) -> Result<()> {
        let visuals = product.visuals(&self.include)?;
        for quantity in P::Quantity::iter() {
            if all || self.should_plot(P::SECTION, quantity.as_ref())? {
                for (name, figure) in product.figures(quantity)? {
                    plotter.plot_figure(&name, figure, &visuals)?;
                }
            } else {
                log::debug!("skipping {quantity:?} of the {} section", P::SECTION);
            }
        }
        Ok(())
    }
    /// PNG then FITS copies of every figure of a product, as switched on by the `all_at_end_*` flags
    fn figure_all_at_end<P: Product>(
        &self,
        product: &P,
        plotter: &mut Plotter,
        subfolders: &str,
    ) -> Result<()> {
        if self.should_plot(P::SECTION, "all_at_end_png")? {
            self.figure_individuals(product, plotter, true)?;
        }
        if self.should_plot(P::SECTION, "all_at_end_fits")? {
            let mut fits_plotter =
                plotter.with_output(self.image_path.join(subfolders).join("fits"), Format::Fits);
            self.figure_individuals(product, &mut fits_plotter, true)?;
        }
        Ok(())
    }

    pub fn visualize_imaging(&self, imaging: &Imaging) -> Result<()> {
        let mut plotter = self.plotter("imaging")?;
        self.figure_individuals(imaging, &mut plotter, false)?;
        if self.should_plot(Section::Dataset, "subplot_dataset")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_imaging",
                imaging.all_figures()?,
                &imaging.visuals(&self.include)?,
            )?;
        }
        Ok(())
    }

    /// Figures of an imaging fit, under `subfolders` (default [FIT_IMAGING_FOLDER])
    pub fn visualize_fit_imaging(
        &self,
        fit: &FitImaging,
        during_analysis: bool,
        subfolders: Option<&str>,
    ) -> Result<()> {
        let subfolders = subfolders.unwrap_or(FIT_IMAGING_FOLDER);
        let mut plotter = self.plotter(subfolders)?;
        self.figure_individuals(fit, &mut plotter, false)?;
        let visuals = fit.visuals(&self.include)?;
        if self.should_plot(Section::Fit, "subplot_fit")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_fit_imaging",
                fit.all_figures()?,
                &visuals,
            )?;
        }
        if self.should_plot(Section::Fit, "subplots_of_galaxies_fits")? {
            let subtracted = fit.subtracted_images_of_galaxies()?;
            for (i, (subtracted, model)) in subtracted
                .into_iter()
                .zip(&fit.model_images_of_galaxies)
                .enumerate()
            {
                let figures = vec![
                    (String::from("image"), Figure::from(fit.image.clone())),
                    (
                        format!("subtracted_image_of_{}", subtracted.name),
                        subtracted.value.into(),
                    ),
                    (
                        format!("model_image_of_{}", model.name),
                        model.value.clone().into(),
                    ),
                ];
                subplot(
                    &mut plotter.sub_plotter(),
                    &format!("subplot_of_galaxy_{i}"),
                    figures,
                    &visuals,
                )?;
            }
        }
        if !during_analysis {
            self.figure_all_at_end(fit, &mut plotter, subfolders)?;
        }
        Ok(())
    }

    pub fn visualize_interferometer(&self, interferometer: &Interferometer) -> Result<()> {
        let mut plotter = self.plotter("interferometer")?;
        if self.should_plot(Section::Dataset, "subplot_dataset")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_interferometer",
                interferometer.all_figures()?,
                &Visuals::default(),
            )?;
        }
        self.figure_individuals(interferometer, &mut plotter, false)
    }

    /// Figures of an interferometer fit, under `subfolders` (default [FIT_INTERFEROMETER_FOLDER])
    pub fn visualize_fit_interferometer(
        &self,
        fit: &FitInterferometer,
        during_analysis: bool,
        subfolders: Option<&str>,
    ) -> Result<()> {
        let subfolders = subfolders.unwrap_or(FIT_INTERFEROMETER_FOLDER);
        let mut plotter = self.plotter(subfolders)?;
        if self.should_plot(Section::Fit, "subplot_fit")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_fit_interferometer",
                fit.all_figures()?,
                &Visuals::default(),
            )?;
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_fit_real_space",
                fit.real_space_figures(),
                &fit.visuals(&self.include)?,
            )?;
        }
        self.figure_individuals(fit, &mut plotter, false)?;
        if !during_analysis {
            self.figure_all_at_end(fit, &mut plotter, subfolders)?;
        }
        Ok(())
    }

    /// Figures of an inversion, every figure once the analysis is over
    pub fn visualize_inversion(&self, inversion: &Inversion, during_analysis: bool) -> Result<()> {
        let mut plotter = self.plotter("inversion")?;
        if self.should_plot(Section::Inversion, "subplot_inversion")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_inversion",
                inversion.all_figures()?,
                &inversion.visuals(&self.include)?,
            )?;
        }
        self.figure_individuals(inversion, &mut plotter, false)?;
        if !during_analysis {
            self.figure_individuals(inversion, &mut plotter, true)?;
        }
        Ok(())
    }

    /// Hyper images of the galaxies, with the model image and the contribution maps
    pub fn visualize_hyper_images(
        &self,
        hyper_galaxy_images: &[Named<Array2D>],
        hyper_model_image: &Array2D,
        contribution_maps_of_galaxies: &[Named<Array2D>],
    ) -> Result<()> {
        let mut plotter = self.plotter("hyper")?;
        let geometry = Mask::unmasked(hyper_model_image.shape(), hyper_model_image.pixel_scales());
        let visuals = self.include.visuals(&geometry, None, None, None)?;
        if self.should_plot(Section::Hyper, "model_image")? {
            plotter.plot_array("hyper_model_image", hyper_model_image, &visuals)?;
        }
        let galaxy_figures = |prefix: &str, maps: &[Named<Array2D>]| -> Vec<(String, Figure)> {
            maps.iter()
                .map(|m| (format!("{prefix}{}", m.name), m.value.clone().into()))
                .collect()
        };
        if self.should_plot(Section::Hyper, "images_of_galaxies")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_hyper_images_of_galaxies",
                galaxy_figures("hyper_galaxy_image_of_", hyper_galaxy_images),
                &visuals,
            )?;
        }
        if self.should_plot(Section::Hyper, "contribution_maps_of_galaxies")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_contribution_maps_of_galaxies",
                galaxy_figures("contribution_map_of_", contribution_maps_of_galaxies),
                &visuals,
            )?;
        }
        Ok(())
    }

    /// Figures of a galaxy fit, `visuals` replaces the overlays of the include policy
    pub fn visualize_galaxy_fit(&self, fit: &FitGalaxy, visuals: Option<&Visuals>) -> Result<()> {
        let mut plotter = self.plotter("galaxy_fit")?;
        let visuals = match visuals {
            Some(visuals) => visuals.clone(),
            None => fit.visuals(&self.include)?,
        };
        if self.should_plot(Section::GalaxyFit, "subplot_galaxy_fit")? {
            subplot(
                &mut plotter.sub_plotter(),
                "subplot_fit_galaxy",
                fit.all_figures()?,
                &visuals,
            )?;
        }
        for quantity in <FitGalaxy as Product>::Quantity::iter() {
            if self.should_plot(Section::GalaxyFit, quantity.as_ref())? {
                for (name, figure) in fit.figures(quantity)? {
                    plotter.plot_figure(&name, figure, &visuals)?;
                }
            }
        }
        Ok(())
    }
}

/// Writes `figures` as the cells of one composite figure
fn subplot(
    sub_plotter: &mut SubPlotter,
    name: &str,
    figures: Vec<(String, Figure)>,
    visuals: &Visuals,
) -> Result<()> {
    sub_plotter.open(name);
    for (cell, figure) in figures {
        sub_plotter.plot_figure(&cell, figure, visuals)?;
    }
    sub_plotter.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotsConfig;

    #[test]
    fn fit_no_hyper_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let config = Rc::new(Config::new(dir.path()));
        assert!(Visualizer::new(dir.path(), config).is_err());
        let config = Rc::new(
            Config::new(dir.path()).plots(PlotsConfig::default().set(
                Section::Hyper,
                "fit_no_hyper",
                true,
            )),
        );
        assert!(Visualizer::new(dir.path(), config).unwrap().plot_fit_no_hyper);
    }
}
