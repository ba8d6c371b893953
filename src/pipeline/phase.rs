//! Phases: one non-linear search of a model against a dataset
//!
//! A phase writes its outputs to `<output>/<folders...>/<name>/`:
//!
//! - `image/`: figures of the dataset and of the best fit
//! - `model.results`: best fit parameters with their errors
//! - `samples.csv`: weighted samples of the search
//! - `info.json`: the information passed to the pipeline

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use itertools::Itertools;

use super::{
    Model, ModelInstance, NonLinearSearch, PipelineError, Prior, Result, Samples, SearchKind,
    SearchSettings,
};
use crate::{
    config::Config,
    dataset::{Imaging, Interferometer},
    fit::{FitImaging, FitInterferometer},
    galaxy::{HyperGalaxy, Named, Plane},
    structures::{Array2D, Mask},
    visualizer::Visualizer,
};

/// Free-form information written next to the phase outputs
pub type Info = BTreeMap<String, serde_json::Value>;

/// Sub-grid size of the model images
const SUB_SIZE: usize = 2;

/// Priors of the `contribution_factor`, `noise_factor` and `noise_power` of a hyper galaxy
fn hyper_galaxy_priors() -> [Prior; 3] {
    [
        Prior::uniform(0., 1.),
        Prior::uniform(0., 1.),
        Prior::uniform(1., 3.),
    ]
}

/// The data a pipeline fits
#[derive(Debug, Clone)]
pub enum Dataset {
    Imaging(Imaging),
    Interferometer {
        interferometer: Interferometer,
        visibilities_mask: Vec<bool>,
    },
}
impl From<Imaging> for Dataset {
    fn from(imaging: Imaging) -> Self {
        Dataset::Imaging(imaging)
    }
}
impl From<Interferometer> for Dataset {
    /// Keeps every visibility
    fn from(interferometer: Interferometer) -> Self {
        Dataset::Interferometer {
            visibilities_mask: interferometer.visibilities_mask(),
            interferometer,
        }
    }
}
impl Dataset {
    pub fn kind(&self) -> &'static str {
        match self {
            Dataset::Imaging(_) => "imaging",
            Dataset::Interferometer { .. } => "interferometer",
        }
    }
}

/// Model image and galaxy images of a fit, from which hyper galaxies compute their contribution maps
#[derive(Debug, Clone, PartialEq)]
pub struct HyperImages {
    pub model_image: Array2D,
    pub galaxy_images: Vec<Named<Array2D>>,
}
impl HyperImages {
    /// Attaches the images to the galaxies carrying a hyper galaxy
    fn attach(&self, plane: Plane) -> Plane {
        Plane::new(
            plane
                .galaxies
                .into_iter()
                .map(|Named { name, value }| {
                    let galaxy_image = self.galaxy_images.iter().find(|g| g.name == name);
                    let value = match (value.hyper_galaxy.is_some(), galaxy_image) {
                        (true, Some(image)) => {
                            value.hyper_images(self.model_image.clone(), image.value.clone())
                        }
                        (true, None) => {
                            log::warn!("no hyper image of galaxy {name}");
                            value
                        }
                        _ => value,
                    };
                    Named { name, value }
                })
                .collect(),
        )
    }
    /// Contribution maps of the galaxies of `plane` carrying a hyper galaxy
    pub fn contribution_maps(&self, plane: &Plane) -> Vec<Named<Array2D>> {
        self.attach(plane.clone())
            .galaxies
            .into_iter()
            .filter_map(|g| g.value.contribution_map().map(|map| Named::new(g.name, map)))
            .collect()
    }
}

/// Hyper galaxies fitted on top of the best fit of a phase
#[derive(Debug, Clone, PartialEq)]
pub struct HyperResult {
    /// Best fit instance with the hyper galaxies set
    pub instance: ModelInstance,
    pub log_likelihood: f64,
}

/// What a phase hands over to the next phases
#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub name: String,
    /// Best fit galaxies
    pub instance: ModelInstance,
    /// The phase model with priors centred on the best fit
    pub model: Model,
    pub log_likelihood: f64,
    pub samples: Samples,
    pub hyper_combined: Option<HyperResult>,
    pub hyper_images: Option<HyperImages>,
}
impl PhaseResult {
    /// Result of the hyper phase this phase was extended with
    pub fn hyper_result(&self) -> Result<&HyperResult> {
        self.hyper_combined
            .as_ref()
            .ok_or_else(|| PipelineError::NoHyperResult(self.name.clone()))
    }
}

enum Fit {
    Imaging(FitImaging),
    Interferometer(FitInterferometer),
}
impl Fit {
    fn log_likelihood(&self) -> f64 {
        match self {
            Fit::Imaging(fit) => fit.log_likelihood,
            Fit::Interferometer(fit) => fit.log_likelihood,
        }
    }
    fn hyper_images(&self) -> HyperImages {
        let (model_image, galaxy_images) = match self {
            Fit::Imaging(fit) => (&fit.model_image, &fit.model_images_of_galaxies),
            Fit::Interferometer(fit) => (&fit.model_image, &fit.model_images_of_galaxies),
        };
        HyperImages {
            model_image: model_image.clone(),
            galaxy_images: galaxy_images.clone(),
        }
    }
}

/// Fits of the planes of a phase to its dataset
struct Analysis<'a> {
    dataset: &'a Dataset,
    mask: &'a Mask,
    hyper_images: Option<&'a HyperImages>,
}
impl Analysis<'_> {
    fn plane(&self, instance: &ModelInstance) -> Plane {
        let plane = instance.plane();
        match self.hyper_images {
            Some(images) => images.attach(plane),
            None => plane,
        }
    }
    fn fit(&self, plane: &Plane) -> Result<Fit> {
        Ok(match self.dataset {
            Dataset::Imaging(imaging) => {
                Fit::Imaging(FitImaging::new(imaging, self.mask, plane, SUB_SIZE)?)
            }
            Dataset::Interferometer {
                interferometer,
                visibilities_mask,
            } => Fit::Interferometer(FitInterferometer::new(
                interferometer,
                visibilities_mask,
                self.mask,
                plane,
                SUB_SIZE,
            )?),
        })
    }
    fn log_likelihood(&self, instance: &ModelInstance) -> Result<f64> {
        Ok(self.fit(&self.plane(instance))?.log_likelihood())
    }
    fn visualize(&self, visualizer: &Visualizer, fit: &Fit, subfolders: Option<&str>) -> Result<()> {
        match fit {
            Fit::Imaging(fit) => {
                visualizer.visualize_fit_imaging(fit, false, subfolders)?;
                if let Some(inversion) = &fit.inversion {
                    visualizer.visualize_inversion(inversion, false)?;
                }
            }
            Fit::Interferometer(fit) => {
                visualizer.visualize_fit_interferometer(fit, false, subfolders)?
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PhaseKind {
    Imaging,
    Interferometer { real_space_mask: Mask },
}

/// A named stage of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    name: String,
    folders: Vec<String>,
    model: Model,
    kind: PhaseKind,
    search: SearchKind,
    settings: SearchSettings,
    hyper: bool,
}
impl Phase {
    pub fn imaging(name: impl Into<String>, folders: &[String], model: Model) -> Self {
        Self {
            name: name.into(),
            folders: folders.to_vec(),
            model,
            kind: PhaseKind::Imaging,
            search: SearchKind::default(),
            settings: SearchSettings::default(),
            hyper: false,
        }
    }
    pub fn interferometer(
        name: impl Into<String>,
        folders: &[String],
        model: Model,
        real_space_mask: Mask,
    ) -> Self {
        Self {
            kind: PhaseKind::Interferometer { real_space_mask },
            ..Self::imaging(name, folders, model)
        }
    }
    pub fn search_kind(self, search: SearchKind) -> Self {
        Self { search, ..self }
    }
    pub fn n_live_points(mut self, n_live_points: usize) -> Self {
        self.settings.n_live_points = Some(n_live_points);
        self
    }
    pub fn sampling_efficiency(mut self, sampling_efficiency: f64) -> Self {
        self.settings.sampling_efficiency = Some(sampling_efficiency);
        self
    }
    pub fn const_efficiency_mode(mut self, const_efficiency_mode: bool) -> Self {
        self.settings.const_efficiency_mode = Some(const_efficiency_mode);
        self
    }
    /// Fits the hyper galaxies of every galaxy after the main search
    pub fn extend_with_hyper_phase(self) -> Self {
        Self {
            hyper: true,
            ..self
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn model(&self) -> &Model {
        &self.model
    }
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }
    pub fn search(&self) -> SearchKind {
        self.search
    }
    /// Folder of the phase outputs
    pub fn output_path<P: AsRef<Path>>(&self, output_path: P) -> PathBuf {
        self.folders
            .iter()
            .fold(output_path.as_ref().to_path_buf(), |path, folder| path.join(folder))
            .join(&self.name)
    }
    fn search_with(&self, config: &Config) -> Box<dyn NonLinearSearch> {
        self.search.build(config.nest_config(), &self.settings)
    }

    /// Runs the search, writes the phase outputs and returns the phase result
    ///
    /// Hyper galaxies use the hyper images of the `previous` phase.
    pub fn run(
        &self,
        dataset: &Dataset,
        mask: &Mask,
        info: &Info,
        config: &Rc<Config>,
        previous: Option<&PhaseResult>,
    ) -> Result<PhaseResult> {
        let mask = match (&self.kind, dataset) {
            (PhaseKind::Imaging, Dataset::Imaging(_)) => mask,
            (PhaseKind::Interferometer { real_space_mask }, Dataset::Interferometer { .. }) => {
                real_space_mask
            }
            _ => {
                return Err(PipelineError::DatasetKind {
                    phase: self.name.clone(),
                    dataset: dataset.kind(),
                })
            }
        };
        if self.hyper && !matches!(dataset, Dataset::Imaging(_)) {
            return Err(PipelineError::HyperInterferometer(self.name.clone()));
        }
        let path = self.output_path(config.output_path());
        fs::create_dir_all(&path).map_err(|e| PipelineError::CreateDir(e, path.clone()))?;
        let mut search = self.search_with(config);
        log::info!(
            "Running phase {} with the {} search, {} free parameters",
            self.name,
            search.name(),
            self.model.prior_count()
        );

        let analysis = Analysis {
            dataset,
            mask,
            hyper_images: previous.and_then(|r| r.hyper_images.as_ref()),
        };
        let samples = search.fit(&self.model.priors(), &mut |vector: &[f64]| {
            analysis.log_likelihood(&self.model.instance_from_vector(vector)?)
        })?;
        let best = samples.max_log_likelihood_sample()?;
        let instance = self.model.instance_from_vector(&best.parameters)?;
        let plane = analysis.plane(&instance);
        let fit = analysis.fit(&plane)?;
        let hyper_images = fit.hyper_images();

        let visualizer = Visualizer::new(path.join("image"), config.clone())?;
        match dataset {
            Dataset::Imaging(imaging) => visualizer.visualize_imaging(imaging)?,
            Dataset::Interferometer { interferometer, .. } => {
                visualizer.visualize_interferometer(interferometer)?
            }
        }
        analysis.visualize(&visualizer, &fit, None)?;
        if visualizer.plot_fit_no_hyper && plane.has_hyper_galaxy() {
            let mut no_hyper = plane.clone();
            no_hyper
                .galaxies
                .iter_mut()
                .for_each(|g| g.value.hyper_galaxy = None);
            analysis.visualize(&visualizer, &analysis.fit(&no_hyper)?, Some("fit_no_hyper"))?;
        }

        let hyper_combined = if self.hyper {
            let hyper = self.run_hyper(dataset, mask, config, &instance, &hyper_images, &path)?;
            let plane = hyper.instance.plane();
            visualizer.visualize_hyper_images(
                &hyper_images.galaxy_images,
                &hyper_images.model_image,
                &hyper_images.contribution_maps(&plane),
            )?;
            Some(hyper)
        } else {
            None
        };

        let parameter_names = self.model.parameter_names();
        let errors = samples.errors();
        self.write_results(&path, &parameter_names, &samples, &best.parameters, &errors)?;
        samples.to_csv(path.join("samples.csv"), &parameter_names)?;
        let info_path = path.join("info.json");
        fs::write(&info_path, serde_json::to_string_pretty(info)?)
            .map_err(|e| PipelineError::Write(e, info_path))?;

        let model = self.model.continued(
            &best.parameters,
            &errors,
            &config.nest_config().prior_passing,
        )?;
        log::info!(
            "Phase {} finished, maximum log likelihood {:.3}",
            self.name,
            best.log_likelihood
        );
        Ok(PhaseResult {
            name: self.name.clone(),
            instance,
            model,
            log_likelihood: best.log_likelihood,
            samples: samples.clone(),
            hyper_combined,
            hyper_images: Some(hyper_images),
        })
    }

    /// Fits the hyper galaxies of every galaxy of `instance`, the galaxies being fixed
    fn run_hyper(
        &self,
        dataset: &Dataset,
        mask: &Mask,
        config: &Config,
        instance: &ModelInstance,
        hyper_images: &HyperImages,
        path: &Path,
    ) -> Result<HyperResult> {
        let analysis = Analysis {
            dataset,
            mask,
            hyper_images: Some(hyper_images),
        };
        let with_hyper_galaxies = |vector: &[f64]| -> ModelInstance {
            ModelInstance {
                galaxies: instance
                    .galaxies
                    .iter()
                    .zip(vector.chunks_exact(3))
                    .map(|(g, p)| {
                        let hyper = HyperGalaxy::from_parameters([p[0], p[1], p[2]]);
                        Named::new(g.name.clone(), g.value.clone().hyper_galaxy(hyper))
                    })
                    .collect(),
            }
        };
        let priors: Vec<Prior> = instance
            .galaxies
            .iter()
            .flat_map(|_| hyper_galaxy_priors())
            .collect();
        let parameter_names: Vec<String> = instance
            .galaxies
            .iter()
            .flat_map(|g| {
                HyperGalaxy::PARAMETER_NAMES
                    .iter()
                    .map(move |name| format!("{}.hyper_galaxy.{name}", g.name))
            })
            .collect();

        log::info!("Running the hyper galaxies of phase {}", self.name);
        let mut search = self.search_with(config);
        let samples = search.fit(&priors, &mut |vector: &[f64]| {
            analysis.log_likelihood(&with_hyper_galaxies(vector))
        })?;
        let best = samples.max_log_likelihood_sample()?;

        let hyper_path = path.join("hyper_combined");
        fs::create_dir_all(&hyper_path)
            .map_err(|e| PipelineError::CreateDir(e, hyper_path.clone()))?;
        samples.to_csv(hyper_path.join("samples.csv"), &parameter_names)?;
        Ok(HyperResult {
            instance: with_hyper_galaxies(&best.parameters),
            log_likelihood: best.log_likelihood,
        })
    }

    fn write_results(
        &self,
        path: &Path,
        parameter_names: &[String],
        samples: &Samples,
        best: &[f64],
        errors: &[f64],
    ) -> Result<()> {
        let header = [
            Some(format!("phase: {}", self.name)),
            Some(format!("search: {}", self.search)),
            samples
                .max_log_likelihood_sample()
                .ok()
                .map(|sample| format!("maximum log likelihood: {}", sample.log_likelihood)),
            samples
                .log_evidence
                .map(|log_evidence| format!("log evidence: {log_evidence}")),
        ];
        let parameters = parameter_names
            .iter()
            .zip(best)
            .zip(errors)
            .map(|((name, value), error)| format!("{name:<50} {value:.4} ({error:.4})"));
        let results = format!(
            "{}\n\n{}\n",
            header.into_iter().flatten().join("\n"),
            parameters.format("\n")
        );
        let results_path = path.join("model.results");
        fs::write(&results_path, results).map_err(|e| PipelineError::Write(e, results_path))?;
        Ok(())
    }
}
