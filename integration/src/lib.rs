//! Test pipelines fitting simulated galaxy datasets
//!
//! A [TestModule] names a dataset (`data_label` simulated for an `instrument`)
//! and builds the [Pipeline] fitting it. The [Runner] loads the configuration
//! and the dataset, builds the default mask and runs the pipeline, writing to
//! `<test_path>/output/<imaging|interferometer>/<test_type>/<test_name>/`.

use std::{fmt, rc::Rc};

use galaxy_viz::{
    config::{Config, ConfigError},
    dataset::DatasetError,
    pipeline::{self, Pipeline, PipelineError, SearchKind},
    structures::Mask,
};

pub mod imaging;
pub mod interferometer;
mod runner;
pub mod simulators;

pub use runner::{Runner, MASK_RADIUS};

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("no galaxies are simulated for the {0} dataset")]
    UnknownDataLabel(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
pub type Result<T> = std::result::Result<T, IntegrationError>;

/// Kind of data a test module fits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Imaging,
    Interferometer,
}
impl DatasetKind {
    /// Output folder of the runs
    pub fn folder(&self) -> &'static str {
        match self {
            DatasetKind::Imaging => "imaging",
            DatasetKind::Interferometer => "interferometer",
        }
    }
}
impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}

/// What a test module needs to build its pipeline
#[derive(Debug, Clone)]
pub struct PipelineArgs {
    pub name: String,
    /// `[test_type, test_name]`
    pub phase_folders: Vec<String>,
    pub search: SearchKind,
    /// Mask of the run, in real space for interferometer data
    pub real_space_mask: Mask,
    pub config: Rc<Config>,
}

pub trait TestModule {
    fn test_type(&self) -> &str;
    fn test_name(&self) -> &str;
    fn data_label(&self) -> &str;
    fn instrument(&self) -> &str;
    fn kind(&self) -> DatasetKind;
    fn make_pipeline(&self, args: PipelineArgs) -> pipeline::Result<Pipeline>;
}

/// Every test module, imaging first
pub fn modules() -> Vec<Box<dyn TestModule>> {
    vec![
        Box::new(imaging::GalaxyX1Sersic),
        Box::new(imaging::GalaxyX2SersicsHyper),
        Box::new(interferometer::GalaxyX2SersicsSeparate),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn module_names() {
        let modules = modules();
        let names: HashSet<_> = modules.iter().map(|m| m.test_name()).collect();
        assert_eq!(names.len(), modules.len());
        assert!(names.contains("galaxy_x2__sersics__separate"));
    }

    #[test]
    fn kind_folders() {
        assert_eq!(DatasetKind::Imaging.to_string(), "imaging");
        assert_eq!(DatasetKind::Interferometer.folder(), "interferometer");
    }
}
