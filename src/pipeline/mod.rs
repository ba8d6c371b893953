//! Multi-phase model fitting
//!
//! A [Pipeline] is an ordered list of phase factories. Running it builds and
//! runs the phases in order, the factory of a phase receiving the [Results]
//! of the phases run before it, so a phase can only refer to earlier phases.

use std::{io, path::PathBuf, rc::Rc};

use crate::{
    config::{Config, ConfigError},
    fit::FitError,
    plot::PlotError,
    profiles::{EvalError, ProfileKind},
    structures::Mask,
};

mod model;
mod phase;
mod prior;
mod search;

pub use model::{GalaxyComponent, GalaxyModel, Model, ModelInstance, ProfileModel};
pub use phase::{Dataset, HyperImages, HyperResult, Info, Phase, PhaseResult};
pub use prior::Prior;
pub use search::{
    LogLikelihood, MockSearch, NestedSampler, NonLinearSearch, Sample, Samples, SearchKind,
    SearchSettings,
};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no result for phase {index}, {available} phases have run")]
    MissingResult { index: usize, available: usize },
    #[error("{kind} has no parameter {name:?}")]
    UnknownParameter { kind: ProfileKind, name: String },
    #[error("profile {name} of kind {kind} is in the wrong light/mass slot")]
    ProfileSlot { name: String, kind: ProfileKind },
    #[error("the model has {expected} free parameters, found {found}")]
    ParameterCount { expected: usize, found: usize },
    #[error("not enough parameters for the profiles of the model")]
    TooFewParameters,
    #[error("galaxy {0} is a fixed instance, not a model")]
    NotAModel(String),
    #[error("no galaxy {0}")]
    MissingGalaxy(String),
    #[error("phase {phase} cannot fit {dataset} data")]
    DatasetKind { phase: String, dataset: &'static str },
    #[error("hyper galaxies of phase {0} require imaging data")]
    HyperInterferometer(String),
    #[error("phase {0} was not extended with a hyper phase")]
    NoHyperResult(String),
    #[error("the search returned no samples")]
    NoSamples,
    #[error("failed to create output directory {1:?}")]
    CreateDir(#[source] io::Error, PathBuf),
    #[error("failed to write {1:?}")]
    Write(#[source] io::Error, PathBuf),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Plot(#[from] PlotError),
}
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Results of the phases run so far, in order
#[derive(Debug, Clone, Default)]
pub struct Results(Vec<PhaseResult>);
impl Results {
    /// Result of the phase at `index`
    pub fn get(&self, index: usize) -> Result<&PhaseResult> {
        self.0.get(index).ok_or(PipelineError::MissingResult {
            index,
            available: self.0.len(),
        })
    }
    pub fn last(&self) -> Option<&PhaseResult> {
        self.0.last()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &PhaseResult> {
        self.0.iter()
    }
}

type PhaseFactory = Box<dyn Fn(&Results) -> Result<Phase>>;

pub struct Pipeline {
    name: String,
    config: Rc<Config>,
    phases: Vec<PhaseFactory>,
}
impl Pipeline {
    pub fn new(name: impl Into<String>, config: Rc<Config>) -> Self {
        Self {
            name: name.into(),
            config,
            phases: Vec::new(),
        }
    }
    /// Appends a phase built from the results of the previous phases
    pub fn phase<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Results) -> Result<Phase> + 'static,
    {
        self.phases.push(Box::new(factory));
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn len(&self) -> usize {
        self.phases.len()
    }
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
    /// Runs the phases in order
    pub fn run(&self, dataset: &Dataset, mask: &Mask, info: &Info) -> Result<Results> {
        log::info!("Running pipeline {} of {} phases", self.name, self.len());
        let mut results = Results::default();
        for factory in &self.phases {
            let phase = factory(&results)?;
            let result = phase.run(dataset, mask, info, &self.config, results.last())?;
            results.0.push(result);
        }
        Ok(results)
    }
}
