use crate::{
    config::ConfigError, dataset::DatasetError, fit::FitError, fits::FitsError,
    inversion::InversionError, pipeline::PipelineError, plot::PlotError, profiles::EvalError,
    structures::StructureError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `config` module")]
    Config(#[from] ConfigError),
    #[error("Error in the `structures` module")]
    Structure(#[from] StructureError),
    #[error("Error in the `fits` module")]
    Fits(#[from] FitsError),
    #[error("Error in the `profiles` module")]
    Eval(#[from] EvalError),
    #[error("Error in the `dataset` module")]
    Dataset(#[from] DatasetError),
    #[error("Error in the `fit` module")]
    Fit(#[from] FitError),
    #[error("Error in the `inversion` module")]
    Inversion(#[from] InversionError),
    #[error("Error in the `plot` module")]
    Plot(#[from] PlotError),
    #[error("Error in the `pipeline` module")]
    Pipeline(#[from] PipelineError),
}
