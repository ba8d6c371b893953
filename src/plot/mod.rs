//! Figures of arrays, profiles and fits
//!
//! A [Plotter] writes one PNG or FITS file per figure, a [SubPlotter]
//! collects figures into one composite PNG. Overlays ([Visuals]) are built
//! for every figure from the [Include] policy of the configuration.

use std::{io, path::PathBuf};

use crate::{
    config::ConfigError, fit::FitError, fits::FitsError, inversion::InversionError,
    profiles::EvalError, structures::StructureError,
};

mod figure;
mod include;
mod output;
mod plotter;
pub mod products;
pub mod profiles;

pub use figure::{colormap, compose, render, Figure, Style};
pub use include::{critical_curves, Include, Visuals};
pub use output::{Format, Output};
pub use plotter::{ArrayPlotter, Plotter, SubPlotter};

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("unknown colormap {0:?}")]
    Colormap(String),
    #[error("failed to create figure directory {1:?}")]
    CreateDir(#[source] io::Error, PathBuf),
    #[error("failed to save figure {1:?}")]
    Save(#[source] image::ImageError, PathBuf),
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("figure buffer does not match the figure size")]
    Image,
    #[error("no subplot is open")]
    NoSubplot,
    #[error("the {0} is not available for plotting")]
    Missing(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fits(#[from] FitsError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Inversion(#[from] InversionError),
}
pub type Result<T> = std::result::Result<T, PlotError>;
