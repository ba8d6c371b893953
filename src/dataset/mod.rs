//! Datasets: CCD imaging, interferometer visibilities and galaxy quantity maps
//!
//! The test datasets are simulated for a fixed set of instruments
//! ([Instrument]) and stored as FITS files ([loader]).

use std::{io, path::PathBuf};

use crate::{fits::FitsError, profiles::EvalError, structures::StructureError};

mod galaxy_data;
mod imaging;
mod instrument;
mod interferometer;
pub mod loader;
mod simulator;

pub use galaxy_data::{GalaxyData, GalaxyQuantity};
pub use imaging::Imaging;
pub use instrument::{grid_from_instrument, pixel_scales_from_instrument, Instrument};
pub use interferometer::{Interferometer, Transformer};
pub use loader::{load_test_imaging, load_test_interferometer};
pub use simulator::{SimulatorImaging, SimulatorInterferometer};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("unknown instrument {0:?}")]
    Instrument(String),
    #[error(
        "{visibilities} visibilities, {noise_map} noise values and {uv_wavelengths} baselines do not match"
    )]
    Visibilities {
        visibilities: usize,
        noise_map: usize,
        uv_wavelengths: usize,
    },
    #[error("array of shape {0:?} in {1:?} is not a list of pairs")]
    Pairs((usize, usize), PathBuf),
    #[error("failed to create dataset directory {1:?}")]
    CreateDir(#[source] io::Error, PathBuf),
    #[error("invalid noise distribution: {0}")]
    Distribution(String),
    #[error(transparent)]
    Fits(#[from] FitsError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
type Result<T> = std::result::Result<T, DatasetError>;
