//! Galaxy profile visualization and model-fitting pipelines
//!
//! The crate evaluates light and mass profiles of galaxies ([profiles],
//! [galaxy]) on uniform grids ([structures]), fits them to imaging and
//! interferometer datasets ([dataset], [fit], [inversion]) and renders the
//! results as PNG or FITS figures ([plot], [visualizer]). Multi-phase fits are
//! chained by the [pipeline] module.
//!
//! Which figures are written is decided by a [config::Config] loaded per run.

pub mod config;
pub mod dataset;
mod error;
pub mod fit;
pub mod fits;
pub mod galaxy;
pub mod inversion;
pub mod pipeline;
pub mod plot;
pub mod profiles;
pub mod structures;
pub mod visualizer;

pub use config::{Config, Section};
pub use error::Error;
pub use galaxy::{Galaxy, HyperGalaxy, Named, Plane};
pub use visualizer::Visualizer;
