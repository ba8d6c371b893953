//! Run configuration
//!
//! A [`Config`] is loaded once per run from a configuration folder and handed
//! to every component that needs it:
//!
//! - `visualize/plots.yaml`: which figures to render, per section (mandatory)
//! - `visualize/general.yaml`: colormap, figure size and overlay policy
//! - `non_linear/nest.yaml`: nested sampler settings and prior passing

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::plot::Include;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {1:?}")]
    Read(#[source] io::Error, PathBuf),
    #[error("failed to parse configuration file {1:?}")]
    Parse(#[source] serde_yaml::Error, PathBuf),
    #[error("no `{0}` section in the plots configuration")]
    MissingSection(Section),
    #[error("no `{name}` entry in the `{section}` section of the plots configuration")]
    MissingKey { section: Section, name: String },
}
type Result<T> = std::result::Result<T, ConfigError>;

/// Sections of the plots configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    Dataset,
    Fit,
    Inversion,
    Hyper,
    GalaxyFit,
}

/// Section → figure name → should plot
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlotsConfig(BTreeMap<String, BTreeMap<String, bool>>);
impl PlotsConfig {
    pub fn setting(&self, section: Section, name: &str) -> Result<bool> {
        self.0
            .get(section.as_ref())
            .ok_or(ConfigError::MissingSection(section))?
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::MissingKey {
                section,
                name: name.to_string(),
            })
    }
    pub fn set(mut self, section: Section, name: impl Into<String>, value: bool) -> Self {
        self.0
            .entry(section.as_ref().to_string())
            .or_default()
            .insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Colormap name, e.g. `viridis` or `cubehelix`
    pub cmap: String,
    /// Smallest side of a figure in pixels
    pub figure_size: u32,
}
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cmap: String::from("viridis"),
            figure_size: 256,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VisualizeGeneral {
    #[serde(default)]
    general: GeneralConfig,
    #[serde(default)]
    include: Include,
}

/// Width of the Gaussian priors passed from one phase to the next
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PriorPassing {
    /// Multiplies the error estimate of a parameter
    pub sigma: f64,
    /// Smallest prior width
    pub minimum_width: f64,
}
impl Default for PriorPassing {
    fn default() -> Self {
        Self {
            sigma: 3.0,
            minimum_width: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NestConfig {
    pub n_live_points: usize,
    pub sampling_efficiency: f64,
    pub const_efficiency_mode: bool,
    pub max_iterations: usize,
    pub seed: u64,
    pub prior_passing: PriorPassing,
}
impl Default for NestConfig {
    fn default() -> Self {
        Self {
            n_live_points: 50,
            sampling_efficiency: 0.5,
            const_efficiency_mode: false,
            max_iterations: 1000,
            seed: 1,
            prior_passing: PriorPassing::default(),
        }
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read(e, path.to_path_buf()))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e, path.to_path_buf()))
}
fn read_yaml_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if path.is_file() {
        read_yaml(path)
    } else {
        log::debug!("{path:?} not found, using defaults");
        Ok(T::default())
    }
}

/// Configuration of a run: where it reads its settings and writes its outputs
#[derive(Debug, Clone, Default)]
pub struct Config {
    config_path: PathBuf,
    output_path: PathBuf,
    plots: PlotsConfig,
    general: GeneralConfig,
    include: Include,
    nest: NestConfig,
}
impl Config {
    /// Default configuration writing to `output_path`, with an empty plots configuration
    pub fn new<P: AsRef<Path>>(output_path: P) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }
    /// Loads the configuration folder at `config_path`
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(config_path: P, output_path: Q) -> Result<Rc<Self>> {
        let config_path = config_path.as_ref();
        log::info!("Loading configuration from {config_path:?}");
        let visualize = config_path.join("visualize");
        let plots = read_yaml(&visualize.join("plots.yaml"))?;
        let VisualizeGeneral { general, include } =
            read_yaml_or_default(&visualize.join("general.yaml"))?;
        let nest = read_yaml_or_default(&config_path.join("non_linear").join("nest.yaml"))?;
        Ok(Rc::new(Self {
            config_path: config_path.to_path_buf(),
            output_path: output_path.as_ref().to_path_buf(),
            plots,
            general,
            include,
            nest,
        }))
    }
    pub fn plots(self, plots: PlotsConfig) -> Self {
        Self { plots, ..self }
    }
    pub fn general(self, general: GeneralConfig) -> Self {
        Self { general, ..self }
    }
    pub fn include(self, include: Include) -> Self {
        Self { include, ..self }
    }
    pub fn nest(self, nest: NestConfig) -> Self {
        Self { nest, ..self }
    }
    /// Looks up a flag of the plots configuration
    pub fn plot_setting(&self, section: Section, name: &str) -> Result<bool> {
        self.plots.setting(section, name)
    }
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
    pub fn general_config(&self) -> &GeneralConfig {
        &self.general
    }
    pub fn include_config(&self) -> &Include {
        &self.include
    }
    pub fn nest_config(&self) -> &NestConfig {
        &self.nest
    }
}
