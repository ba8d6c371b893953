use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::{DatasetError, Result};
use crate::structures::{Grid, Kernel, StructureError};

/// Instruments the test datasets are simulated for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Vro,
    Euclid,
    Hst,
    HstUp,
    Ao,
    Sma,
}
impl Instrument {
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| DatasetError::Instrument(name.to_string()))
    }
    /// Pixel size in arcsec
    pub fn pixel_scale(&self) -> f64 {
        use Instrument::*;
        match self {
            Vro => 0.2,
            Euclid => 0.1,
            Hst => 0.05,
            HstUp => 0.03,
            Ao => 0.01,
            Sma => 0.05,
        }
    }
    pub fn pixel_scales(&self) -> (f64, f64) {
        (self.pixel_scale(), self.pixel_scale())
    }
    /// Shape of the simulated images, or of the real-space grid of an interferometer
    pub fn shape(&self) -> (usize, usize) {
        use Instrument::*;
        match self {
            Vro => (40, 40),
            Euclid => (50, 50),
            Hst => (100, 100),
            HstUp => (150, 150),
            Ao => (200, 200),
            Sma => (151, 151),
        }
    }
    /// Gaussian PSF width in arcsec
    pub fn psf_sigma(&self) -> f64 {
        use Instrument::*;
        match self {
            Vro => 0.5,
            Euclid => 0.1,
            Hst | HstUp => 0.05,
            Ao | Sma => 0.025,
        }
    }
    /// Exposure time in seconds
    pub fn exposure_time(&self) -> f64 {
        use Instrument::*;
        match self {
            Vro => 100.,
            Euclid => 2260.,
            Hst | HstUp => 2000.,
            Ao => 1000.,
            Sma => 100.,
        }
    }
    pub fn background_sky_level(&self) -> f64 {
        1.
    }
    pub fn is_interferometer(&self) -> bool {
        matches!(self, Instrument::Sma)
    }
    /// Number of simulated visibilities
    pub fn n_visibilities(&self) -> usize {
        if self.is_interferometer() {
            190
        } else {
            0
        }
    }
    pub fn psf(&self) -> std::result::Result<Kernel, StructureError> {
        Kernel::gaussian((11, 11), self.pixel_scales(), self.psf_sigma())
    }
}

/// Pixel scales of the named instrument
pub fn pixel_scales_from_instrument(instrument: &str) -> Result<(f64, f64)> {
    Ok(Instrument::from_name(instrument)?.pixel_scales())
}

/// Uniform grid the named instrument simulates and fits its data on
pub fn grid_from_instrument(instrument: &str) -> Result<Grid> {
    let instrument = Instrument::from_name(instrument)?;
    Ok(Grid::uniform(
        instrument.shape(),
        instrument.pixel_scales(),
        1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_table() {
        assert_eq!(pixel_scales_from_instrument("vro").unwrap(), (0.2, 0.2));
        assert_eq!(pixel_scales_from_instrument("hst_up").unwrap(), (0.03, 0.03));
        assert_eq!(grid_from_instrument("sma").unwrap().shape(), (151, 151));
        assert!(matches!(
            pixel_scales_from_instrument("jwst"),
            Err(DatasetError::Instrument(_))
        ));
        assert_eq!(Instrument::HstUp.to_string(), "hst_up");
    }
}
