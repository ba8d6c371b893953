//! Imaging test modules

mod galaxy_x1_sersic;
mod galaxy_x2_sersics_hyper;

pub use galaxy_x1_sersic::GalaxyX1Sersic;
pub use galaxy_x2_sersics_hyper::GalaxyX2SersicsHyper;
