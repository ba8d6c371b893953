//! Interferometer test modules

mod galaxy_x2_sersics_separate;

pub use galaxy_x2_sersics_separate::GalaxyX2SersicsSeparate;
