//! Simulated datasets of the test modules
//!
//! A dataset is identified by its `data_label`, each label mapping to the plane
//! of galaxies it is simulated from. The same label can be simulated for
//! several instruments.

use std::path::{Path, PathBuf};

use galaxy_viz::{
    dataset::{loader, Instrument, SimulatorImaging, SimulatorInterferometer},
    profiles::EllipticalSersic,
    Galaxy, Named, Plane,
};

use crate::{DatasetKind, IntegrationError, Result, TestModule};

fn sersic(centre: [f64; 2], phi: f64) -> EllipticalSersic {
    EllipticalSersic {
        centre,
        axis_ratio: 0.8,
        phi,
        intensity: 0.3,
        effective_radius: 1.0,
        sersic_index: 2.5,
    }
}

/// Galaxies the dataset `data_label` is simulated from
pub fn plane(data_label: &str) -> Result<Plane> {
    let galaxies = match data_label {
        "galaxy_x1__sersic" => vec![Named::new(
            "galaxy_0",
            Galaxy::new(0.5).light("bulge", sersic([0., 0.], 45.)),
        )],
        "galaxy_x2__sersics" => vec![
            Named::new(
                "galaxy_0",
                Galaxy::new(0.5).light("bulge", sersic([-1., -1.], 0.)),
            ),
            Named::new(
                "galaxy_1",
                Galaxy::new(0.5).light("bulge", sersic([1., 1.], 90.)),
            ),
        ],
        _ => return Err(IntegrationError::UnknownDataLabel(data_label.to_string())),
    };
    Ok(Plane::new(galaxies))
}

/// Simulates the dataset of `module` into `<test_path>/dataset/<instrument>/<data_label>/`
pub fn simulate<P: AsRef<Path>>(test_path: P, module: &dyn TestModule) -> Result<PathBuf> {
    let plane = plane(module.data_label())?;
    let instrument = Instrument::from_name(module.instrument())?;
    log::info!(
        "Simulating {} {} data of {}",
        module.instrument(),
        module.kind(),
        module.data_label()
    );
    let path = match module.kind() {
        DatasetKind::Imaging => loader::write_imaging(
            test_path,
            module.data_label(),
            module.instrument(),
            &SimulatorImaging::from_instrument(instrument).simulate(&plane)?,
        )?,
        DatasetKind::Interferometer => loader::write_interferometer(
            test_path,
            module.data_label(),
            module.instrument(),
            &SimulatorInterferometer::from_instrument(instrument).simulate(&plane)?,
        )?,
    };
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{imaging::GalaxyX1Sersic, modules};

    #[test]
    fn every_module_has_galaxies() {
        for module in modules() {
            assert!(plane(module.data_label()).is_ok(), "{}", module.data_label());
        }
        assert!(matches!(
            plane("galaxy_x3"),
            Err(IntegrationError::UnknownDataLabel(_))
        ));
    }

    #[test]
    fn simulated_imaging_loads() {
        let root = tempfile::tempdir().unwrap();
        let path = simulate(root.path(), &GalaxyX1Sersic).unwrap();
        assert!(path.join("image.fits").is_file());
        let imaging =
            galaxy_viz::dataset::load_test_imaging(root.path(), "galaxy_x1__sersic", "vro").unwrap();
        assert_eq!(imaging.image.shape(), (40, 40));
    }
}
