//! On-disk layout of the test datasets
//!
//! Datasets live in `<root>/dataset/<instrument>/<data_label>/`, one FITS file
//! per product. Visibilities, their noise and the baselines are stored as
//! `(n, 2)` arrays.

use std::{
    fs,
    path::{Path, PathBuf},
};

use super::{DatasetError, Imaging, Instrument, Interferometer, Result};
use crate::{
    fits,
    structures::{Array2D, Kernel},
};

/// Folder of the dataset `data_label` simulated for `instrument`
pub fn dataset_path<P: AsRef<Path>>(root: P, data_label: &str, instrument: &str) -> PathBuf {
    root.as_ref()
        .join("dataset")
        .join(instrument)
        .join(data_label)
}

fn pairs_to_array(pairs: &[[f64; 2]]) -> Result<Array2D> {
    Ok(Array2D::new(
        (pairs.len(), 2),
        (1., 1.),
        pairs.iter().flatten().cloned().collect(),
    )?)
}
fn array_to_pairs(array: Array2D, path: &Path) -> Result<Vec<[f64; 2]>> {
    if array.shape().1 != 2 {
        return Err(DatasetError::Pairs(array.shape(), path.to_path_buf()));
    }
    Ok(array
        .into_data()
        .chunks_exact(2)
        .map(|pair| [pair[0], pair[1]])
        .collect())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| DatasetError::CreateDir(e, path.to_path_buf()))
}

/// Loads the imaging dataset `data_label` of `instrument`
pub fn load_test_imaging<P: AsRef<Path>>(
    root: P,
    data_label: &str,
    instrument: &str,
) -> Result<Imaging> {
    Instrument::from_name(instrument)?;
    let path = dataset_path(root, data_label, instrument);
    log::info!("Loading imaging from {path:?}");
    let image = fits::read_array(path.join("image.fits"))?;
    let noise_map = fits::read_array(path.join("noise_map.fits"))?;
    let psf = Kernel::new(fits::read_array(path.join("psf.fits"))?)?;
    Imaging::new("test_dataset", image, noise_map, psf)
}

/// Loads the interferometer dataset `data_label` of `instrument`
pub fn load_test_interferometer<P: AsRef<Path>>(
    root: P,
    data_label: &str,
    instrument: &str,
) -> Result<Interferometer> {
    Instrument::from_name(instrument)?;
    let path = dataset_path(root, data_label, instrument);
    log::info!("Loading interferometer from {path:?}");
    let read_pairs = |name: &str| -> Result<Vec<[f64; 2]>> {
        let file = path.join(name);
        array_to_pairs(fits::read_array(&file)?, &file)
    };
    Interferometer::new(
        "test_dataset",
        read_pairs("visibilities.fits")?,
        read_pairs("noise_map.fits")?,
        read_pairs("uv_wavelengths.fits")?,
    )
}

/// Writes `imaging` where [load_test_imaging] reads it
pub fn write_imaging<P: AsRef<Path>>(
    root: P,
    data_label: &str,
    instrument: &str,
    imaging: &Imaging,
) -> Result<PathBuf> {
    let path = dataset_path(root, data_label, instrument);
    create_dir(&path)?;
    fits::write_array(path.join("image.fits"), &imaging.image)?;
    fits::write_array(path.join("noise_map.fits"), &imaging.noise_map)?;
    fits::write_array(path.join("psf.fits"), imaging.psf.array())?;
    log::info!("Imaging written to {path:?}");
    Ok(path)
}

/// Writes `interferometer` where [load_test_interferometer] reads it
pub fn write_interferometer<P: AsRef<Path>>(
    root: P,
    data_label: &str,
    instrument: &str,
    interferometer: &Interferometer,
) -> Result<PathBuf> {
    let path = dataset_path(root, data_label, instrument);
    create_dir(&path)?;
    fits::write_array(
        path.join("visibilities.fits"),
        &pairs_to_array(&interferometer.visibilities)?,
    )?;
    fits::write_array(
        path.join("noise_map.fits"),
        &pairs_to_array(&interferometer.noise_map)?,
    )?;
    fits::write_array(
        path.join("uv_wavelengths.fits"),
        &pairs_to_array(&interferometer.uv_wavelengths)?,
    )?;
    log::info!("Interferometer written to {path:?}");
    Ok(path)
}
