//! FITS files of 2D `f64` arrays
//!
//! Arrays are written to the primary HDU as double precision images, the first
//! row of the file being the bottom row of the array. The pixel scales are kept
//! in the `PIXSCALY` and `PIXSCALX` header keys.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use fitsio::{
    hdu::HduInfo,
    images::{ImageDescription, ImageType},
    FitsFile,
};

use crate::structures::{Array2D, StructureError};

#[derive(Debug, thiserror::Error)]
pub enum FitsError {
    #[error("failed to replace FITS file {1:?}")]
    Replace(#[source] io::Error, PathBuf),
    #[error("FITS error with {1:?}")]
    Fits(#[source] fitsio::errors::Error, PathBuf),
    #[error("the primary HDU of {0:?} is not an image")]
    NotAnImage(PathBuf),
    #[error("only 2D images are supported, {1:?} has shape {0:?}")]
    Shape(Vec<usize>, PathBuf),
    #[error("FITS data of {1:?} has {0} values, expected {2}")]
    Truncated(usize, PathBuf, usize),
    #[error(transparent)]
    Structure(#[from] StructureError),
}
type Result<T> = std::result::Result<T, FitsError>;

/// Writes `array` to a FITS file at `path`, replacing any existing file
pub fn write_array<P: AsRef<Path>>(path: P, array: &Array2D) -> Result<()> {
    let path = path.as_ref();
    let fits_error = |e| FitsError::Fits(e, path.to_path_buf());
    if path.exists() {
        fs::remove_file(path).map_err(|e| FitsError::Replace(e, path.to_path_buf()))?;
    }
    let (rows, cols) = array.shape();
    let (ys, xs) = array.pixel_scales();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[rows, cols],
    };
    let mut fptr = FitsFile::create(path)
        .with_custom_primary(&description)
        .open()
        .map_err(fits_error)?;
    let hdu = fptr.primary_hdu().map_err(fits_error)?;
    hdu.write_key(&mut fptr, "PIXSCALY", ys).map_err(fits_error)?;
    hdu.write_key(&mut fptr, "PIXSCALX", xs).map_err(fits_error)?;
    hdu.write_image(&mut fptr, array.flip_ud().data())
        .map_err(fits_error)?;
    Ok(())
}

/// Reads a 2D array from the primary HDU of the FITS file at `path`
///
/// Missing pixel scale keys default to 1.
pub fn read_array<P: AsRef<Path>>(path: P) -> Result<Array2D> {
    let path = path.as_ref();
    let fits_error = |e| FitsError::Fits(e, path.to_path_buf());
    let mut fptr = FitsFile::open(path).map_err(fits_error)?;
    let hdu = fptr.primary_hdu().map_err(fits_error)?;
    let (rows, cols) = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => match shape.as_slice() {
            &[rows, cols] => (rows, cols),
            _ => return Err(FitsError::Shape(shape.clone(), path.to_path_buf())),
        },
        _ => return Err(FitsError::NotAnImage(path.to_path_buf())),
    };
    let expected = rows
        .checked_mul(cols)
        .ok_or_else(|| FitsError::Shape(vec![rows, cols], path.to_path_buf()))?;
    let data: Vec<f64> = hdu.read_image(&mut fptr).map_err(fits_error)?;
    if data.len() != expected {
        return Err(FitsError::Truncated(data.len(), path.to_path_buf(), expected));
    }
    let pixel_scales = (
        hdu.read_key::<f64>(&mut fptr, "PIXSCALY").unwrap_or(1.),
        hdu.read_key::<f64>(&mut fptr, "PIXSCALX").unwrap_or(1.),
    );
    Ok(Array2D::new((rows, cols), pixel_scales, data)?.flip_ud())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A primary header padded to one 2880 bytes block
    fn header(cards: &[(&str, &str)]) -> Vec<u8> {
        let mut bytes: Vec<u8> = cards
            .iter()
            .map(|(key, value)| format!("{key:<8}= {value:>20}{:50}", ""))
            .chain(std::iter::once(format!("{:<80}", "END")))
            .collect::<String>()
            .into_bytes();
        bytes.resize(2880, b' ');
        bytes
    }

    #[test]
    fn write_then_read_keeps_orientation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("array.fits");
        let array = Array2D::new((2, 3), (0.05, 0.1), vec![1., 2., 3., 4., 5., 6.]).unwrap();
        write_array(&path, &array).unwrap();

        let mut fptr = FitsFile::open(&path).unwrap();
        let hdu = fptr.primary_hdu().unwrap();
        let raw: Vec<f64> = hdu.read_image(&mut fptr).unwrap();
        assert_eq!(raw[0], 4.);
        assert_eq!(read_array(&path).unwrap(), array);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("array.fits");
        write_array(&path, &Array2D::zeros((2, 2), (1., 1.))).unwrap();
        let array = Array2D::full(3., (4, 1), (0.5, 0.5));
        write_array(&path, &array).unwrap();
        assert_eq!(read_array(&path).unwrap(), array);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_array("does/not/exist.fits"),
            Err(FitsError::Fits(..))
        ));
    }

    #[test]
    fn negative_axis_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.fits");
        let mut bytes = header(&[
            ("SIMPLE", "T"),
            ("BITPIX", "-64"),
            ("NAXIS", "2"),
            ("NAXIS1", "-1"),
            ("NAXIS2", "3"),
        ]);
        bytes.resize(2 * 2880, 0);
        fs::write(&path, bytes).unwrap();
        assert!(read_array(&path).is_err());
    }

    #[test]
    fn cube_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.fits");
        let description = ImageDescription {
            data_type: ImageType::Double,
            dimensions: &[2, 2, 2],
        };
        FitsFile::create(&path)
            .with_custom_primary(&description)
            .open()
            .unwrap();
        assert!(matches!(read_array(&path), Err(FitsError::Shape(..))));
    }
}
