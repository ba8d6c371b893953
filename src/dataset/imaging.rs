use super::Result;
use crate::structures::{Array2D, Kernel, Mask};

/// CCD imaging data: image, noise map and point spread function
#[derive(Debug, Clone, PartialEq)]
pub struct Imaging {
    pub name: String,
    pub image: Array2D,
    pub noise_map: Array2D,
    pub psf: Kernel,
}
impl Imaging {
    pub fn new(name: impl Into<String>, image: Array2D, noise_map: Array2D, psf: Kernel) -> Result<Self> {
        image.zip_with(&noise_map, |a, _| a)?;
        Ok(Self {
            name: name.into(),
            image,
            noise_map,
            psf,
        })
    }
    pub fn shape(&self) -> (usize, usize) {
        self.image.shape()
    }
    pub fn pixel_scales(&self) -> (f64, f64) {
        self.image.pixel_scales()
    }
    pub fn inverse_noise_map(&self) -> Array2D {
        self.noise_map.map(|n| 1. / n)
    }
    pub fn signal_to_noise_map(&self) -> Array2D {
        self.image
            .zip_with(&self.noise_map, |s, n| s / n)
            .unwrap_or_else(|_| Array2D::zeros(self.shape(), self.pixel_scales()))
    }
    pub fn absolute_signal_to_noise_map(&self) -> Array2D {
        self.signal_to_noise_map().map(f64::abs)
    }
    /// Chi-squared of each pixel if it was fitted by a model image of zero
    pub fn potential_chi_squared_map(&self) -> Array2D {
        self.absolute_signal_to_noise_map().map(|x| x * x)
    }
    /// Default mask of the test runners: a circle of `radius` arcsec
    pub fn circular_mask(&self, radius: f64) -> Mask {
        Mask::circular(self.shape(), self.pixel_scales(), radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_to_noise() {
        let imaging = Imaging::new(
            "test",
            Array2D::new((1, 2), (0.1, 0.1), vec![-2., 4.]).unwrap(),
            Array2D::full(2., (1, 2), (0.1, 0.1)),
            Kernel::no_blur((0.1, 0.1)),
        )
        .unwrap();
        assert_eq!(imaging.signal_to_noise_map().data(), &[-1., 2.]);
        assert_eq!(imaging.absolute_signal_to_noise_map().data(), &[1., 2.]);
        assert_eq!(imaging.potential_chi_squared_map().data(), &[1., 4.]);
        assert_eq!(imaging.inverse_noise_map().data(), &[0.5, 0.5]);
    }

    #[test]
    fn shapes_must_agree() {
        assert!(Imaging::new(
            "test",
            Array2D::zeros((2, 2), (0.1, 0.1)),
            Array2D::zeros((1, 2), (0.1, 0.1)),
            Kernel::no_blur((0.1, 0.1)),
        )
        .is_err());
    }
}
