use std::ops::Deref;

use super::{Array2D, Result, StructureError};

/// Point spread function kernel, odd-sized
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel(Array2D);
impl Deref for Kernel {
    type Target = Array2D;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl Kernel {
    pub fn new(array: Array2D) -> Result<Self> {
        let shape = array.shape();
        if shape.0 % 2 == 0 || shape.1 % 2 == 0 {
            return Err(StructureError::EvenKernel(shape));
        }
        Ok(Self(array))
    }
    /// A 1x1 kernel that leaves images unchanged
    pub fn no_blur(pixel_scales: (f64, f64)) -> Self {
        Self(Array2D::full(1f64, (1, 1), pixel_scales))
    }
    /// Normalized circular Gaussian kernel, `sigma` in arcsec
    pub fn gaussian(shape: (usize, usize), pixel_scales: (f64, f64), sigma: f64) -> Result<Self> {
        let mut array = Array2D::zeros(shape, pixel_scales);
        for row in 0..shape.0 {
            for col in 0..shape.1 {
                let [y, x] = array.pixel_centre(row, col);
                array.set(row, col, (-0.5 * (x * x + y * y) / (sigma * sigma)).exp());
            }
        }
        let total = array.sum();
        Self::new(array.map(|x| x / total))
    }
    pub fn array(&self) -> &Array2D {
        &self.0
    }
    /// Convolves `image` with the kernel, zero-padding the image edges
    pub fn convolve(&self, image: &Array2D) -> Array2D {
        let (rows, cols) = image.shape();
        let (k_rows, k_cols) = self.0.shape();
        let (k_r0, k_c0) = (k_rows as isize / 2, k_cols as isize / 2);
        let mut blurred = Array2D::zeros(image.shape(), image.pixel_scales());
        for row in 0..rows {
            for col in 0..cols {
                let mut value = 0f64;
                for i in 0..k_rows {
                    let r = row as isize - (i as isize - k_r0);
                    if r < 0 || r >= rows as isize {
                        continue;
                    }
                    for j in 0..k_cols {
                        let c = col as isize - (j as isize - k_c0);
                        if c < 0 || c >= cols as isize {
                            continue;
                        }
                        value += image.get(r as usize, c as usize) * self.0.get(i, j);
                    }
                }
                blurred.set(row, col, value);
            }
        }
        blurred
    }
}
