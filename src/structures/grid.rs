use std::ops::Deref;

use super::{pixel_centre, Array2D, Mask, Result, StructureError};

/// `[y, x]` coordinates of the sub-pixels of every unmasked pixel of a mask
///
/// Each unmasked pixel, taken in row-major order, contributes a contiguous
/// block of `sub_size * sub_size` coordinates.
#[derive(Debug, Clone)]
pub struct Grid {
    mask: Mask,
    sub_size: usize,
    coords: Vec<[f64; 2]>,
}
impl Deref for Grid {
    type Target = [[f64; 2]];

    fn deref(&self) -> &Self::Target {
        &self.coords
    }
}
impl Grid {
    /// Grid over every pixel of an array of the given shape
    pub fn uniform(shape: (usize, usize), pixel_scales: (f64, f64), sub_size: usize) -> Self {
        Self::from_mask(Mask::unmasked(shape, pixel_scales), sub_size)
    }
    pub fn from_mask(mask: Mask, sub_size: usize) -> Self {
        let sub_size = sub_size.max(1);
        let shape = mask.shape();
        let (ys, xs) = mask.pixel_scales();
        let (dy, dx) = (ys / sub_size as f64, xs / sub_size as f64);
        let coords = mask
            .unmasked_pixels()
            .flat_map(|(row, col)| {
                let [y0, x0] = pixel_centre(shape, (ys, xs), row, col);
                (0..sub_size).flat_map(move |i| {
                    (0..sub_size).map(move |j| {
                        [
                            y0 + 0.5 * ys - (i as f64 + 0.5) * dy,
                            x0 - 0.5 * xs + (j as f64 + 0.5) * dx,
                        ]
                    })
                })
            })
            .collect();
        Self {
            mask,
            sub_size,
            coords,
        }
    }
    pub fn mask(&self) -> &Mask {
        &self.mask
    }
    pub fn sub_size(&self) -> usize {
        self.sub_size
    }
    pub fn shape(&self) -> (usize, usize) {
        self.mask.shape()
    }
    pub fn pixel_scales(&self) -> (f64, f64) {
        self.mask.pixel_scales()
    }
    pub fn coords(&self) -> &[[f64; 2]] {
        &self.coords
    }
    /// Bins sub-pixel values to one mean value per unmasked pixel and embeds
    /// them into a 2D array, masked pixels set to zero
    pub fn array_from_sub_values(&self, values: &[f64]) -> Result<Array2D> {
        if values.len() != self.coords.len() {
            return Err(StructureError::GridValues {
                expected: self.coords.len(),
                found: values.len(),
            });
        }
        let n_sub = self.sub_size * self.sub_size;
        let mut array = Array2D::zeros(self.shape(), self.pixel_scales());
        for ((row, col), sub_values) in self.mask.unmasked_pixels().zip(values.chunks(n_sub)) {
            array.set(row, col, sub_values.iter().sum::<f64>() / n_sub as f64);
        }
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_grid_layout() {
        let grid = Grid::uniform((1, 1), (1., 1.), 2);
        assert_eq!(
            grid.coords(),
            &[[0.25, -0.25], [0.25, 0.25], [-0.25, -0.25], [-0.25, 0.25]]
        );
    }

    #[test]
    fn binning_averages_sub_pixels() {
        let mask = Mask::from_vec((1, 2), (1., 1.), vec![true, false]).unwrap();
        let grid = Grid::from_mask(mask, 2);
        assert_eq!(grid.len(), 4);
        let array = grid.array_from_sub_values(&[1., 2., 3., 6.]).unwrap();
        assert_eq!(array.data(), &[0., 3.]);
        assert!(grid.array_from_sub_values(&[1.]).is_err());
    }
}
