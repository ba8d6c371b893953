use super::{pixel_centre, Array2D, Result, StructureError};

/// Boolean mask, `true` excludes a pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    shape: (usize, usize),
    pixel_scales: (f64, f64),
    masked: Vec<bool>,
}
impl Mask {
    /// A mask where every pixel is unmasked
    pub fn unmasked(shape: (usize, usize), pixel_scales: (f64, f64)) -> Self {
        Self {
            shape,
            pixel_scales,
            masked: vec![false; shape.0 * shape.1],
        }
    }
    /// Unmasks every pixel whose centre is within `radius` arcsec of the origin
    pub fn circular(shape: (usize, usize), pixel_scales: (f64, f64), radius: f64) -> Self {
        let masked = (0..shape.0)
            .flat_map(|row| (0..shape.1).map(move |col| (row, col)))
            .map(|(row, col)| {
                let [y, x] = pixel_centre(shape, pixel_scales, row, col);
                y.hypot(x) > radius
            })
            .collect();
        Self {
            shape,
            pixel_scales,
            masked,
        }
    }
    pub fn from_vec(
        shape: (usize, usize),
        pixel_scales: (f64, f64),
        masked: Vec<bool>,
    ) -> Result<Self> {
        if masked.len() != shape.0 * shape.1 {
            return Err(StructureError::Shape {
                len: masked.len(),
                shape,
            });
        }
        Ok(Self {
            shape,
            pixel_scales,
            masked,
        })
    }
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }
    pub fn pixel_scales(&self) -> (f64, f64) {
        self.pixel_scales
    }
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        self.masked[row * self.shape.1 + col]
    }
    /// Number of unmasked pixels
    pub fn pixels_in_mask(&self) -> usize {
        self.masked.iter().filter(|m| !**m).count()
    }
    /// Unmasked pixels in row-major order
    pub fn unmasked_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.shape.1;
        self.masked
            .iter()
            .enumerate()
            .filter(|(_, m)| !**m)
            .map(move |(i, _)| (i / cols, i % cols))
    }
    /// Unmasked pixels with at least one masked (or out of bounds) neighbour
    pub fn edge_pixels(&self) -> Vec<(usize, usize)> {
        let (rows, cols) = self.shape;
        self.unmasked_pixels()
            .filter(|&(row, col)| {
                row == 0
                    || col == 0
                    || row + 1 == rows
                    || col + 1 == cols
                    || self.is_masked(row - 1, col)
                    || self.is_masked(row + 1, col)
                    || self.is_masked(row, col - 1)
                    || self.is_masked(row, col + 1)
            })
            .collect()
    }
    /// Sets masked pixels of `array` to zero
    pub fn apply(&self, array: &Array2D) -> Result<Array2D> {
        if array.shape() != self.shape {
            return Err(StructureError::Mismatch(array.shape(), self.shape));
        }
        let data = array
            .iter()
            .zip(self.masked.iter())
            .map(|(&v, &m)| if m { 0f64 } else { v })
            .collect();
        Array2D::new(self.shape, array.pixel_scales(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_mask() {
        let mask = Mask::circular((5, 5), (1., 1.), 1.0);
        assert_eq!(mask.pixels_in_mask(), 5);
        assert!(!mask.is_masked(2, 2));
        assert!(mask.is_masked(0, 0));
        assert_eq!(mask.edge_pixels().len(), 4);
    }

    #[test]
    fn apply_zeroes_masked() {
        let mask = Mask::from_vec((1, 2), (1., 1.), vec![true, false]).unwrap();
        let array = Array2D::full(3., (1, 2), (1., 1.));
        assert_eq!(mask.apply(&array).unwrap().data(), &[0., 3.]);
    }
}
