use itertools::Itertools;
use itertools::MinMaxResult::{MinMax, OneElement};

use super::{pixel_at, pixel_centre, Result, StructureError};

/// Row-major 2D array of `f64` values
#[derive(Debug, Clone, PartialEq)]
pub struct Array2D {
    shape: (usize, usize),
    pixel_scales: (f64, f64),
    data: Vec<f64>,
}
impl Array2D {
    pub fn new(shape: (usize, usize), pixel_scales: (f64, f64), data: Vec<f64>) -> Result<Self> {
        if data.len() != shape.0 * shape.1 {
            return Err(StructureError::Shape {
                len: data.len(),
                shape,
            });
        }
        Ok(Self {
            shape,
            pixel_scales,
            data,
        })
    }
    pub fn full(value: f64, shape: (usize, usize), pixel_scales: (f64, f64)) -> Self {
        Self {
            shape,
            pixel_scales,
            data: vec![value; shape.0 * shape.1],
        }
    }
    pub fn zeros(shape: (usize, usize), pixel_scales: (f64, f64)) -> Self {
        Self::full(0f64, shape, pixel_scales)
    }
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }
    pub fn pixel_scales(&self) -> (f64, f64) {
        self.pixel_scales
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn data(&self) -> &[f64] {
        &self.data
    }
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.shape.1 + col]
    }
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.shape.1 + col] = value;
    }
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter()
    }
    /// Iterator over the rows
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[f64]> {
        self.data.chunks(self.shape.1.max(1))
    }
    /// `[y, x]` coordinates of a pixel centre
    pub fn pixel_centre(&self, row: usize, col: usize) -> [f64; 2] {
        pixel_centre(self.shape, self.pixel_scales, row, col)
    }
    /// Pixel containing the `[y, x]` coordinates
    pub fn pixel_at(&self, coords: [f64; 2]) -> Option<(usize, usize)> {
        pixel_at(self.shape, self.pixel_scales, coords)
    }
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            data: self.data.iter().map(|&x| f(x)).collect(),
            ..self.clone()
        }
    }
    /// Element-wise combination of two arrays of the same shape
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.shape != other.shape {
            return Err(StructureError::Mismatch(self.shape, other.shape));
        }
        Ok(Self {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            ..self.clone()
        })
    }
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
    /// Minimum and maximum of the finite values
    pub fn minmax(&self) -> Option<(f64, f64)> {
        match self.data.iter().filter(|x| x.is_finite()).minmax() {
            MinMax(x, y) => Some((*x, *y)),
            OneElement(x) => Some((*x, *x)),
            _ => None,
        }
    }
    pub fn max(&self) -> Option<f64> {
        self.minmax().map(|(_, max)| max)
    }
    /// Flips the array upside-down
    pub fn flip_ud(&self) -> Self {
        Self {
            data: self
                .rows()
                .rev()
                .flat_map(|row| row.iter().cloned())
                .collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch() {
        assert!(Array2D::new((2, 2), (1., 1.), vec![1.; 3]).is_err());
    }

    #[test]
    fn minmax_skips_nan() {
        let a = Array2D::new((1, 3), (1., 1.), vec![f64::NAN, -1., 2.]).unwrap();
        assert_eq!(a.minmax(), Some((-1., 2.)));
    }

    #[test]
    fn flip() {
        let a = Array2D::new((2, 2), (1., 1.), vec![1., 2., 3., 4.]).unwrap();
        assert_eq!(a.flip_ud().data(), &[3., 4., 1., 2.]);
    }
}
