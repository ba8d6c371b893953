use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{
    profiles::{EvalError, Evaluable},
    structures::{Array2D, Mask},
};

/// Galaxy quantity a [GalaxyData] map holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GalaxyQuantity {
    Image,
    Convergence,
    Potential,
    DeflectionsY,
    DeflectionsX,
}
impl GalaxyQuantity {
    /// Evaluates the quantity of `subject` at every coordinate
    pub fn evaluate<E: Evaluable + ?Sized>(
        &self,
        subject: &E,
        grid: &[[f64; 2]],
    ) -> Result<Vec<f64>, EvalError> {
        use GalaxyQuantity::*;
        match self {
            Image => subject.profile_image(grid),
            Convergence => subject.convergence(grid),
            Potential => subject.potential(grid),
            DeflectionsY => Ok(subject.deflections(grid)?.into_iter().map(|d| d[0]).collect()),
            DeflectionsX => Ok(subject.deflections(grid)?.into_iter().map(|d| d[1]).collect()),
        }
    }
}

/// A map of one galaxy quantity with its noise, fitted directly by galaxy models
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyData {
    pub image: Array2D,
    pub noise_map: Array2D,
    pub quantity: GalaxyQuantity,
    pub mask: Mask,
    pub sub_size: usize,
}
impl GalaxyData {
    pub fn new(image: Array2D, noise_map: Array2D, quantity: GalaxyQuantity, mask: Mask) -> Self {
        Self {
            image,
            noise_map,
            quantity,
            mask,
            sub_size: 1,
        }
    }
    pub fn sub_size(self, sub_size: usize) -> Self {
        Self { sub_size, ..self }
    }
}
