use serde::{Deserialize, Serialize};

use crate::{
    profiles::{EvalError, Evaluable, Quantity},
    structures::{pixel_centre, Grid, Mask},
};

/// Which overlays are drawn on top of the figures
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Include {
    pub origin: bool,
    pub mask: bool,
    pub positions: bool,
    pub critical_curves: bool,
    pub light_profile_centres: bool,
    pub mass_profile_centres: bool,
}
impl Default for Include {
    fn default() -> Self {
        Self {
            origin: true,
            mask: true,
            positions: true,
            critical_curves: true,
            light_profile_centres: true,
            mass_profile_centres: true,
        }
    }
}
impl Include {
    /// Everything off
    pub fn none() -> Self {
        Self {
            origin: false,
            mask: false,
            positions: false,
            critical_curves: false,
            light_profile_centres: false,
            mass_profile_centres: false,
        }
    }
    /// Builds the overlays of a figure
    ///
    /// `geometry` is the mask of the plotted array, it sets the grid the
    /// critical curves are searched on. The outline of `mask` is drawn if given.
    pub fn visuals(
        &self,
        geometry: &Mask,
        mask: Option<&Mask>,
        subject: Option<&dyn Evaluable>,
        positions: Option<&[[f64; 2]]>,
    ) -> Result<Visuals, EvalError> {
        let mut visuals = Visuals::default();
        if self.origin {
            visuals.origin = Some([0., 0.]);
        }
        if let (true, Some(mask)) = (self.mask, mask) {
            visuals.mask_edge = mask
                .edge_pixels()
                .into_iter()
                .map(|(row, col)| pixel_centre(mask.shape(), mask.pixel_scales(), row, col))
                .collect();
        }
        if let (true, Some(positions)) = (self.positions, positions) {
            visuals.positions = positions.to_vec();
        }
        if let Some(subject) = subject {
            if self.light_profile_centres {
                visuals.light_profile_centres = subject.light_profile_centres();
            }
            if self.mass_profile_centres {
                visuals.mass_profile_centres = subject.mass_profile_centres();
            }
            if self.critical_curves && subject.supports(Quantity::Magnification) {
                visuals.critical_curves = critical_curves(subject, geometry)?;
            }
        }
        Ok(visuals)
    }
}

/// Centres of the pixels where the magnification changes sign with a neighbour
pub fn critical_curves(subject: &dyn Evaluable, geometry: &Mask) -> Result<Vec<[f64; 2]>, EvalError> {
    let (rows, cols) = geometry.shape();
    let grid = Grid::uniform((rows, cols), geometry.pixel_scales(), 1);
    let inverse: Vec<bool> = subject
        .magnification(&grid)?
        .into_iter()
        .map(|mu| mu.is_sign_positive())
        .collect();
    let mut curves = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let i = row * cols + col;
            let right = col + 1 < cols && inverse[i] != inverse[i + 1];
            let below = row + 1 < rows && inverse[i] != inverse[i + cols];
            if right || below {
                curves.push(grid[i]);
            }
        }
    }
    Ok(curves)
}

/// Overlays of a figure, rebuilt for every figure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visuals {
    pub origin: Option<[f64; 2]>,
    pub mask_edge: Vec<[f64; 2]>,
    pub positions: Vec<[f64; 2]>,
    pub light_profile_centres: Vec<[f64; 2]>,
    pub mass_profile_centres: Vec<[f64; 2]>,
    pub critical_curves: Vec<[f64; 2]>,
}
impl Visuals {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        galaxy::Galaxy,
        profiles::{EllipticalSersic, SphericalIsothermal},
    };

    #[test]
    fn isothermal_critical_curve() {
        let galaxy = Galaxy::new(0.5).mass(
            "sis",
            SphericalIsothermal {
                centre: [0., 0.],
                einstein_radius: 1.,
            },
        );
        let geometry = Mask::unmasked((40, 40), (0.1, 0.1));
        let curves = critical_curves(&galaxy, &geometry).unwrap();
        assert!(!curves.is_empty());
        assert!(curves
            .iter()
            .all(|[y, x]| (y.hypot(*x) - 1.).abs() < 0.2));
    }

    #[test]
    fn light_only_subject() {
        let galaxy = Galaxy::new(0.5).light("bulge", EllipticalSersic::default());
        let geometry = Mask::circular((5, 5), (0.1, 0.1), 0.15);
        let visuals = Include::default()
            .visuals(&geometry, Some(&geometry), Some(&galaxy), Some(&[[0.1, 0.1]]))
            .unwrap();
        assert_eq!(visuals.origin, Some([0., 0.]));
        assert_eq!(visuals.light_profile_centres, vec![[0., 0.]]);
        assert!(visuals.critical_curves.is_empty());
        assert_eq!(visuals.positions.len(), 1);
        assert!(!visuals.mask_edge.is_empty());
        assert!(Include::none()
            .visuals(&geometry, Some(&geometry), Some(&galaxy), None)
            .unwrap()
            .is_empty());
    }
}
