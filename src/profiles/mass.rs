use serde::{Deserialize, Serialize};

use super::{Evaluable, ProfileKind, Quantity, Result};

/// Smallest radius, avoids the central singularities
const MINIMUM_RADIUS: f64 = 1e-8;

fn offset(coords: [f64; 2], centre: [f64; 2]) -> ([f64; 2], f64) {
    let d = [coords[0] - centre[0], coords[1] - centre[1]];
    (d, d[0].hypot(d[1]).max(MINIMUM_RADIUS))
}

/// Singular isothermal sphere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphericalIsothermal {
    pub centre: [f64; 2],
    pub einstein_radius: f64,
}
impl SphericalIsothermal {
    fn convergence_at(&self, coords: [f64; 2]) -> f64 {
        let (_, r) = offset(coords, self.centre);
        0.5 * self.einstein_radius / r
    }
    fn potential_at(&self, coords: [f64; 2]) -> f64 {
        let (_, r) = offset(coords, self.centre);
        self.einstein_radius * r
    }
    fn deflections_at(&self, coords: [f64; 2]) -> [f64; 2] {
        let ([dy, dx], r) = offset(coords, self.centre);
        [self.einstein_radius * dy / r, self.einstein_radius * dx / r]
    }
}

/// Point mass, its convergence is zero away from the centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMass {
    pub centre: [f64; 2],
    pub einstein_radius: f64,
}
impl PointMass {
    fn potential_at(&self, coords: [f64; 2]) -> f64 {
        let (_, r) = offset(coords, self.centre);
        self.einstein_radius.powi(2) * r.ln()
    }
    fn deflections_at(&self, coords: [f64; 2]) -> [f64; 2] {
        let ([dy, dx], r) = offset(coords, self.centre);
        let f = self.einstein_radius.powi(2) / (r * r);
        [f * dy, f * dx]
    }
}
impl Evaluable for PointMass {
    fn label(&self) -> String {
        String::from("point mass")
    }
    fn supports(&self, quantity: Quantity) -> bool {
        quantity.is_mass()
    }
    fn convergence(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        Ok(vec![0f64; grid.len()])
    }
    fn potential(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        Ok(grid.iter().map(|&c| self.potential_at(c)).collect())
    }
    fn deflections(&self, grid: &[[f64; 2]]) -> Result<Vec<[f64; 2]>> {
        Ok(grid.iter().map(|&c| self.deflections_at(c)).collect())
    }
    fn mass_profile_centres(&self) -> Vec<[f64; 2]> {
        vec![self.centre]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MassProfile {
    SphericalIsothermal(SphericalIsothermal),
    PointMass(PointMass),
}
impl From<SphericalIsothermal> for MassProfile {
    fn from(value: SphericalIsothermal) -> Self {
        MassProfile::SphericalIsothermal(value)
    }
}
impl From<PointMass> for MassProfile {
    fn from(value: PointMass) -> Self {
        MassProfile::PointMass(value)
    }
}
impl MassProfile {
    pub fn kind(&self) -> ProfileKind {
        match self {
            MassProfile::SphericalIsothermal(_) => ProfileKind::SphericalIsothermal,
            MassProfile::PointMass(_) => ProfileKind::PointMass,
        }
    }
    pub fn centre(&self) -> [f64; 2] {
        match self {
            MassProfile::SphericalIsothermal(p) => p.centre,
            MassProfile::PointMass(p) => p.centre,
        }
    }
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            MassProfile::SphericalIsothermal(SphericalIsothermal {
                centre,
                einstein_radius,
            })
            | MassProfile::PointMass(PointMass {
                centre,
                einstein_radius,
            }) => vec![centre[0], centre[1], *einstein_radius],
        }
    }
}
impl Evaluable for MassProfile {
    fn label(&self) -> String {
        format!("mass profile {}", self.kind())
    }
    fn supports(&self, quantity: Quantity) -> bool {
        quantity.is_mass()
    }
    fn convergence(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        match self {
            MassProfile::SphericalIsothermal(sis) => {
                Ok(grid.iter().map(|&c| sis.convergence_at(c)).collect())
            }
            MassProfile::PointMass(point) => point.convergence(grid),
        }
    }
    fn potential(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        match self {
            MassProfile::SphericalIsothermal(sis) => {
                Ok(grid.iter().map(|&c| sis.potential_at(c)).collect())
            }
            MassProfile::PointMass(point) => point.potential(grid),
        }
    }
    fn deflections(&self, grid: &[[f64; 2]]) -> Result<Vec<[f64; 2]>> {
        match self {
            MassProfile::SphericalIsothermal(sis) => {
                Ok(grid.iter().map(|&c| sis.deflections_at(c)).collect())
            }
            MassProfile::PointMass(point) => point.deflections(grid),
        }
    }
    fn mass_profile_centres(&self) -> Vec<[f64; 2]> {
        vec![self.centre()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isothermal_deflections_point_away_from_centre() {
        let sis = MassProfile::from(SphericalIsothermal {
            centre: [0., 0.],
            einstein_radius: 1.2,
        });
        let alpha = sis.deflections(&[[1., 0.], [0., -2.]]).unwrap();
        assert_eq!(alpha[0], [1.2, 0.]);
        assert_eq!(alpha[1], [0., -1.2]);
        assert!(sis.profile_image(&[[0., 0.]]).is_err());
    }

    #[test]
    fn isothermal_critical_curve_at_einstein_radius() {
        let sis = MassProfile::from(SphericalIsothermal {
            centre: [0., 0.],
            einstein_radius: 1.,
        });
        // mu = r / (r - theta_E)
        let mu = sis.magnification(&[[0., 2.]]).unwrap()[0];
        assert!((mu - 2.).abs() < 1e-4);
    }
}
