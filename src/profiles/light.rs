use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{to_profile_frame, Evaluable, ProfileKind, Quantity, Result};

const RADIAL_STEPS: usize = 200;
const ANGULAR_STEPS: usize = 64;

/// Sersic constant `b(n)`, asymptotic expansion of Ciotti & Bertin (1999)
fn sersic_constant(n: f64) -> f64 {
    2. * n - 1. / 3. + 4. / (405. * n) + 46. / (25515. * n.powi(2)) + 131. / (1148175. * n.powi(3))
        - 2194697. / (30690717750. * n.powi(4))
}

/// Elliptical Sersic light profile
///
/// `phi` is the position angle of the major axis in degrees, counter-clockwise
/// from the positive x axis, and `effective_radius` the circularized half-light radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipticalSersic {
    pub centre: [f64; 2],
    pub axis_ratio: f64,
    pub phi: f64,
    pub intensity: f64,
    pub effective_radius: f64,
    pub sersic_index: f64,
}
impl Default for EllipticalSersic {
    fn default() -> Self {
        Self {
            centre: [0., 0.],
            axis_ratio: 1.,
            phi: 0.,
            intensity: 0.1,
            effective_radius: 0.6,
            sersic_index: 4.,
        }
    }
}
impl EllipticalSersic {
    fn radius(&self, coords: [f64; 2]) -> f64 {
        let [y, x] = to_profile_frame(coords, self.centre, self.phi);
        let q = self.axis_ratio;
        q.sqrt() * x.hypot(y / q)
    }
    pub fn intensity_at(&self, coords: [f64; 2]) -> f64 {
        let n = self.sersic_index;
        let r = self.radius(coords) / self.effective_radius;
        self.intensity * (-sersic_constant(n) * (r.powf(1. / n) - 1.)).exp()
    }
}

/// Elliptical Sersic profile with a Sersic index of 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipticalExponential {
    pub centre: [f64; 2],
    pub axis_ratio: f64,
    pub phi: f64,
    pub intensity: f64,
    pub effective_radius: f64,
}
impl From<&EllipticalExponential> for EllipticalSersic {
    fn from(exp: &EllipticalExponential) -> Self {
        Self {
            centre: exp.centre,
            axis_ratio: exp.axis_ratio,
            phi: exp.phi,
            intensity: exp.intensity,
            effective_radius: exp.effective_radius,
            sersic_index: 1.,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LightProfile {
    EllipticalSersic(EllipticalSersic),
    EllipticalExponential(EllipticalExponential),
}
impl From<EllipticalSersic> for LightProfile {
    fn from(value: EllipticalSersic) -> Self {
        LightProfile::EllipticalSersic(value)
    }
}
impl From<EllipticalExponential> for LightProfile {
    fn from(value: EllipticalExponential) -> Self {
        LightProfile::EllipticalExponential(value)
    }
}
impl LightProfile {
    fn as_sersic(&self) -> EllipticalSersic {
        match self {
            LightProfile::EllipticalSersic(sersic) => sersic.clone(),
            LightProfile::EllipticalExponential(exp) => exp.into(),
        }
    }
    pub fn kind(&self) -> ProfileKind {
        match self {
            LightProfile::EllipticalSersic(_) => ProfileKind::EllipticalSersic,
            LightProfile::EllipticalExponential(_) => ProfileKind::EllipticalExponential,
        }
    }
    pub fn centre(&self) -> [f64; 2] {
        match self {
            LightProfile::EllipticalSersic(p) => p.centre,
            LightProfile::EllipticalExponential(p) => p.centre,
        }
    }
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            LightProfile::EllipticalSersic(p) => vec![
                p.centre[0],
                p.centre[1],
                p.axis_ratio,
                p.phi,
                p.intensity,
                p.effective_radius,
                p.sersic_index,
            ],
            LightProfile::EllipticalExponential(p) => vec![
                p.centre[0],
                p.centre[1],
                p.axis_ratio,
                p.phi,
                p.intensity,
                p.effective_radius,
            ],
        }
    }
    /// Total luminosity inside a circle of `radius` arcsec around the profile centre
    pub fn luminosity_within_circle(&self, radius: f64) -> f64 {
        let sersic = self.as_sersic();
        let [yc, xc] = sersic.centre;
        let dr = radius / RADIAL_STEPS as f64;
        let dtheta = 2. * PI / ANGULAR_STEPS as f64;
        (0..RADIAL_STEPS)
            .map(|i| {
                let r = (i as f64 + 0.5) * dr;
                (0..ANGULAR_STEPS)
                    .map(|j| {
                        let (sin, cos) = ((j as f64 + 0.5) * dtheta).sin_cos();
                        sersic.intensity_at([yc + r * sin, xc + r * cos])
                    })
                    .sum::<f64>()
                    * r
                    * dr
                    * dtheta
            })
            .sum()
    }
}
impl Evaluable for LightProfile {
    fn label(&self) -> String {
        format!("light profile {}", self.kind())
    }
    fn supports(&self, quantity: Quantity) -> bool {
        quantity == Quantity::Image
    }
    fn profile_image(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        let sersic = self.as_sersic();
        Ok(grid.iter().map(|&c| sersic.intensity_at(c)).collect())
    }
    fn light_profile_centres(&self) -> Vec<[f64; 2]> {
        vec![self.centre()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_at_effective_radius() {
        let sersic = EllipticalSersic {
            intensity: 2.,
            effective_radius: 1.5,
            ..Default::default()
        };
        assert!((sersic.intensity_at([0., 1.5]) - 2.).abs() < 1e-12);
        assert!(sersic.intensity_at([0., 0.]) > sersic.intensity_at([0., 1.]));
    }

    #[test]
    fn half_light_within_effective_radius() {
        let light = LightProfile::from(EllipticalExponential {
            centre: [0., 0.],
            axis_ratio: 1.,
            phi: 0.,
            intensity: 1.,
            effective_radius: 1.,
        });
        let half = light.luminosity_within_circle(1.);
        let total = light.luminosity_within_circle(30.);
        assert!((half / total - 0.5).abs() < 0.01);
    }

    #[test]
    fn mass_quantities_unsupported() {
        let light = LightProfile::from(EllipticalSersic::default());
        assert!(light.convergence(&[[0., 0.]]).is_err());
        assert!(light.magnification(&[[0., 0.]]).is_err());
    }

    #[test]
    fn yaml_tagged() {
        let light: LightProfile = serde_yaml::from_str(
            "type: EllipticalExponential\ncentre: [0.0, 0.1]\naxis_ratio: 0.8\nphi: 45.0\nintensity: 0.2\neffective_radius: 1.0\n",
        )
        .unwrap();
        assert_eq!(light.kind(), ProfileKind::EllipticalExponential);
        assert_eq!(light.centre(), [0., 0.1]);
    }
}
