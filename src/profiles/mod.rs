//! Analytic light and mass profiles
//!
//! Every quantity is evaluated at a slice of `[y, x]` coordinates through the
//! [`Evaluable`] capability trait. A subject advertises what it can compute
//! with [`Evaluable::supports`], the remaining methods default to
//! [`EvalError::Unsupported`].

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

mod light;
mod mass;

pub use light::{EllipticalExponential, EllipticalSersic, LightProfile};
pub use mass::{MassProfile, PointMass, SphericalIsothermal};

/// Step of the finite differences of the deflection angles
const FINITE_DIFFERENCE_STEP: f64 = 1e-5;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("{subject} cannot compute the {quantity}")]
    Unsupported { subject: String, quantity: Quantity },
    #[error("{kind} takes {expected} parameters, found {found}")]
    ParameterCount {
        kind: ProfileKind,
        expected: usize,
        found: usize,
    },
}
type Result<T> = std::result::Result<T, EvalError>;

/// Quantities a subject may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Quantity {
    Image,
    Convergence,
    Potential,
    Deflections,
    Magnification,
}
impl Quantity {
    pub fn is_mass(&self) -> bool {
        !matches!(self, Quantity::Image)
    }
}

/// Capability interface of profiles, galaxies and planes
pub trait Evaluable {
    /// Short description used in error messages
    fn label(&self) -> String;
    fn supports(&self, quantity: Quantity) -> bool;
    fn unsupported(&self, quantity: Quantity) -> EvalError {
        EvalError::Unsupported {
            subject: self.label(),
            quantity,
        }
    }
    /// Checks that `quantity` can be computed
    fn check(&self, quantity: Quantity) -> Result<()> {
        if self.supports(quantity) {
            Ok(())
        } else {
            Err(self.unsupported(quantity))
        }
    }
    fn profile_image(&self, _grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        Err(self.unsupported(Quantity::Image))
    }
    fn convergence(&self, _grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        Err(self.unsupported(Quantity::Convergence))
    }
    fn potential(&self, _grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        Err(self.unsupported(Quantity::Potential))
    }
    /// Deflection angles, one `[y, x]` pair per coordinate
    fn deflections(&self, _grid: &[[f64; 2]]) -> Result<Vec<[f64; 2]>> {
        Err(self.unsupported(Quantity::Deflections))
    }
    /// Magnification `1/det(A)` with the lensing Jacobian `A` computed from
    /// central finite differences of the deflection angles
    fn magnification(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        self.check(Quantity::Magnification)?;
        let h = FINITE_DIFFERENCE_STEP;
        let shifted: Vec<[f64; 2]> = grid
            .iter()
            .flat_map(|&[y, x]| [[y + h, x], [y - h, x], [y, x + h], [y, x - h]])
            .collect();
        let deflections = self.deflections(&shifted)?;
        Ok(deflections
            .chunks_exact(4)
            .map(|d| {
                let day_dy = (d[0][0] - d[1][0]) / (2. * h);
                let dax_dy = (d[0][1] - d[1][1]) / (2. * h);
                let day_dx = (d[2][0] - d[3][0]) / (2. * h);
                let dax_dx = (d[2][1] - d[3][1]) / (2. * h);
                1. / ((1. - day_dy) * (1. - dax_dx) - dax_dy * day_dx)
            })
            .collect())
    }
    fn light_profile_centres(&self) -> Vec<[f64; 2]> {
        Vec::new()
    }
    fn mass_profile_centres(&self) -> Vec<[f64; 2]> {
        Vec::new()
    }
}

/// Profile families, with the ordered names of their parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display, Serialize, Deserialize)]
pub enum ProfileKind {
    EllipticalSersic,
    EllipticalExponential,
    SphericalIsothermal,
    PointMass,
}
impl ProfileKind {
    pub fn parameter_names(&self) -> &'static [&'static str] {
        use ProfileKind::*;
        match self {
            EllipticalSersic => &[
                "centre_0",
                "centre_1",
                "axis_ratio",
                "phi",
                "intensity",
                "effective_radius",
                "sersic_index",
            ],
            EllipticalExponential => &[
                "centre_0",
                "centre_1",
                "axis_ratio",
                "phi",
                "intensity",
                "effective_radius",
            ],
            SphericalIsothermal | PointMass => &["centre_0", "centre_1", "einstein_radius"],
        }
    }
    pub fn is_light(&self) -> bool {
        matches!(
            self,
            ProfileKind::EllipticalSersic | ProfileKind::EllipticalExponential
        )
    }
    fn check_count(&self, values: &[f64]) -> Result<()> {
        let expected = self.parameter_names().len();
        if values.len() != expected {
            return Err(EvalError::ParameterCount {
                kind: *self,
                expected,
                found: values.len(),
            });
        }
        Ok(())
    }
}

/// A light or a mass profile built from a flat parameter vector
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Light(LightProfile),
    Mass(MassProfile),
}
impl Profile {
    /// Builds a profile from its parameters, ordered as [`ProfileKind::parameter_names`]
    pub fn from_parameters(kind: ProfileKind, values: &[f64]) -> Result<Self> {
        kind.check_count(values)?;
        let v = values;
        Ok(match kind {
            ProfileKind::EllipticalSersic => Profile::Light(LightProfile::EllipticalSersic(
                EllipticalSersic {
                    centre: [v[0], v[1]],
                    axis_ratio: v[2],
                    phi: v[3],
                    intensity: v[4],
                    effective_radius: v[5],
                    sersic_index: v[6],
                },
            )),
            ProfileKind::EllipticalExponential => Profile::Light(
                LightProfile::EllipticalExponential(EllipticalExponential {
                    centre: [v[0], v[1]],
                    axis_ratio: v[2],
                    phi: v[3],
                    intensity: v[4],
                    effective_radius: v[5],
                }),
            ),
            ProfileKind::SphericalIsothermal => {
                Profile::Mass(MassProfile::SphericalIsothermal(SphericalIsothermal {
                    centre: [v[0], v[1]],
                    einstein_radius: v[2],
                }))
            }
            ProfileKind::PointMass => Profile::Mass(MassProfile::PointMass(PointMass {
                centre: [v[0], v[1]],
                einstein_radius: v[2],
            })),
        })
    }
    pub fn kind(&self) -> ProfileKind {
        match self {
            Profile::Light(light) => light.kind(),
            Profile::Mass(mass) => mass.kind(),
        }
    }
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            Profile::Light(light) => light.parameters(),
            Profile::Mass(mass) => mass.parameters(),
        }
    }
}

/// Coordinates shifted to `centre` and rotated by `phi` degrees counter-clockwise from the x axis
pub(crate) fn to_profile_frame(coords: [f64; 2], centre: [f64; 2], phi: f64) -> [f64; 2] {
    let (dy, dx) = (coords[0] - centre[0], coords[1] - centre[1]);
    let (sin, cos) = phi.to_radians().sin_cos();
    [dy * cos - dx * sin, dx * cos + dy * sin]
}
