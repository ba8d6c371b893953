//! Galaxies: named light and mass profiles at a redshift

use serde::{Deserialize, Serialize};

use crate::{
    inversion::Pixelization,
    profiles::{EvalError, Evaluable, LightProfile, MassProfile, Quantity},
    structures::{Array2D, StructureError},
};

type Result<T> = std::result::Result<T, EvalError>;

/// A named component, the name is flattened next to the component fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Named<T> {
    pub name: String,
    #[serde(flatten)]
    pub value: T,
}
impl<T> Named<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Scales the noise of the pixels a galaxy is poorly fitted in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperGalaxy {
    pub contribution_factor: f64,
    pub noise_factor: f64,
    pub noise_power: f64,
}
impl Default for HyperGalaxy {
    fn default() -> Self {
        Self {
            contribution_factor: 0.,
            noise_factor: 0.,
            noise_power: 1.,
        }
    }
}
impl HyperGalaxy {
    pub const PARAMETER_NAMES: [&'static str; 3] =
        ["contribution_factor", "noise_factor", "noise_power"];

    pub fn from_parameters(values: [f64; 3]) -> Self {
        let [contribution_factor, noise_factor, noise_power] = values;
        Self {
            contribution_factor,
            noise_factor,
            noise_power,
        }
    }
    pub fn parameters(&self) -> [f64; 3] {
        [self.contribution_factor, self.noise_factor, self.noise_power]
    }
    /// Fraction of the model image a galaxy accounts for, normalized to a peak of 1
    pub fn contribution_map(
        &self,
        hyper_model_image: &Array2D,
        hyper_galaxy_image: &Array2D,
    ) -> std::result::Result<Array2D, StructureError> {
        let map = hyper_galaxy_image.zip_with(hyper_model_image, |galaxy, model| {
            galaxy / (model + self.contribution_factor)
        })?;
        Ok(match map.max() {
            Some(max) if max > 0. => map.map(|x| x / max),
            _ => map,
        })
    }
    /// Noise added to `noise_map` for the given contribution map
    pub fn hyper_noise_map(
        &self,
        noise_map: &Array2D,
        contribution_map: &Array2D,
    ) -> std::result::Result<Array2D, StructureError> {
        contribution_map.zip_with(noise_map, |c, n| {
            self.noise_factor * (c * n).powf(self.noise_power)
        })
    }
}

/// A galaxy, its profiles kept in the order they were added
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Galaxy {
    pub redshift: f64,
    #[serde(default)]
    pub light: Vec<Named<LightProfile>>,
    #[serde(default)]
    pub mass: Vec<Named<MassProfile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyper_galaxy: Option<HyperGalaxy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixelization: Option<Pixelization>,
    #[serde(skip)]
    pub hyper_model_image: Option<Array2D>,
    #[serde(skip)]
    pub hyper_galaxy_image: Option<Array2D>,
}
impl Galaxy {
    pub fn new(redshift: f64) -> Self {
        Self {
            redshift,
            ..Default::default()
        }
    }
    pub fn light(mut self, name: impl Into<String>, profile: impl Into<LightProfile>) -> Self {
        self.light.push(Named::new(name, profile.into()));
        self
    }
    pub fn mass(mut self, name: impl Into<String>, profile: impl Into<MassProfile>) -> Self {
        self.mass.push(Named::new(name, profile.into()));
        self
    }
    pub fn hyper_galaxy(self, hyper_galaxy: HyperGalaxy) -> Self {
        Self {
            hyper_galaxy: Some(hyper_galaxy),
            ..self
        }
    }
    pub fn pixelization(self, pixelization: Pixelization) -> Self {
        Self {
            pixelization: Some(pixelization),
            ..self
        }
    }
    /// Attaches the images a hyper galaxy computes its contribution map from
    pub fn hyper_images(self, model_image: Array2D, galaxy_image: Array2D) -> Self {
        Self {
            hyper_model_image: Some(model_image),
            hyper_galaxy_image: Some(galaxy_image),
            ..self
        }
    }
    pub fn has_light_profile(&self) -> bool {
        !self.light.is_empty()
    }
    pub fn has_mass_profile(&self) -> bool {
        !self.mass.is_empty()
    }
    /// Contribution map of the hyper galaxy, if both the hyper galaxy and its images are set
    pub fn contribution_map(&self) -> Option<Array2D> {
        match (
            &self.hyper_galaxy,
            &self.hyper_model_image,
            &self.hyper_galaxy_image,
        ) {
            (Some(hyper), Some(model), Some(galaxy)) => hyper.contribution_map(model, galaxy).ok(),
            _ => None,
        }
    }
}

fn sum_scalars<'a, P: Evaluable + 'a>(
    mut profiles: impl Iterator<Item = &'a P>,
    grid: &[[f64; 2]],
    f: impl Fn(&P, &[[f64; 2]]) -> Result<Vec<f64>>,
) -> Result<Vec<f64>> {
    profiles.try_fold(vec![0f64; grid.len()], |mut total, profile| {
        total
            .iter_mut()
            .zip(f(profile, grid)?)
            .for_each(|(t, v)| *t += v);
        Ok(total)
    })
}

fn sum_vectors<'a, P: Evaluable + 'a>(
    mut profiles: impl Iterator<Item = &'a P>,
    grid: &[[f64; 2]],
) -> Result<Vec<[f64; 2]>> {
    profiles.try_fold(vec![[0f64; 2]; grid.len()], |mut total, profile| {
        total
            .iter_mut()
            .zip(profile.deflections(grid)?)
            .for_each(|(t, [y, x])| {
                t[0] += y;
                t[1] += x;
            });
        Ok(total)
    })
}

impl Evaluable for Galaxy {
    fn label(&self) -> String {
        format!("galaxy at redshift {}", self.redshift)
    }
    fn supports(&self, quantity: Quantity) -> bool {
        if quantity.is_mass() {
            self.has_mass_profile()
        } else {
            self.has_light_profile()
        }
    }
    fn profile_image(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        self.check(Quantity::Image)?;
        sum_scalars(self.light.iter().map(|p| &p.value), grid, |p, g| {
            p.profile_image(g)
        })
    }
    fn convergence(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        self.check(Quantity::Convergence)?;
        sum_scalars(self.mass.iter().map(|p| &p.value), grid, |p, g| {
            p.convergence(g)
        })
    }
    fn potential(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        self.check(Quantity::Potential)?;
        sum_scalars(self.mass.iter().map(|p| &p.value), grid, |p, g| p.potential(g))
    }
    fn deflections(&self, grid: &[[f64; 2]]) -> Result<Vec<[f64; 2]>> {
        self.check(Quantity::Deflections)?;
        sum_vectors(self.mass.iter().map(|p| &p.value), grid)
    }
    fn light_profile_centres(&self) -> Vec<[f64; 2]> {
        self.light.iter().map(|p| p.value.centre()).collect()
    }
    fn mass_profile_centres(&self) -> Vec<[f64; 2]> {
        self.mass.iter().map(|p| p.value.centre()).collect()
    }
}

/// Named galaxies observed together
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plane {
    pub galaxies: Vec<Named<Galaxy>>,
}
impl Plane {
    pub fn new(galaxies: Vec<Named<Galaxy>>) -> Self {
        Self { galaxies }
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.galaxies.iter().map(|g| g.name.as_str())
    }
    pub fn get(&self, name: &str) -> Option<&Galaxy> {
        self.galaxies
            .iter()
            .find(|g| g.name == name)
            .map(|g| &g.value)
    }
    pub fn has_hyper_galaxy(&self) -> bool {
        self.galaxies.iter().any(|g| g.value.hyper_galaxy.is_some())
    }
    /// Pixelization of the first galaxy carrying one
    pub fn pixelization(&self) -> Option<&Pixelization> {
        self.galaxies
            .iter()
            .find_map(|g| g.value.pixelization.as_ref())
    }
    /// Image of every galaxy, zero for galaxies without light
    pub fn images_of_galaxies(&self, grid: &[[f64; 2]]) -> Result<Vec<Vec<f64>>> {
        self.galaxies
            .iter()
            .map(|g| {
                if g.value.has_light_profile() {
                    g.value.profile_image(grid)
                } else {
                    Ok(vec![0f64; grid.len()])
                }
            })
            .collect()
    }
}
impl Evaluable for Plane {
    fn label(&self) -> String {
        format!("plane of {} galaxies", self.galaxies.len())
    }
    fn supports(&self, quantity: Quantity) -> bool {
        self.galaxies.iter().any(|g| g.value.supports(quantity))
    }
    fn profile_image(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        self.check(Quantity::Image)?;
        sum_scalars(
            self.galaxies
                .iter()
                .map(|g| &g.value)
                .filter(|g| g.has_light_profile()),
            grid,
            |g, grid| g.profile_image(grid),
        )
    }
    fn convergence(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        self.check(Quantity::Convergence)?;
        sum_scalars(
            self.galaxies
                .iter()
                .map(|g| &g.value)
                .filter(|g| g.has_mass_profile()),
            grid,
            |g, grid| g.convergence(grid),
        )
    }
    fn potential(&self, grid: &[[f64; 2]]) -> Result<Vec<f64>> {
        self.check(Quantity::Potential)?;
        sum_scalars(
            self.galaxies
                .iter()
                .map(|g| &g.value)
                .filter(|g| g.has_mass_profile()),
            grid,
            |g, grid| g.potential(grid),
        )
    }
    fn deflections(&self, grid: &[[f64; 2]]) -> Result<Vec<[f64; 2]>> {
        self.check(Quantity::Deflections)?;
        sum_vectors(
            self.galaxies
                .iter()
                .map(|g| &g.value)
                .filter(|g| g.has_mass_profile()),
            grid,
        )
    }
    fn light_profile_centres(&self) -> Vec<[f64; 2]> {
        self.galaxies
            .iter()
            .flat_map(|g| g.value.light_profile_centres())
            .collect()
    }
    fn mass_profile_centres(&self) -> Vec<[f64; 2]> {
        self.galaxies
            .iter()
            .flat_map(|g| g.value.mass_profile_centres())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{EllipticalSersic, SphericalIsothermal};

    fn sersic(intensity: f64) -> EllipticalSersic {
        EllipticalSersic {
            intensity,
            ..Default::default()
        }
    }

    #[test]
    fn sums_profiles() {
        let galaxy = Galaxy::new(0.5)
            .light("bulge", sersic(1.))
            .light("disk", sersic(2.));
        let grid = [[0.1, 0.2]];
        let single = LightProfile::from(sersic(1.)).profile_image(&grid).unwrap()[0];
        assert!((galaxy.profile_image(&grid).unwrap()[0] - 3. * single).abs() < 1e-12);
        assert_eq!(galaxy.light_profile_centres().len(), 2);
        assert!(matches!(
            galaxy.convergence(&grid),
            Err(EvalError::Unsupported {
                quantity: Quantity::Convergence,
                ..
            })
        ));
    }

    #[test]
    fn plane_skips_galaxies_without_light() {
        let plane = Plane::new(vec![
            Named::new("lens", Galaxy::new(0.5).light("bulge", sersic(1.))),
            Named::new(
                "dark",
                Galaxy::new(0.5).mass(
                    "halo",
                    SphericalIsothermal {
                        centre: [0., 0.],
                        einstein_radius: 1.,
                    },
                ),
            ),
        ]);
        let grid = [[0., 0.5]];
        assert!(plane.profile_image(&grid).is_ok());
        assert!(plane.convergence(&grid).is_ok());
        assert_eq!(plane.images_of_galaxies(&grid).unwrap()[1], vec![0.]);
    }

    #[test]
    fn contribution_map_peaks_at_one() {
        let model = Array2D::new((1, 2), (1., 1.), vec![2., 4.]).unwrap();
        let galaxy = Array2D::new((1, 2), (1., 1.), vec![1., 4.]).unwrap();
        let hyper = HyperGalaxy {
            contribution_factor: 0.,
            noise_factor: 2.,
            noise_power: 1.,
        };
        let map = hyper.contribution_map(&model, &galaxy).unwrap();
        assert_eq!(map.data(), &[0.5, 1.]);
        let noise = Array2D::full(1., (1, 2), (1., 1.));
        assert_eq!(hyper.hyper_noise_map(&noise, &map).unwrap().data(), &[1., 2.]);
    }

    #[test]
    fn yaml_galaxy() {
        let galaxy: Galaxy = serde_yaml::from_str(
            r#"
redshift: 0.5
light:
  - name: bulge
    type: EllipticalSersic
    centre: [0.0, 0.0]
    axis_ratio: 0.8
    phi: 45.0
    intensity: 1.0
    effective_radius: 0.6
    sersic_index: 4.0
mass:
  - name: halo
    type: SphericalIsothermal
    centre: [0.0, 0.0]
    einstein_radius: 1.6
"#,
        )
        .unwrap();
        assert_eq!(galaxy.light[0].name, "bulge");
        assert!(galaxy.supports(Quantity::Magnification));
    }
}
