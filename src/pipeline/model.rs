//! Galaxy models: priors on the parameters of the profiles of galaxies
//!
//! A [Model] maps the vector of its free parameters to a [ModelInstance].
//! Free parameters are ordered by galaxy, then light profiles before mass
//! profiles, then by the parameter names of each profile kind.

use super::{PipelineError, Prior, Result};
use crate::{
    config::PriorPassing,
    galaxy::{Galaxy, HyperGalaxy, Named, Plane},
    inversion::Pixelization,
    profiles::{Profile, ProfileKind},
};

fn default_prior(name: &str) -> Prior {
    match name {
        "centre_0" | "centre_1" => Prior::gaussian(0., 0.3),
        "axis_ratio" => Prior::uniform(0.2, 1.),
        "phi" => Prior::uniform(0., 180.),
        "intensity" => Prior::uniform(0., 1.),
        "effective_radius" => Prior::uniform(0., 4.),
        "sersic_index" => Prior::uniform(0.8, 8.),
        "einstein_radius" => Prior::uniform(0., 4.),
        _ => Prior::uniform(0., 1.),
    }
}

/// Priors on the parameters of one profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileModel {
    kind: ProfileKind,
    priors: Vec<Prior>,
}
impl ProfileModel {
    /// Model with the default priors of the profile kind
    pub fn new(kind: ProfileKind) -> Self {
        Self {
            kind,
            priors: kind.parameter_names().iter().map(|n| default_prior(n)).collect(),
        }
    }
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }
    fn index(&self, name: &str) -> Result<usize> {
        self.kind
            .parameter_names()
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| PipelineError::UnknownParameter {
                kind: self.kind,
                name: name.to_string(),
            })
    }
    pub fn with_prior(mut self, name: &str, prior: Prior) -> Result<Self> {
        let i = self.index(name)?;
        self.priors[i] = prior;
        Ok(self)
    }
    /// Fixes a parameter to `value`
    pub fn fix(self, name: &str, value: f64) -> Result<Self> {
        self.with_prior(name, Prior::Fixed(value))
    }
    pub fn prior(&self, name: &str) -> Result<Prior> {
        Ok(self.priors[self.index(name)?])
    }
    fn free_priors(&self) -> impl Iterator<Item = (&'static str, &Prior)> {
        self.kind
            .parameter_names()
            .iter()
            .copied()
            .zip(&self.priors)
            .filter(|(_, p)| p.is_free())
    }
    fn free_priors_mut(&mut self) -> impl Iterator<Item = &mut Prior> {
        self.priors.iter_mut().filter(|p| p.is_free())
    }
    fn instance(&self, values: &mut impl Iterator<Item = f64>) -> Result<Profile> {
        let parameters = self
            .priors
            .iter()
            .map(|prior| match prior {
                Prior::Fixed(value) => Ok(*value),
                _ => values.next().ok_or(PipelineError::TooFewParameters),
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Profile::from_parameters(self.kind, &parameters)?)
    }
}

/// Priors of the profiles of a galaxy
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GalaxyModel {
    pub redshift: f64,
    pub light: Vec<Named<ProfileModel>>,
    pub mass: Vec<Named<ProfileModel>>,
    pub hyper_galaxy: Option<HyperGalaxy>,
    pub pixelization: Option<Pixelization>,
}
impl GalaxyModel {
    pub fn new(redshift: f64) -> Self {
        Self {
            redshift,
            ..Default::default()
        }
    }
    pub fn light(mut self, name: impl Into<String>, kind: impl Into<ProfileModel>) -> Self {
        self.light.push(Named::new(name, kind.into()));
        self
    }
    pub fn mass(mut self, name: impl Into<String>, kind: impl Into<ProfileModel>) -> Self {
        self.mass.push(Named::new(name, kind.into()));
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
    /// Model of the profile `name`
    pub fn profile(&self, name: &str) -> Option<&ProfileModel> {
        self.light
            .iter()
            .chain(&self.mass)
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
    fn profiles(&self) -> impl Iterator<Item = &Named<ProfileModel>> {
        self.light.iter().chain(&self.mass)
    }
    fn instance(&self, values: &mut impl Iterator<Item = f64>) -> Result<Galaxy> {
        let slot_error = |profile: &Named<ProfileModel>| PipelineError::ProfileSlot {
            name: profile.name.clone(),
            kind: profile.value.kind,
        };
        let mut galaxy = Galaxy::new(self.redshift);
        for profile in &self.light {
            match profile.value.instance(values)? {
                Profile::Light(light) => galaxy = galaxy.light(profile.name.clone(), light),
                Profile::Mass(_) => return Err(slot_error(profile)),
            }
        }
        for profile in &self.mass {
            match profile.value.instance(values)? {
                Profile::Mass(mass) => galaxy = galaxy.mass(profile.name.clone(), mass),
                Profile::Light(_) => return Err(slot_error(profile)),
            }
        }
        galaxy.hyper_galaxy = self.hyper_galaxy;
        galaxy.pixelization = self.pixelization;
        Ok(galaxy)
    }
}
impl From<ProfileKind> for ProfileModel {
    fn from(kind: ProfileKind) -> Self {
        ProfileModel::new(kind)
    }
}

/// A galaxy of a model: free parameters or a fixed instance
#[derive(Debug, Clone, PartialEq)]
pub enum GalaxyComponent {
    Model(GalaxyModel),
    Instance(Galaxy),
}
impl From<GalaxyModel> for GalaxyComponent {
    fn from(model: GalaxyModel) -> Self {
        GalaxyComponent::Model(model)
    }
}
impl From<Galaxy> for GalaxyComponent {
    fn from(galaxy: Galaxy) -> Self {
        GalaxyComponent::Instance(galaxy)
    }
}

/// The named galaxies of a phase
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub galaxies: Vec<Named<GalaxyComponent>>,
}
impl Model {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn galaxy(mut self, name: impl Into<String>, galaxy: impl Into<GalaxyComponent>) -> Self {
        self.galaxies.push(Named::new(name, galaxy.into()));
        self
    }
    pub fn get(&self, name: &str) -> Result<&GalaxyComponent> {
        self.galaxies
            .iter()
            .find(|g| g.name == name)
            .map(|g| &g.value)
            .ok_or_else(|| PipelineError::MissingGalaxy(name.to_string()))
    }
    /// Free model of the galaxy `name`
    pub fn galaxy_model(&self, name: &str) -> Result<GalaxyModel> {
        match self.get(name)? {
            GalaxyComponent::Model(model) => Ok(model.clone()),
            GalaxyComponent::Instance(_) => Err(PipelineError::NotAModel(name.to_string())),
        }
    }
    fn models(&self) -> impl Iterator<Item = (&str, &GalaxyModel)> {
        self.galaxies.iter().filter_map(|g| match &g.value {
            GalaxyComponent::Model(model) => Some((g.name.as_str(), model)),
            GalaxyComponent::Instance(_) => None,
        })
    }
    /// Priors of the free parameters
    pub fn priors(&self) -> Vec<Prior> {
        self.models()
            .flat_map(|(_, model)| model.profiles())
            .flat_map(|profile| profile.value.free_priors().map(|(_, p)| *p))
            .collect()
    }
    pub fn prior_count(&self) -> usize {
        self.priors().len()
    }
    /// `galaxy.profile.parameter` paths of the free parameters
    pub fn parameter_names(&self) -> Vec<String> {
        self.models()
            .flat_map(|(galaxy, model)| {
                model.profiles().flat_map(move |profile| {
                    profile
                        .value
                        .free_priors()
                        .map(move |(name, _)| format!("{galaxy}.{}.{name}", profile.name))
                })
            })
            .collect()
    }
    pub fn instance_from_vector(&self, vector: &[f64]) -> Result<ModelInstance> {
        let expected = self.prior_count();
        if vector.len() != expected {
            return Err(PipelineError::ParameterCount {
                expected,
                found: vector.len(),
            });
        }
        let mut values = vector.iter().copied();
        let galaxies = self
            .galaxies
            .iter()
            .map(|g| {
                let galaxy = match &g.value {
                    GalaxyComponent::Model(model) => model.instance(&mut values)?,
                    GalaxyComponent::Instance(galaxy) => galaxy.clone(),
                };
                Ok(Named::new(g.name.clone(), galaxy))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ModelInstance { galaxies })
    }
    pub fn instance_from_prior_medians(&self) -> Result<ModelInstance> {
        let medians: Vec<f64> = self.priors().iter().map(Prior::median).collect();
        self.instance_from_vector(&medians)
    }
    /// Model with Gaussian priors centred on `values`
    ///
    /// The width of a prior is `sigma` times the error of the parameter, at least `minimum_width`.
    pub fn continued(&self, values: &[f64], errors: &[f64], passing: &PriorPassing) -> Result<Self> {
        let expected = self.prior_count();
        if values.len() != expected || errors.len() != expected {
            return Err(PipelineError::ParameterCount {
                expected,
                found: values.len().min(errors.len()),
            });
        }
        let mut model = self.clone();
        let priors = model
            .galaxies
            .iter_mut()
            .filter_map(|g| match &mut g.value {
                GalaxyComponent::Model(model) => Some(model),
                GalaxyComponent::Instance(_) => None,
            })
            .flat_map(|model| model.light.iter_mut().chain(model.mass.iter_mut()))
            .flat_map(|profile| profile.value.free_priors_mut());
        for ((prior, &value), &error) in priors.zip(values).zip(errors) {
            *prior = Prior::gaussian(value, (passing.sigma * error).max(passing.minimum_width));
        }
        Ok(model)
    }
}

/// Galaxies of a model for one parameter vector
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelInstance {
    pub galaxies: Vec<Named<Galaxy>>,
}
impl ModelInstance {
    pub fn galaxy(&self, name: &str) -> Result<&Galaxy> {
        self.galaxies
            .iter()
            .find(|g| g.name == name)
            .map(|g| &g.value)
            .ok_or_else(|| PipelineError::MissingGalaxy(name.to_string()))
    }
    pub fn plane(&self) -> Plane {
        Plane::new(self.galaxies.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        let bulge = ProfileModel::new(ProfileKind::EllipticalSersic)
            .fix("centre_0", -1.)
            .unwrap()
            .fix("centre_1", -1.)
            .unwrap();
        Model::new()
            .galaxy("galaxy_0", GalaxyModel::new(0.5).light("bulge", bulge))
            .galaxy(
                "lens",
                GalaxyModel::new(0.5).mass("sis", ProfileKind::SphericalIsothermal),
            )
    }

    #[test]
    fn free_parameters() {
        let model = model();
        assert_eq!(model.prior_count(), 5 + 3);
        let names = model.parameter_names();
        assert_eq!(names[0], "galaxy_0.bulge.axis_ratio");
        assert_eq!(names[7], "lens.sis.einstein_radius");
        let instance = model.instance_from_prior_medians().unwrap();
        let galaxy = instance.galaxy("galaxy_0").unwrap();
        assert_eq!(galaxy.light[0].value.centre(), [-1., -1.]);
        assert!(matches!(
            model.instance_from_vector(&[0.; 3]),
            Err(PipelineError::ParameterCount { expected: 8, found: 3 })
        ));
        assert!(ProfileModel::new(ProfileKind::PointMass).fix("intensity", 1.).is_err());
    }

    #[test]
    fn profile_in_wrong_slot() {
        let model = Model::new().galaxy(
            "galaxy",
            GalaxyModel::new(0.5).light("sis", ProfileKind::SphericalIsothermal),
        );
        assert!(matches!(
            model.instance_from_prior_medians(),
            Err(PipelineError::ProfileSlot { .. })
        ));
    }

    #[test]
    fn continued_priors() {
        let model = model().galaxy("fixed", Galaxy::new(1.));
        let n = model.prior_count();
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let errors = vec![0.001; n];
        let continued = model
            .continued(&values, &errors, &PriorPassing::default())
            .unwrap();
        assert_eq!(continued.prior_count(), n);
        let bulge = continued.galaxy_model("galaxy_0").unwrap();
        let bulge = bulge.profile("bulge").unwrap();
        assert_eq!(bulge.prior("centre_0").unwrap(), Prior::Fixed(-1.));
        assert_eq!(bulge.prior("axis_ratio").unwrap(), Prior::gaussian(0., 0.05));
        assert!(matches!(
            continued.galaxy_model("fixed"),
            Err(PipelineError::NotAModel(_))
        ));
    }
}
