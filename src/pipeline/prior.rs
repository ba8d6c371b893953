use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Prior distribution of a model parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prior {
    Uniform { lower: f64, upper: f64 },
    Gaussian { mean: f64, sigma: f64 },
    /// The parameter is not free
    Fixed(f64),
}
impl Prior {
    pub fn uniform(lower: f64, upper: f64) -> Self {
        Prior::Uniform { lower, upper }
    }
    pub fn gaussian(mean: f64, sigma: f64) -> Self {
        Prior::Gaussian { mean, sigma }
    }
    pub fn is_free(&self) -> bool {
        !matches!(self, Prior::Fixed(_))
    }
    pub fn median(&self) -> f64 {
        match *self {
            Prior::Uniform { lower, upper } => 0.5 * (lower + upper),
            Prior::Gaussian { mean, .. } => mean,
            Prior::Fixed(value) => value,
        }
    }
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Prior::Uniform { lower, upper } if upper > lower => rng.gen_range(lower..upper),
            Prior::Uniform { lower, .. } => lower,
            Prior::Gaussian { mean, sigma } => {
                Normal::new(mean, sigma).map_or(mean, |normal| normal.sample(rng))
            }
            Prior::Fixed(value) => value,
        }
    }
    /// Whether `value` is inside the support of the prior
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Prior::Uniform { lower, upper } => (lower..=upper).contains(&value),
            Prior::Gaussian { .. } => value.is_finite(),
            Prior::Fixed(fixed) => value == fixed,
        }
    }
    /// Typical width of the prior
    pub fn width(&self) -> f64 {
        match *self {
            Prior::Uniform { lower, upper } => upper - lower,
            Prior::Gaussian { sigma, .. } => sigma,
            Prior::Fixed(_) => 0.,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn samples_inside_support() {
        let mut rng = StdRng::seed_from_u64(7);
        let prior = Prior::uniform(0.2, 1.);
        assert_eq!(prior.median(), 0.6);
        assert!((0..100).all(|_| prior.contains(prior.sample(&mut rng))));
        assert!(!prior.contains(1.5));
        assert_eq!(Prior::Fixed(3.).sample(&mut rng), 3.);
        assert!(!Prior::Fixed(3.).is_free());
    }
}
