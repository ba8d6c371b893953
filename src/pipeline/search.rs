//! Non-linear searches of the parameter space of a model
//!
//! A search draws parameter vectors from the priors of the free parameters and
//! returns the weighted [Samples] of the likelihood it evaluated.

use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::{PipelineError, Prior, Result};
use crate::config::NestConfig;

/// Proposals drawn per nested sampling iteration before giving up
const MAX_ATTEMPTS: usize = 500;
/// Iterations stop once the live points can add less than this fraction to the evidence
const EVIDENCE_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub parameters: Vec<f64>,
    pub log_likelihood: f64,
    pub weight: f64,
}

/// Weighted samples of a search
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Samples {
    pub samples: Vec<Sample>,
    pub log_evidence: Option<f64>,
}
impl Samples {
    pub fn max_log_likelihood_sample(&self) -> Result<&Sample> {
        self.samples
            .iter()
            .max_by(|a, b| a.log_likelihood.total_cmp(&b.log_likelihood))
            .ok_or(PipelineError::NoSamples)
    }
    pub fn max_log_likelihood_vector(&self) -> Result<Vec<f64>> {
        Ok(self.max_log_likelihood_sample()?.parameters.clone())
    }
    /// Weighted mean of every parameter
    pub fn means(&self) -> Vec<f64> {
        let n = self.samples.first().map_or(0, |s| s.parameters.len());
        let total: f64 = self.samples.iter().map(|s| s.weight).sum();
        (0..n)
            .map(|i| {
                self.samples
                    .iter()
                    .map(|s| s.weight * s.parameters[i])
                    .sum::<f64>()
                    / total
            })
            .collect()
    }
    /// Weighted standard deviation of every parameter
    pub fn errors(&self) -> Vec<f64> {
        let total: f64 = self.samples.iter().map(|s| s.weight).sum();
        self.means()
            .into_iter()
            .enumerate()
            .map(|(i, mean)| {
                (self
                    .samples
                    .iter()
                    .map(|s| s.weight * (s.parameters[i] - mean).powi(2))
                    .sum::<f64>()
                    / total)
                    .sqrt()
            })
            .collect()
    }
    /// Writes the samples with a header of the parameter names
    pub fn to_csv<P: AsRef<Path>>(&self, path: P, parameter_names: &[String]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = parameter_names.to_vec();
        header.extend([String::from("log_likelihood"), String::from("weight")]);
        writer.write_record(&header)?;
        for sample in &self.samples {
            let mut record: Vec<String> =
                sample.parameters.iter().map(|p| p.to_string()).collect();
            record.push(sample.log_likelihood.to_string());
            record.push(sample.weight.to_string());
            writer.write_record(&record)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Log likelihood of a vector of free parameters
pub type LogLikelihood<'a> = dyn FnMut(&[f64]) -> Result<f64> + 'a;

pub trait NonLinearSearch {
    fn name(&self) -> &str;
    fn fit(&mut self, priors: &[Prior], log_likelihood: &mut LogLikelihood) -> Result<Samples>;
}

/// Evaluates the likelihood once, at the prior medians
#[derive(Debug, Clone, Default)]
pub struct MockSearch;
impl NonLinearSearch for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }
    fn fit(&mut self, priors: &[Prior], log_likelihood: &mut LogLikelihood) -> Result<Samples> {
        let parameters: Vec<f64> = priors.iter().map(Prior::median).collect();
        let log_likelihood = log_likelihood(&parameters)?;
        Ok(Samples {
            samples: vec![Sample {
                parameters,
                log_likelihood,
                weight: 1.,
            }],
            log_evidence: None,
        })
    }
}

fn log_add_exp(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + ((a - max).exp() + (b - max).exp()).ln()
}

/// Nested sampling with constrained random-walk proposals
///
/// New live points are proposed around a random live point with steps scaled
/// by the spread of the live points. Unless in constant efficiency mode, the
/// step size adapts for the acceptance rate to track the sampling efficiency.
#[derive(Debug, Clone)]
pub struct NestedSampler {
    pub n_live_points: usize,
    pub sampling_efficiency: f64,
    pub const_efficiency_mode: bool,
    pub max_iterations: usize,
    pub seed: u64,
}
impl NestedSampler {
    pub fn from_config(config: &NestConfig) -> Self {
        Self {
            n_live_points: config.n_live_points,
            sampling_efficiency: config.sampling_efficiency,
            const_efficiency_mode: config.const_efficiency_mode,
            max_iterations: config.max_iterations,
            seed: config.seed,
        }
    }
    pub fn n_live_points(self, n_live_points: usize) -> Self {
        Self {
            n_live_points,
            ..self
        }
    }
    pub fn sampling_efficiency(self, sampling_efficiency: f64) -> Self {
        Self {
            sampling_efficiency,
            ..self
        }
    }
    pub fn const_efficiency_mode(self, const_efficiency_mode: bool) -> Self {
        Self {
            const_efficiency_mode,
            ..self
        }
    }
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
    fn spread(live: &[(Vec<f64>, f64)], priors: &[Prior]) -> Vec<f64> {
        let n = live.len() as f64;
        priors
            .iter()
            .enumerate()
            .map(|(i, prior)| {
                let mean = live.iter().map(|(p, _)| p[i]).sum::<f64>() / n;
                let var = live.iter().map(|(p, _)| (p[i] - mean).powi(2)).sum::<f64>() / n;
                var.sqrt().max(1e-6 * prior.width().max(1.))
            })
            .collect()
    }
}
impl NonLinearSearch for NestedSampler {
    fn name(&self) -> &str {
        "nest"
    }
    fn fit(&mut self, priors: &[Prior], log_likelihood: &mut LogLikelihood) -> Result<Samples> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n_live = self.n_live_points.max(2);
        if priors.is_empty() {
            return MockSearch.fit(priors, log_likelihood);
        }

        let mut live = Vec::with_capacity(n_live);
        for _ in 0..n_live {
            let parameters: Vec<f64> = priors.iter().map(|p| p.sample(&mut rng)).collect();
            let log_l = log_likelihood(&parameters)?;
            live.push((parameters, log_l));
        }

        let mut dead: Vec<(Vec<f64>, f64, f64)> = Vec::new();
        let mut log_z = f64::NEG_INFINITY;
        let mut log_x = 0f64;
        let mut step = 1f64;
        for iteration in 0..self.max_iterations {
            let (worst, worst_log_l) = live
                .iter()
                .enumerate()
                .map(|(i, (_, log_l))| (i, *log_l))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .ok_or(PipelineError::NoSamples)?;
            let log_x_next = -((iteration + 1) as f64) / n_live as f64;
            let log_width = log_x + (1. - (log_x_next - log_x).exp()).ln();
            log_z = log_add_exp(log_z, worst_log_l + log_width);
            dead.push((live[worst].0.clone(), worst_log_l, worst_log_l + log_width));
            log_x = log_x_next;

            let max_log_l = live.iter().map(|(_, l)| *l).fold(f64::NEG_INFINITY, f64::max);
            if max_log_l + log_x < log_z + EVIDENCE_TOLERANCE.ln() {
                log::debug!("nested sampling converged after {iteration} iterations");
                live.swap_remove(worst);
                break;
            }

            let spread = Self::spread(&live, priors);
            let mut replacement = None;
            let mut attempts = 0;
            while attempts < MAX_ATTEMPTS {
                attempts += 1;
                let (origin, _) = &live[rng.gen_range(0..live.len())];
                let proposal: Vec<f64> = origin
                    .iter()
                    .zip(&spread)
                    .map(|(x, s)| x + step * s * rng.sample::<f64, _>(StandardNormal))
                    .collect();
                if !priors.iter().zip(&proposal).all(|(p, x)| p.contains(*x)) {
                    continue;
                }
                let log_l = log_likelihood(&proposal)?;
                if log_l > worst_log_l {
                    replacement = Some((proposal, log_l));
                    break;
                }
            }
            if !self.const_efficiency_mode {
                let acceptance = if replacement.is_some() {
                    1. / attempts as f64
                } else {
                    0.
                };
                step *= if acceptance > self.sampling_efficiency {
                    1.1
                } else {
                    1. / 1.1
                };
            }
            match replacement {
                Some(point) => live[worst] = point,
                None => {
                    log::debug!("no live point replacement after {MAX_ATTEMPTS} proposals");
                    live.swap_remove(worst);
                    break;
                }
            }
            if iteration % 100 == 0 {
                log::debug!("iteration {iteration}: log Z = {log_z:.3}, max log L = {max_log_l:.3}");
            }
        }

        let log_width = log_x - (live.len().max(1) as f64).ln();
        for (parameters, log_l) in live {
            log_z = log_add_exp(log_z, log_l + log_width);
            dead.push((parameters, log_l, log_l + log_width));
        }
        let samples = dead
            .into_iter()
            .map(|(parameters, log_likelihood, log_weight)| Sample {
                parameters,
                log_likelihood,
                weight: (log_weight - log_z).exp(),
            })
            .collect();
        Ok(Samples {
            samples,
            log_evidence: Some(log_z),
        })
    }
}

/// Searches a phase can run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    #[default]
    Mock,
    Nest,
}

/// Overrides of the nested sampler configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchSettings {
    pub n_live_points: Option<usize>,
    pub sampling_efficiency: Option<f64>,
    pub const_efficiency_mode: Option<bool>,
}
impl SearchKind {
    pub fn build(&self, config: &NestConfig, settings: &SearchSettings) -> Box<dyn NonLinearSearch> {
        match self {
            SearchKind::Mock => Box::new(MockSearch),
            SearchKind::Nest => {
                let mut nest = NestedSampler::from_config(config);
                if let Some(n) = settings.n_live_points {
                    nest = nest.n_live_points(n);
                }
                if let Some(efficiency) = settings.sampling_efficiency {
                    nest = nest.sampling_efficiency(efficiency);
                }
                if let Some(mode) = settings.const_efficiency_mode {
                    nest = nest.const_efficiency_mode(mode);
                }
                Box::new(nest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian_log_likelihood(p: &[f64]) -> Result<f64> {
        Ok(-0.5 * ((p[0] - 0.3) / 0.05).powi(2) - 0.5 * ((p[1] + 0.2) / 0.1).powi(2))
    }

    #[test]
    fn mock_evaluates_medians() {
        let priors = [Prior::uniform(0., 2.), Prior::gaussian(-1., 1.)];
        let samples = MockSearch
            .fit(&priors, &mut |p: &[f64]| Ok(p[0] + p[1]))
            .unwrap();
        assert_eq!(samples.samples.len(), 1);
        assert_eq!(samples.max_log_likelihood_vector().unwrap(), vec![1., -1.]);
        assert_eq!(samples.max_log_likelihood_sample().unwrap().log_likelihood, 0.);
    }

    #[test]
    fn nested_sampling_finds_peak() {
        let priors = [Prior::uniform(-1., 1.), Prior::uniform(-1., 1.)];
        let mut nest = NestedSampler::from_config(&NestConfig::default())
            .n_live_points(50)
            .max_iterations(2000);
        let samples = nest.fit(&priors, &mut gaussian_log_likelihood).unwrap();
        let best = samples.max_log_likelihood_vector().unwrap();
        assert!((best[0] - 0.3).abs() < 0.05, "{best:?}");
        assert!((best[1] + 0.2).abs() < 0.1, "{best:?}");
        let total: f64 = samples.samples.iter().map(|s| s.weight).sum();
        assert!((total - 1.).abs() < 1e-6);
        let errors = samples.errors();
        assert!(errors[0] < 0.2 && errors[0] > 0.);
    }

    #[test]
    fn nested_sampling_is_seeded() {
        let priors = [Prior::uniform(-1., 1.), Prior::uniform(-1., 1.)];
        let run = || {
            NestedSampler::from_config(&NestConfig::default())
                .max_iterations(100)
                .fit(&priors, &mut gaussian_log_likelihood)
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn samples_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        let samples = MockSearch
            .fit(&[Prior::uniform(0., 1.)], &mut |_: &[f64]| Ok(-1.))
            .unwrap();
        samples.to_csv(&path, &[String::from("lens.sis.einstein_radius")]).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "lens.sis.einstein_radius,log_likelihood,weight"
        );
        assert_eq!(lines.next().unwrap(), "0.5,-1,1");
    }
}
