//! Estimator-level properties exercised through the public API: weight
//! degeneracy, reductions to the plain Monte Carlo mean, argument
//! validation, and a conjugate continuous model with a known posterior.

use approx::assert_abs_diff_eq;
use mini_ppl::core::Context;
use mini_ppl::distributions::{Bernoulli, Dist, Normal, Poisson, Uniform};
use mini_ppl::error::Error;
use mini_ppl::posterior::{posterior, Posterior};
use rand::rngs::SmallRng;

/// A distribution that assigns probability one to every observed value, so
/// each observation contributes a log-weight of exactly zero.
struct PointMass;

impl Dist for PointMass {
    type Value = f64;

    fn sample(&self, _rng: &mut SmallRng) -> f64 {
        0.0
    }

    fn log_density(&self, _value: &f64) -> f64 {
        0.0
    }
}

#[test]
fn point_mass_likelihood_reduces_to_the_plain_mean() {
    let model = |ctx: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
        let draw = Uniform::new(-1.0, 3.0)?.sample(rng);
        ctx.observe(&draw, &PointMass);
        Ok(draw)
    };
    let estimator = Posterior::new(model, 10_000).set_seed(99);

    let cloud = estimator.particles().unwrap();
    assert!(cloud.iter().all(|p| p.log_weight == 0.0));
    let mean = cloud.iter().map(|p| p.value).sum::<f64>() / cloud.len() as f64;

    assert_abs_diff_eq!(estimator.run().unwrap(), mean, epsilon = 1e-12);
}

#[test]
fn silent_model_reduces_to_the_plain_mean() {
    let model = |_: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
        Ok(Normal::new(5.0, 2.0)?.sample(rng))
    };
    let estimator = Posterior::new(model, 10_000).set_seed(4);

    let cloud = estimator.particles().unwrap();
    assert!(cloud.iter().all(|p| p.log_weight == 0.0));
    let mean = cloud.iter().map(|p| p.value).sum::<f64>() / cloud.len() as f64;

    assert_abs_diff_eq!(estimator.run().unwrap(), mean, epsilon = 1e-12);
}

#[test]
fn impossible_data_fails_loudly() {
    let model = |ctx: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
        let draw = Uniform::new(0.0, 1.0)?.sample(rng);
        // Every trajectory scores the observation as impossible.
        ctx.observe(&false, &Bernoulli::new(1.0)?);
        Ok(draw)
    };
    assert_eq!(
        posterior(11, model, 1_000).unwrap_err(),
        Error::DegenerateWeights
    );
}

#[test]
fn partially_impossible_data_is_fine() {
    // Half the trajectories score -inf; the others carry the estimate.
    let model = |ctx: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
        let heads = Bernoulli::new(0.5)?.sample(rng);
        ctx.observe(&heads, &Bernoulli::new(1.0)?);
        Ok(heads as u8 as f64)
    };
    let estimate = posterior(12, model, 1_000).unwrap();
    assert_abs_diff_eq!(estimate, 1.0, epsilon = 1e-12);
}

#[test]
fn zero_particles_is_an_invalid_argument() {
    let model = |_: &mut Context, _: &mut SmallRng| -> Result<f64, Error> { Ok(0.0) };
    assert!(matches!(
        posterior(0, model, 0).unwrap_err(),
        Error::InvalidArgument(_)
    ));
}

#[test]
fn model_failure_aborts_the_run() {
    let model = |_: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
        // A rate drawn at or below zero is rejected by the constructor.
        let rate = Uniform::new(-2.0, 2.0)?.sample(rng);
        Ok(Poisson::new(rate)?.sample(rng) as f64)
    };
    assert!(matches!(
        posterior(21, model, 512).unwrap_err(),
        Error::InvalidArgument(_)
    ));
}

#[test]
fn conjugate_normal_model_recovers_the_posterior_mean() {
    // theta ~ N(0, 1), one observation 0.8 ~ N(theta, 1); the posterior is
    // N(0.4, 1/2), so the estimate should settle near 0.4.
    let model = |ctx: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
        let theta = Normal::new(0.0, 1.0)?.sample(rng);
        ctx.observe(&0.8, &Normal::new(theta, 1.0)?);
        Ok(theta)
    };
    let estimate = posterior(7, model, 200_000).unwrap();
    assert_abs_diff_eq!(estimate, 0.4, epsilon = 0.02);
}
