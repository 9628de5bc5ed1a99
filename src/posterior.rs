/*!
# Self-Normalizing Importance Sampling

This module implements the posterior estimator: it executes a generative
program `n_particles` times, collects each particle's return value and
accumulated log-weight, normalizes the weights in the log domain, and returns
the probability-weighted mean of the values. That is the self-normalizing
importance-sampling (SNIS) estimate of `E_pi[f(X)]`, where `pi` is the
unnormalized posterior implied by the program's prior draws and its observed
data, and `f` is the program's return value.

## Overview

- **Model (`M`)**: the generative program, via the [`Model`] trait.
- **Parallel particles**: executions are independent and run on a rayon
  worker pool; each particle owns its accumulator and its random substream,
  so there is no shared mutable state and no locking.
- **Reproducibility**: a global seed is set with `set_seed`; particle `i`
  runs against a substream derived deterministically from `(seed, i)`, so a
  fixed seed gives bitwise-identical estimates regardless of worker count or
  scheduling order.

## Example Usage

```rust
use mini_ppl::core::Context;
use mini_ppl::distributions::{Bernoulli, DiscreteUniform, Dist};
use mini_ppl::error::Error;
use mini_ppl::posterior::Posterior;
use rand::rngs::SmallRng;

// Pick one of three coins with heads-probability 0, 1/2, or 1; observe one
// head; report whether the fair coin was picked.
fn model(ctx: &mut Context, rng: &mut SmallRng) -> Result<f64, Error> {
    let x = DiscreteUniform::new(0, 2)?.sample(rng);
    ctx.observe(&true, &Bernoulli::new(x as f64 / 2.0)?);
    Ok((x == 1) as u8 as f64)
}

let estimate = Posterior::new(model, 20_000).set_seed(42).run().unwrap();
// Analytically P(X = 1 | heads) = (1/2) / (1/2 + 1) = 1/3.
assert!((estimate - 1.0 / 3.0).abs() < 0.02);
```
*/

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array1;
use num_traits::ToPrimitive;
use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::core::{trace, Model, Particle};
use crate::error::Error;
use crate::stats::{normalize, weighted_mean};

/// The SNIS posterior estimator for a generative program.
///
/// Constructed with [`new`](Posterior::new), optionally seeded with
/// [`set_seed`](Posterior::set_seed), and executed with
/// [`run`](Posterior::run) or [`run_progress`](Posterior::run_progress).
/// All per-run state (particles, weight vectors) is created fresh inside
/// each call and discarded when it returns.
#[derive(Debug, Clone)]
pub struct Posterior<M> {
    /// The generative program to estimate under.
    pub model: M,
    /// How many independent particles each run executes.
    pub n_particles: usize,
    /// The global random seed; substream `i` is derived from `(seed, i)`.
    pub seed: u64,
}

impl<M> Posterior<M>
where
    M: Model + Sync,
    M::Output: ToPrimitive + Send,
{
    /// Creates an estimator over `model` using `n_particles` particles per
    /// run, seeded from entropy. Use [`set_seed`](Posterior::set_seed) for
    /// reproducible runs.
    pub fn new(model: M, n_particles: usize) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            model,
            n_particles,
            seed,
        }
    }

    /// Sets a new global seed.
    ///
    /// Particle `i` draws from `SmallRng::seed_from_u64(seed + i)`; the
    /// `seed_from_u64` mixing makes the substreams independent while keeping
    /// the derivation a deterministic function of `(seed, i)`.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Executes every particle and returns the raw cloud, in particle-index
    /// order.
    ///
    /// The first failing particle aborts the whole run; its error is
    /// returned unmodified.
    pub fn particles(&self) -> Result<Vec<Particle<M::Output>>, Error> {
        if self.n_particles == 0 {
            return Err(Error::invalid("n_particles must be positive"));
        }
        (0..self.n_particles)
            .into_par_iter()
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(self.seed.wrapping_add(i as u64));
                trace(&self.model, &mut rng)
            })
            .collect()
    }

    /// Runs the estimator: executes the particles, normalizes their
    /// log-weights, and returns the weighted mean of their values.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `n_particles` is zero;
    /// [`Error::DegenerateWeights`] if every particle scored the data as
    /// impossible; any error a particle itself produced.
    pub fn run(&self) -> Result<f64, Error> {
        estimate(&self.particles()?)
    }

    /// Like [`run`](Posterior::run), but renders a progress bar while the
    /// particles execute. The estimate is identical to `run` with the same
    /// seed.
    pub fn run_progress(&self) -> Result<f64, Error> {
        if self.n_particles == 0 {
            return Err(Error::invalid("n_particles must be positive"));
        }
        let pb = ProgressBar::new(self.n_particles as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        let particles: Result<Vec<Particle<M::Output>>, Error> = (0..self.n_particles)
            .into_par_iter()
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let particle = trace(&self.model, &mut rng);
                pb.inc(1);
                particle
            })
            .collect();
        pb.finish_with_message("Done!");
        estimate(&particles?)
    }
}

/// One-call convenience wrapper: seeds the estimator with `seed` and runs it.
pub fn posterior<M>(seed: u64, model: M, n_particles: usize) -> Result<f64, Error>
where
    M: Model + Sync,
    M::Output: ToPrimitive + Send,
{
    Posterior::new(model, n_particles).set_seed(seed).run()
}

/// SNIS reduction over a particle cloud.
fn estimate<T: ToPrimitive>(particles: &[Particle<T>]) -> Result<f64, Error> {
    let values = Array1::from_iter(particles.iter().map(|p| p.value.to_f64().unwrap()));
    let log_weights = Array1::from_iter(particles.iter().map(|p| p.log_weight));
    let probabilities = normalize(&log_weights)?;
    Ok(weighted_mean(&values, &probabilities))
}
