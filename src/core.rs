use rand::rngs::SmallRng;

use crate::distributions::Dist;
use crate::error::Error;

/// Running log-likelihood register for a single particle execution.
///
/// The register starts at `0.0`, grows by one `accumulate` call per scored
/// observation, and is read exactly once after the model returns. Each
/// particle owns its own instance; there is no sharing between executions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    total: f64,
}

impl Accumulator {
    /// Sets the register back to `0.0`.
    pub fn reset(&mut self) {
        self.total = 0.0;
    }

    /// Adds `delta` to the register.
    pub fn accumulate(&mut self, delta: f64) {
        self.total += delta;
    }

    /// Returns the current value without mutating it.
    pub fn read(&self) -> f64 {
        self.total
    }
}

/// Execution context handed to a model for the duration of one particle.
///
/// The context owns the particle's [`Accumulator`] and exposes [`observe`],
/// the one channel by which a model reports likelihood information. It is
/// constructed inside [`trace`] and dropped when `trace` returns, so no two
/// particles can ever see the same register.
///
/// [`observe`]: Context::observe
#[derive(Debug, Default)]
pub struct Context {
    log_likelihood: Accumulator,
}

impl Context {
    pub(crate) fn new() -> Self {
        let mut log_likelihood = Accumulator::default();
        log_likelihood.reset();
        Self { log_likelihood }
    }

    /// Scores `value` under `dist` and adds the log-density to this
    /// particle's running log-likelihood.
    ///
    /// A value outside the distribution's support contributes negative
    /// infinity; that is an ordinary (very small) weight, not a failure.
    pub fn observe<D: Dist>(&mut self, value: &D::Value, dist: &D) {
        self.log_likelihood.accumulate(dist.log_density(value));
    }

    pub(crate) fn log_weight(&self) -> f64 {
        self.log_likelihood.read()
    }
}

/// A generative program.
///
/// A model draws random values only from the supplied `rng` and reports
/// likelihood contributions only through [`Context::observe`]; its return
/// value is the (unweighted) quantity whose posterior expectation the
/// estimator computes. Any `Err` aborts the particle and propagates to the
/// caller unmodified.
///
/// Implemented for every `Fn(&mut Context, &mut SmallRng) -> Result<T, Error>`,
/// so plain functions and closures are models:
///
/// ```rust
/// use mini_ppl::core::{trace, Context};
/// use mini_ppl::distributions::{Dist, Normal};
/// use mini_ppl::error::Error;
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// fn model(ctx: &mut Context, rng: &mut SmallRng) -> Result<f64, Error> {
///     let prior = Normal::new(0.0, 1.0)?;
///     let theta = prior.sample(rng);
///     ctx.observe(&0.3, &Normal::new(theta, 0.5)?);
///     Ok(theta)
/// }
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let particle = trace(&model, &mut rng).unwrap();
/// assert!(particle.log_weight.is_finite());
/// ```
pub trait Model {
    /// The semantic type of the model's return value.
    type Output;

    /// Runs the program once against `rng`, scoring observations via `ctx`.
    fn simulate(&self, ctx: &mut Context, rng: &mut SmallRng) -> Result<Self::Output, Error>;
}

impl<T, F> Model for F
where
    F: Fn(&mut Context, &mut SmallRng) -> Result<T, Error>,
{
    type Output = T;

    fn simulate(&self, ctx: &mut Context, rng: &mut SmallRng) -> Result<T, Error> {
        self(ctx, rng)
    }
}

/// One independent execution of a model: its return value together with the
/// log-likelihood its observations accumulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle<T> {
    pub value: T,
    pub log_weight: f64,
}

/// Runs `model` once against `rng` and returns the resulting particle.
///
/// A fresh accumulator is bound for the duration of the run and read after
/// the model returns; given an rng reproducing the same draw sequence, the
/// result is a pure function of the model and those draws. A model that
/// never observes yields a log-weight of exactly `0.0`.
pub fn trace<M: Model>(model: &M, rng: &mut SmallRng) -> Result<Particle<M::Output>, Error> {
    let mut ctx = Context::new();
    let value = model.simulate(&mut ctx, rng)?;
    Ok(Particle {
        value,
        log_weight: ctx.log_weight(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Bernoulli, Normal};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn accumulator_reset_accumulate_read() {
        let mut acc = Accumulator::default();
        assert_eq!(acc.read(), 0.0);
        acc.accumulate(-1.5);
        acc.accumulate(-2.25);
        assert_eq!(acc.read(), -3.75);
        acc.reset();
        assert_eq!(acc.read(), 0.0);
    }

    #[test]
    fn observe_adds_log_densities() {
        let mut ctx = Context::new();
        let coin = Bernoulli::new(0.25).unwrap();
        ctx.observe(&true, &coin);
        ctx.observe(&false, &coin);
        let expected = 0.25f64.ln() + 0.75f64.ln();
        assert_abs_diff_eq!(ctx.log_weight(), expected, epsilon = 1e-12);
    }

    #[test]
    fn observe_outside_support_is_minus_infinity() {
        let mut ctx = Context::new();
        let sure_thing = Bernoulli::new(1.0).unwrap();
        ctx.observe(&false, &sure_thing);
        assert_eq!(ctx.log_weight(), f64::NEG_INFINITY);
        // Further observations cannot bring the weight back.
        ctx.observe(&true, &sure_thing);
        assert_eq!(ctx.log_weight(), f64::NEG_INFINITY);
    }

    #[test]
    fn trace_without_observe_has_zero_log_weight() {
        let model = |_ctx: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
            Ok(Normal::new(0.0, 1.0)?.sample(rng))
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let particle = trace(&model, &mut rng).unwrap();
        assert_eq!(particle.log_weight, 0.0);
    }

    #[test]
    fn trace_is_deterministic_given_the_seed() {
        let model = |ctx: &mut Context, rng: &mut SmallRng| -> Result<f64, Error> {
            let prior = Normal::new(0.0, 1.0)?;
            let theta = prior.sample(rng);
            ctx.observe(&0.5, &Normal::new(theta, 1.0)?);
            Ok(theta)
        };
        let a = trace(&model, &mut SmallRng::seed_from_u64(11)).unwrap();
        let b = trace(&model, &mut SmallRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn failing_model_propagates_unmodified() {
        let model = |_ctx: &mut Context, _rng: &mut SmallRng| -> Result<f64, Error> {
            Normal::new(0.0, -1.0)?;
            unreachable!()
        };
        let err = trace(&model, &mut SmallRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
