/*!
Defines the distribution interface consumed by generative programs, along with
the concrete families the engine ships: normal, uniform (continuous and
discrete), Bernoulli, Poisson, categorical, and Dirichlet.

Every family validates its parameters at construction and then exposes the two
capabilities the engine needs: drawing a value from a caller-supplied random
source, and evaluating the log-density of a value. Sampling is delegated to
[`rand`]/[`rand_distr`]; log-densities are computed here. A value outside a
family's support has log-density negative infinity.

# Examples

```rust
use mini_ppl::distributions::{Bernoulli, Dist, Normal};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let mut rng = SmallRng::seed_from_u64(42);

let gauss = Normal::new(0.0, 1.0).unwrap();
let x = gauss.sample(&mut rng);
println!("draw: {x}, log-density: {}", gauss.log_density(&x));

let coin = Bernoulli::new(0.3).unwrap();
assert!((coin.log_density(&true) - 0.3f64.ln()).abs() < 1e-12);
```
*/

use rand::rngs::SmallRng;
use rand::Rng;
use rand_distr::{
    Dirichlet as RdDirichlet, Distribution, Normal as RdNormal, Poisson as RdPoisson,
};
use std::f64::consts::PI;

use crate::error::Error;

/// A probability distribution usable from a generative program: it can be
/// sampled with an external random source and can score a value.
pub trait Dist {
    /// The type of values this distribution produces and scores.
    type Value;

    /// Draws one value using `rng`.
    fn sample(&self, rng: &mut SmallRng) -> Self::Value;

    /// Evaluates the log-density (or log-mass) of `value`.
    ///
    /// Returns `f64::NEG_INFINITY` for values outside the support.
    fn log_density(&self, value: &Self::Value) -> f64;
}

/// A normal (Gaussian) distribution with mean `mean` and standard deviation
/// `std`.
#[derive(Debug, Clone, Copy)]
pub struct Normal {
    mean: f64,
    std: f64,
    sampler: RdNormal<f64>,
}

impl Normal {
    /// Creates a normal distribution; `std` must be finite and positive.
    pub fn new(mean: f64, std: f64) -> Result<Self, Error> {
        if !mean.is_finite() || !std.is_finite() || std <= 0.0 {
            return Err(Error::invalid(format!(
                "normal requires finite mean and positive finite std, got N({mean}, {std})"
            )));
        }
        let sampler = RdNormal::new(mean, std)
            .map_err(|e| Error::invalid(format!("normal parameters rejected: {e}")))?;
        Ok(Self { mean, std, sampler })
    }
}

impl Dist for Normal {
    type Value = f64;

    fn sample(&self, rng: &mut SmallRng) -> f64 {
        self.sampler.sample(rng)
    }

    fn log_density(&self, value: &f64) -> f64 {
        let z = (value - self.mean) / self.std;
        -0.5 * z * z - self.std.ln() - 0.5 * (2.0 * PI).ln()
    }
}

/// A continuous uniform distribution on `[low, high)`.
#[derive(Debug, Clone, Copy)]
pub struct Uniform {
    low: f64,
    high: f64,
}

impl Uniform {
    /// Creates a uniform distribution; requires finite `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self, Error> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(Error::invalid(format!(
                "uniform requires finite low < high, got [{low}, {high})"
            )));
        }
        Ok(Self { low, high })
    }
}

impl Dist for Uniform {
    type Value = f64;

    fn sample(&self, rng: &mut SmallRng) -> f64 {
        rng.gen_range(self.low..self.high)
    }

    fn log_density(&self, value: &f64) -> f64 {
        if (self.low..=self.high).contains(value) {
            -(self.high - self.low).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// A uniform distribution over the integers `low..=high`.
#[derive(Debug, Clone, Copy)]
pub struct DiscreteUniform {
    low: i64,
    high: i64,
}

impl DiscreteUniform {
    /// Creates a discrete uniform distribution over `low..=high`.
    pub fn new(low: i64, high: i64) -> Result<Self, Error> {
        if low > high {
            return Err(Error::invalid(format!(
                "discrete uniform requires low <= high, got [{low}, {high}]"
            )));
        }
        Ok(Self { low, high })
    }
}

impl Dist for DiscreteUniform {
    type Value = i64;

    fn sample(&self, rng: &mut SmallRng) -> i64 {
        rng.gen_range(self.low..=self.high)
    }

    fn log_density(&self, value: &i64) -> f64 {
        if (self.low..=self.high).contains(value) {
            -((self.high - self.low + 1) as f64).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// A Bernoulli distribution over `bool` with success probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct Bernoulli {
    p: f64,
}

impl Bernoulli {
    /// Creates a Bernoulli distribution; `p` must lie in `[0, 1]`.
    pub fn new(p: f64) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::invalid(format!(
                "bernoulli requires p in [0, 1], got {p}"
            )));
        }
        Ok(Self { p })
    }
}

impl Dist for Bernoulli {
    type Value = bool;

    fn sample(&self, rng: &mut SmallRng) -> bool {
        rng.gen_bool(self.p)
    }

    fn log_density(&self, value: &bool) -> f64 {
        if *value {
            self.p.ln()
        } else {
            (1.0 - self.p).ln()
        }
    }
}

/// A Poisson distribution over counts with rate `rate`.
#[derive(Debug, Clone, Copy)]
pub struct Poisson {
    rate: f64,
    sampler: RdPoisson<f64>,
}

impl Poisson {
    /// Creates a Poisson distribution; `rate` must be finite and positive.
    pub fn new(rate: f64) -> Result<Self, Error> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::invalid(format!(
                "poisson requires a positive finite rate, got {rate}"
            )));
        }
        let sampler = RdPoisson::new(rate)
            .map_err(|e| Error::invalid(format!("poisson rate rejected: {e}")))?;
        Ok(Self { rate, sampler })
    }
}

impl Dist for Poisson {
    type Value = u64;

    fn sample(&self, rng: &mut SmallRng) -> u64 {
        self.sampler.sample(rng) as u64
    }

    /// log p(k) = -rate + k ln(rate) - ln(k!)
    fn log_density(&self, value: &u64) -> f64 {
        let k = *value as f64;
        -self.rate + k * self.rate.ln() - ln_gamma(k + 1.0)
    }
}

/// A categorical distribution over the indices `0..n`.
///
/// The weights passed to [`Categorical::new`] are normalized so that they sum
/// to one.
///
/// # Examples
///
/// ```rust
/// use mini_ppl::distributions::{Categorical, Dist};
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// let cat = Categorical::new(vec![0.2, 0.3, 0.5]).unwrap();
/// let mut rng = SmallRng::seed_from_u64(1);
/// let index = cat.sample(&mut rng);
/// assert!(index < 3);
/// assert!((cat.log_density(&2) - 0.5f64.ln()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Categorical {
    probs: Vec<f64>,
}

impl Categorical {
    /// Creates a categorical distribution from non-negative weights.
    pub fn new(weights: Vec<f64>) -> Result<Self, Error> {
        if weights.is_empty() {
            return Err(Error::invalid("categorical requires at least one weight"));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::invalid(
                "categorical weights must be finite and non-negative",
            ));
        }
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(Error::invalid("categorical weights must not all be zero"));
        }
        let probs = weights.into_iter().map(|w| w / sum).collect();
        Ok(Self { probs })
    }

    /// The normalized probability vector.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }
}

impl Dist for Categorical {
    type Value = usize;

    fn sample(&self, rng: &mut SmallRng) -> usize {
        let r: f64 = rng.gen();
        let mut cum = 0.0;
        for (i, &p) in self.probs.iter().enumerate() {
            cum += p;
            if r < cum {
                return i;
            }
        }
        self.probs.len() - 1
    }

    fn log_density(&self, value: &usize) -> f64 {
        if *value < self.probs.len() {
            self.probs[*value].ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// A Dirichlet distribution over probability vectors of length
/// `alpha.len()`.
#[derive(Debug, Clone)]
pub struct Dirichlet {
    alpha: Vec<f64>,
    sampler: RdDirichlet<f64>,
}

impl Dirichlet {
    /// Creates a Dirichlet distribution; needs at least two concentration
    /// parameters, all finite and positive.
    pub fn new(alpha: Vec<f64>) -> Result<Self, Error> {
        if alpha.len() < 2 {
            return Err(Error::invalid(
                "dirichlet requires at least two concentration parameters",
            ));
        }
        if alpha.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err(Error::invalid(
                "dirichlet concentration parameters must be finite and positive",
            ));
        }
        let sampler = RdDirichlet::new(&alpha)
            .map_err(|e| Error::invalid(format!("dirichlet parameters rejected: {e}")))?;
        Ok(Self { alpha, sampler })
    }
}

impl Dist for Dirichlet {
    type Value = Vec<f64>;

    fn sample(&self, rng: &mut SmallRng) -> Vec<f64> {
        self.sampler.sample(rng)
    }

    fn log_density(&self, value: &Vec<f64>) -> f64 {
        if value.len() != self.alpha.len()
            || value.iter().any(|x| !(*x > 0.0))
            || (value.iter().sum::<f64>() - 1.0).abs() > 1e-9
        {
            return f64::NEG_INFINITY;
        }
        let alpha_sum: f64 = self.alpha.iter().sum();
        let log_norm =
            ln_gamma(alpha_sum) - self.alpha.iter().map(|&a| ln_gamma(a)).sum::<f64>();
        log_norm
            + self
                .alpha
                .iter()
                .zip(value)
                .map(|(&a, &x)| (a - 1.0) * x.ln())
                .sum::<f64>()
    }
}

/// Lanczos approximation of ln Γ(x) (g = 7, 9 coefficients), with the
/// reflection formula for x < 1/2.
fn ln_gamma(x: f64) -> f64 {
    const LANCZOS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        return PI.ln() - (PI * x).sin().ln() - ln_gamma(1.0 - x);
    }
    let z = x - 1.0;
    let mut acc = LANCZOS[0];
    for (i, &c) in LANCZOS.iter().enumerate().skip(1) {
        acc += c / (z + i as f64);
    }
    let t = z + 7.5;
    0.5 * (2.0 * PI).ln() + (z + 0.5) * t.ln() - t + acc.ln()
}
