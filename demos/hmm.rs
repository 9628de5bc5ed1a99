use mini_ppl::core::Context;
use mini_ppl::distributions::{Categorical, Dist, Normal};
use mini_ppl::error::Error;
use mini_ppl::posterior::Posterior;
use rand::rngs::SmallRng;

/// Noisy readings from a two-state system that emits around 0.0 in state 0
/// and around 2.0 in state 1.
const OBSERVATIONS: [f64; 5] = [0.1, 0.3, 1.9, 2.2, 1.8];

const INITIAL: [f64; 2] = [0.5, 0.5];
const TRANSITION: [[f64; 2]; 2] = [[0.8, 0.2], [0.3, 0.7]];
const EMISSION_MEAN: [f64; 2] = [0.0, 2.0];
const EMISSION_STD: f64 = 0.5;

/// Samples a state trajectory from the chain prior, scores every reading
/// under the emission of the state active at that step, and reports the
/// final state.
fn hmm_model(ctx: &mut Context, rng: &mut SmallRng) -> Result<f64, Error> {
    let mut state = Categorical::new(INITIAL.to_vec())?.sample(rng);
    for (t, reading) in OBSERVATIONS.iter().enumerate() {
        if t > 0 {
            state = Categorical::new(TRANSITION[state].to_vec())?.sample(rng);
        }
        ctx.observe(reading, &Normal::new(EMISSION_MEAN[state], EMISSION_STD)?);
    }
    Ok(state as f64)
}

fn emission_density(reading: f64, state: usize) -> Result<f64, Error> {
    let emission = Normal::new(EMISSION_MEAN[state], EMISSION_STD)?;
    Ok(emission.log_density(&reading).exp())
}

/// Exact forward filtering: P(final state = 1 | readings), for comparison.
fn forward_filter() -> Result<f64, Error> {
    let mut alpha = [0.0f64; 2];
    for (s, a) in alpha.iter_mut().enumerate() {
        *a = INITIAL[s] * emission_density(OBSERVATIONS[0], s)?;
    }
    for reading in &OBSERVATIONS[1..] {
        let mut next = [0.0f64; 2];
        for (s, n) in next.iter_mut().enumerate() {
            let mass: f64 = (0..2).map(|prev| alpha[prev] * TRANSITION[prev][s]).sum();
            *n = mass * emission_density(*reading, s)?;
        }
        alpha = next;
    }
    Ok(alpha[1] / (alpha[0] + alpha[1]))
}

fn main() -> Result<(), Error> {
    const N_PARTICLES: usize = 500_000;
    const SEED: u64 = 42;

    let analytic = forward_filter()?;
    let estimate = Posterior::new(hmm_model, N_PARTICLES)
        .set_seed(SEED)
        .run_progress()?;

    println!("P(final state = 1 | readings) with {N_PARTICLES} particles:");
    println!("  forward filter: {analytic:.6}");
    println!("  estimated:      {estimate:.6}");
    println!("  abs error:      {:.6}", (estimate - analytic).abs());
    Ok(())
}
