use mini_ppl::core::Context;
use mini_ppl::distributions::{Bernoulli, DiscreteUniform, Dist};
use mini_ppl::error::Error;
use mini_ppl::posterior::Posterior;
use rand::rngs::SmallRng;

/// Three coins with heads-probabilities 0, 1/2, and 1; one is drawn uniformly
/// at random and flipped three times, landing heads every time. The model
/// reports whether the fair coin was the one drawn.
fn coin_model(ctx: &mut Context, rng: &mut SmallRng) -> Result<f64, Error> {
    let which = DiscreteUniform::new(0, 2)?.sample(rng);
    let flip = Bernoulli::new(which as f64 / 2.0)?;
    for _ in 0..3 {
        ctx.observe(&true, &flip);
    }
    Ok((which == 1) as u8 as f64)
}

fn main() -> Result<(), Error> {
    const N_PARTICLES: usize = 1_000_000;
    const SEED: u64 = 42;

    // Posterior mass is proportional to prior times likelihood:
    // (1/3) * (1/2)^3 for the fair coin, (1/3) * 1 for the two-headed coin,
    // and zero for the two-tailed coin.
    let analytic = (1.0 / 24.0) / (1.0 / 24.0 + 1.0 / 3.0);

    let estimate = Posterior::new(coin_model, N_PARTICLES)
        .set_seed(SEED)
        .run_progress()?;

    println!("P(fair coin | three heads) with {N_PARTICLES} particles:");
    println!("  analytic:  {analytic:.6}");
    println!("  estimated: {estimate:.6}");
    println!("  abs error: {:.6}", (estimate - analytic).abs());
    Ok(())
}
