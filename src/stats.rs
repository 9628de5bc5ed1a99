//! Log-domain weight numerics shared by the estimator.

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::error::Error;

/// Computes `ln(sum_i exp(x_i))` without overflowing, by shifting by the
/// maximum before exponentiating. An empty or all-`-inf` input yields `-inf`.
pub fn log_sum_exp(log_terms: &Array1<f64>) -> f64 {
    let max = log_terms
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + log_terms.mapv(|x| (x - max).exp()).sum().ln()
}

/// Turns a sequence of log-weights into a probability vector.
///
/// The computation is shift-invariant (`normalize(w)` equals
/// `normalize(w + c)` for any constant `c`), the output sums to one, and
/// every entry is non-negative. Entries of `-inf` map to probability zero.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the input is empty or contains NaN;
/// [`Error::DegenerateWeights`] if every entry is `-inf`, i.e. no sampled
/// trajectory assigns the data any likelihood.
pub fn normalize(log_weights: &Array1<f64>) -> Result<Array1<f64>, Error> {
    let max = *log_weights
        .max()
        .map_err(|_| Error::invalid("log-weights must be non-empty and free of NaN"))?;
    if max == f64::NEG_INFINITY {
        return Err(Error::DegenerateWeights);
    }
    let total = log_sum_exp(log_weights);
    Ok(log_weights.mapv(|lw| (lw - total).exp()))
}

/// Probability-weighted mean of `values`; the SNIS reduction.
///
/// The two arrays must be index-aligned: entry `i` of both refers to the
/// same particle.
pub fn weighted_mean(values: &Array1<f64>, probabilities: &Array1<f64>) -> f64 {
    values.dot(probabilities)
}
