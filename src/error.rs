use thiserror::Error;

/// Failures surfaced by the inference engine and by distribution constructors.
///
/// A model that fails mid-execution returns one of these through
/// [`trace`](crate::core::trace) and [`Posterior::run`](crate::posterior::Posterior::run)
/// unmodified; the engine performs no retry and keeps no partial results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A caller-supplied argument was outside its domain, e.g. a zero particle
    /// count or a distribution parameter such as a negative rate.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Every particle reported a log-weight of negative infinity: the model
    /// assigns zero likelihood to the observed data along every sampled
    /// trajectory. This is a modeling error, not an engine failure.
    #[error("all particle log-weights are -inf; the model assigns zero likelihood to the data")]
    DegenerateWeights,
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
