//! Reporting channel for evaluator failures.
use crate::ErrorKind;

/// Receives every failure of a [`UniformEvaluator`](super::UniformEvaluator)
/// before it is returned to the caller.
///
/// Any `Fn(ErrorKind, &str) + Send + Sync` closure is an `ErrorSink`.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use subdiv_petite::osdutil::UniformEvaluator;
/// use subdiv_petite::ErrorKind;
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// let mut evaluator = UniformEvaluator::new().with_error_sink(move |kind: ErrorKind, message: &str| {
///     sink.lock().unwrap().push((kind, message.to_string()));
/// });
///
/// assert!(evaluator.refine(4).is_err());
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub trait ErrorSink: Send + Sync {
    fn report(&self, kind: ErrorKind, message: &str);
}

impl<F> ErrorSink for F
where
    F: Fn(ErrorKind, &str) + Send + Sync,
{
    #[inline]
    fn report(&self, kind: ErrorKind, message: &str) {
        self(kind, message)
    }
}

/// Forwards failures to [`tracing::error!`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, kind: ErrorKind, message: &str) {
        tracing::error!(kind = ?kind, code = u32::from(kind), "{}", message);
    }
}
