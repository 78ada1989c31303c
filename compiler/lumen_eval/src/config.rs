//! Evaluator configuration.

/// Limits and switches for one evaluator.
///
/// ```text
/// let config = EvalConfig { max_steps: 1_000, ..EvalConfig::default() };
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Steps one pass may execute before halting with a step-limit exception.
    pub max_steps: usize,
    /// Function and structure evaluations that may be in progress at once.
    pub max_depth: usize,
    /// Reuse values of nodes whose stream dependencies did not change.
    pub memoize: bool,
    /// Values kept per stream for `Previous`.
    pub stream_history_limit: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_steps: 500_000,
            max_depth: 256,
            memoize: true,
            stream_history_limit: 1024,
        }
    }
}
