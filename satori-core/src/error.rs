//! Error types shared across the Satori workspace.

use thiserror::Error;

/// Errors produced by the solver stack.
///
/// Preprocessing failures are recoverable: the driver downgrades them to an
/// *unknown* verdict and stays usable. The remaining variants indicate either
/// misuse of the API or an internal bug and are surfaced to the caller.
#[derive(Debug, Error)]
pub enum SatoriError {
    /// A preprocessing or translation step could not handle the goal.
    #[error("tactic `{tactic}` failed: {reason}")]
    Tactic {
        /// Name of the failing tactic.
        tactic: &'static str,
        /// Human-readable failure description.
        reason: String,
    },

    /// The shared resource limit was exhausted or the computation canceled.
    #[error("canceled: {0}")]
    Canceled(&'static str),

    /// `translate` was invoked on a solver above the base scope level.
    #[error("cannot translate solver at non-base level")]
    TranslateAtNonBase,

    /// An internal invariant was violated; indicates a bug in preprocessing
    /// or translation rather than bad input.
    #[error("solver invariant violated: {0}")]
    Invariant(String),

    /// Weighted-CNF display received weights that are not unsigned integers.
    #[error("cannot display weights that are not unsigned integers")]
    NonIntegralWeight,
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SatoriError>;
