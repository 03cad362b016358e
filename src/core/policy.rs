//! SV-004: Failure policy: hand errors back, or print and exit.
//!
//! The core always returns `VarError`. Hosts that prefer a fatal exit pick
//! `FailurePolicy::Exit` and route results through `apply`.

use super::error::VarResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Print the rendered error to stderr and exit with status 1.
    Exit,
}

impl FailurePolicy {
    pub fn apply<T>(self, result: VarResult<T>) -> VarResult<T> {
        match (self, result) {
            (Self::Exit, Err(e)) => {
                tracing::debug!(kind = %e.kind, "fatal resolution error");
                eprintln!("{}", e);
                std::process::exit(1);
            }
            (_, result) => result,
        }
    }
}
