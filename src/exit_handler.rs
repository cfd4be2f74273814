//! Exit code logic for the puller process.
//!
//! Single responsibility: map per-day outcome counts to the process exit outcome.

use crate::ProcessExit;

/// Determines the process exit outcome from succeeded (written or cached)
/// and skipped day counts.
pub(crate) fn determine_exit_outcome(succeeded: usize, skipped: usize) -> ProcessExit {
    if skipped == 0 {
        ProcessExit::Success
    } else if succeeded > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
