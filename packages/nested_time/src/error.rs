use thiserror::Error;

/// Errors that can occur when the open/close discipline of region timing is violated.
///
/// Every variant indicates an instrumentation bug in the calling code, detected
/// synchronously and surfaced immediately. None of these are retried and none are
/// recoverable by this crate - timing data is only meaningful if nesting is exact,
/// so a violation aborts the current measurement or reporting step rather than
/// corrupting ancestor totals.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A region was opened while its own activation was still running.
    ///
    /// A region must fully close before that same node can be opened again;
    /// re-entrant self-nesting is not supported.
    #[error("region '{name}' is already open - a region must close before it is opened again")]
    Reentrancy {
        /// Name of the region that was already open.
        name: String,
    },

    /// A region was closed directly while it had no running activation.
    #[error("region '{name}' has no running activation to close")]
    NotRunning {
        /// Name of the region that was not running.
        name: String,
    },

    /// A close was requested while no region was open at all.
    #[error("close was requested while the region stack is empty")]
    StackUnderflow,

    /// The region being closed is not the innermost open region.
    ///
    /// Close calls must exactly mirror the nesting order of opens, like
    /// parentheses.
    #[error("close does not match the innermost open region: expected '{expected}', actual '{actual}'")]
    Mismatch {
        /// Name of the region the caller asked to close.
        expected: String,

        /// Name of the region that was actually innermost.
        actual: String,
    },

    /// Flattened aggregation was requested before a top-down pass computed
    /// exclusive durations for the tree.
    #[error(
        "flattened aggregation requires a prior top-down pass: region '{name}' has no exclusive duration"
    )]
    IncompleteAggregation {
        /// Name of the first visited region without an exclusive duration.
        name: String,
    },
}

/// A specialized `Result` type for region timing operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
