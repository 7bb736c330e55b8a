//! Hierarchical region timing for low-overhead instrumentation.
//!
//! Callers mark named regions of execution as they enter and leave them, and the
//! session accumulates per-region duration and invocation counts, preserving
//! parent/child nesting so results can be reported both as a call tree and as a
//! flattened per-name summary.
//!
//! The core functionality includes:
//! - [`Session`] - The explicit execution context holding the region tree and
//!   the stack of currently open regions
//! - [`RegionSpan`] - Scoped activation that closes its region when dropped
//! - [`Report`] - A snapshot of the region tree with the two reporting
//!   traversals: the top-down call tree and the flattened per-name summary
//! - [`NameCache`] - Memoizing lookup for region names that originate outside
//!   the local runtime
//!
//! This package is intended for instrumenting latency-sensitive code paths
//! (an interpreter loop, a UI render pass, a cross-runtime bridge), where the
//! cost of measurement itself must be minimized. It is not a distributed
//! tracer: there are no trace IDs, no sampling and no cross-process
//! correlation.
//!
//! # Simple usage
//!
//! ```
//! use nested_time::Session;
//!
//! # fn main() -> Result<(), nested_time::Error> {
//! let session = Session::new();
//!
//! for _ in 0..16 {
//!     let _frame = session.measure("frame")?;
//!     {
//!         let _layout = session.measure("layout")?;
//!         // Perform layout work...
//!     }
//!     {
//!         let _paint = session.measure("paint")?;
//!         // Perform paint work...
//!     }
//! }
//!
//! // Print the call tree. Prints nothing at all if nothing was recorded.
//! session.print_to_stdout();
//! # Ok(())
//! # }
//! ```
//!
//! # Explicit open/close
//!
//! Where a scoped guard is inconvenient (instrumentation driven by events
//! rather than scopes), regions can be opened and closed explicitly. Closes
//! must exactly mirror the nesting order of opens, like parentheses; any
//! violation is reported as an [`Error`] immediately rather than corrupting
//! ancestor totals.
//!
//! ```
//! use nested_time::Session;
//!
//! # fn main() -> Result<(), nested_time::Error> {
//! let session = Session::new();
//!
//! session.open("request")?;
//! let parse = session.open("parse")?;
//! // The handle returned by open() allows closing without the name lookup.
//! session.close_handle(parse)?;
//! session.close("request")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Reporting
//!
//! ```
//! use nested_time::Session;
//!
//! # fn main() -> Result<(), nested_time::Error> {
//! let session = Session::new();
//! {
//!     let _outer = session.measure("outer")?;
//!     let _inner = session.measure("inner")?;
//! }
//!
//! let mut report = session.to_report();
//!
//! // Top-down: the call tree, children ordered by duration descending, with
//! // synthetic "(Unaccounted)" rows for each region's own time.
//! for row in report.top_down() {
//!     println!("{row}");
//! }
//!
//! // Flattened: same-named regions grouped across all tree positions.
//! // Requires the top-down pass to have computed exclusive durations.
//! for (name, summary) in report.flattened()? {
//!     println!("{name}: {} activations", summary.count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! A [`Session`] assumes a single logical thread of control: opens and closes
//! must not interleave across concurrently executing code. The session itself
//! may be moved between threads and its reports processed anywhere, but
//! concurrent executors must each use their own session instance.

mod error;
mod name_cache;
mod pal;
mod region;
mod report;
mod session;
mod span;

pub use error::Error;
pub(crate) use error::Result;
pub use name_cache::NameCache;
pub use region::RegionId;
pub use report::{Report, RegionSummary, TreeRow, UNACCOUNTED_LABEL};
pub use session::Session;
pub use span::RegionSpan;

pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - program validity cannot be guaranteed";
