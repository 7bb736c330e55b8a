//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides timestamps for region timing.
///
/// This trait abstracts the underlying time source, allowing for both the real
/// monotonic clock and fake implementations (for testing). Timestamps are
/// durations since an arbitrary per-platform epoch; only differences between
/// timestamps from the same platform instance are meaningful.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Gets the current timestamp.
    fn timestamp(&self) -> Duration;
}
