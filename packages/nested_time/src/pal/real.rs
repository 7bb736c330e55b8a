//! Real platform implementation using the monotonic clock.

use std::time::{Duration, Instant};

use crate::pal::abstractions::Platform;

/// Real implementation of the platform abstraction.
///
/// Timestamps are measured from the moment the platform was created, using the
/// standard monotonic clock.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RealPlatform {
    epoch: Instant,
}

impl RealPlatform {
    pub(crate) fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Platform for RealPlatform {
    fn timestamp(&self) -> Duration {
        self.epoch.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore)] // Miri cannot talk to the real clock.
    fn timestamps_are_monotonic() {
        let platform = RealPlatform::new();

        let first = platform.timestamp();
        let second = platform.timestamp();

        assert!(second >= first);
    }
}
