//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Platform;

/// Fake implementation of the platform abstraction for testing.
///
/// This implementation allows tests to control the timestamp values instead of
/// relying on the real clock. Multiple clones of the same `FakePlatform` share
/// the same underlying time state, allowing tests to modify the time after
/// platform creation to simulate time progression - including moving the clock
/// backwards to simulate pathological timer interference.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    time: Arc<Mutex<Duration>>,
}

impl FakePlatform {
    /// Creates a new fake platform with a zero timestamp.
    pub(crate) fn new() -> Self {
        Self {
            time: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Sets the current timestamp.
    ///
    /// This affects all clones of this platform, allowing tests to simulate
    /// time progression during measurement.
    pub(crate) fn set_time(&self, time: Duration) {
        *self
            .time
            .lock()
            .expect("FakePlatform state lock should not be poisoned") = time;
    }
}

impl Platform for FakePlatform {
    fn timestamp(&self) -> Duration {
        *self
            .time
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_time() {
        let platform = FakePlatform::new();
        assert_eq!(platform.timestamp(), Duration::ZERO);
    }

    #[test]
    fn sets_time() {
        let platform = FakePlatform::new();
        platform.set_time(Duration::from_millis(150));

        assert_eq!(platform.timestamp(), Duration::from_millis(150));
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        // Setting time on one clone affects the other.
        platform1.set_time(Duration::from_millis(100));
        assert_eq!(platform2.timestamp(), Duration::from_millis(100));
    }
}
