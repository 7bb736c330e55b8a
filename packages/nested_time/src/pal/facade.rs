//! Facade that unifies the real and fake platform implementations.

use std::time::Duration;

#[cfg(test)]
use crate::pal::FakePlatform;
use crate::pal::{Platform, RealPlatform};

/// Switches between the real clock and a fake clock injected by tests.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(RealPlatform::new())
    }

    #[cfg(test)]
    pub(crate) fn fake(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }
}

impl Platform for PlatformFacade {
    fn timestamp(&self) -> Duration {
        match self {
            Self::Real(p) => p.timestamp(),
            #[cfg(test)]
            Self::Fake(p) => p.timestamp(),
        }
    }
}

#[cfg(test)]
impl From<FakePlatform> for PlatformFacade {
    fn from(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }
}
