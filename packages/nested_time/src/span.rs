//! Scoped region activations.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::pal::{Platform, PlatformFacade};
use crate::region::{RegionId, RegionTree};
use crate::ERR_POISONED_LOCK;

/// A scoped region activation that closes its region when dropped.
///
/// Created by [`Session::measure()`](crate::Session::measure). The region is
/// guaranteed to close on every exit path, including unwinding, which makes
/// this the recommended way to instrument a block of code.
///
/// Spans must be dropped in the reverse order of their creation - the strict
/// LIFO discipline of the region stack applies to spans just as it does to
/// explicit open/close calls. Dropping spans out of order is a usage violation
/// and panics, because a `Drop` implementation has no way to return the error.
///
/// # Examples
///
/// ```
/// use nested_time::Session;
///
/// # fn main() -> Result<(), nested_time::Error> {
/// let session = Session::new();
/// {
///     let _span = session.measure("parse")?;
///     // Perform the work being measured...
/// } // The region closes here.
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "measurements are taken between creation and drop"]
pub struct RegionSpan {
    tree: Arc<Mutex<RegionTree>>,
    platform: PlatformFacade,
    region: RegionId,

    _single_threaded: PhantomData<*const ()>,
}

impl RegionSpan {
    pub(crate) fn new(
        tree: Arc<Mutex<RegionTree>>,
        platform: PlatformFacade,
        region: RegionId,
    ) -> Self {
        Self {
            tree,
            platform,
            region,
            _single_threaded: PhantomData,
        }
    }

    /// The handle of the region this span keeps open.
    #[must_use]
    pub fn region(&self) -> RegionId {
        self.region
    }
}

impl Drop for RegionSpan {
    fn drop(&mut self) {
        let now = self.platform.timestamp();
        self.tree
            .lock()
            .expect(ERR_POISONED_LOCK)
            .close(self.region, now)
            .expect("region span dropped out of order - spans must close in reverse order of creation");
    }
}
