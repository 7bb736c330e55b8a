//! Region timing session state.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::pal::{Platform, PlatformFacade};
use crate::region::{RegionId, RegionTree};
use crate::{ERR_POISONED_LOCK, RegionSpan, Report, Result};

/// Manages region timing session state and contains the region tree.
///
/// A session is the explicit execution context for one logical thread of
/// control: callers mark named regions of execution as they enter and leave
/// them, and the session accumulates per-region duration and invocation counts,
/// preserving parent/child nesting. Concurrent executors must each use their
/// own session; interleaving opens and closes from multiple logical threads of
/// control on one session is out of contract and will surface as
/// [`Error::Mismatch`](crate::Error::Mismatch) or corrupted timings.
///
/// # Examples
///
/// ```
/// use nested_time::Session;
///
/// # fn main() -> Result<(), nested_time::Error> {
/// let session = Session::new();
///
/// session.open("render")?;
/// session.open("layout")?;
/// // Perform layout work...
/// session.close("layout")?;
/// // Perform the rest of the rendering work...
/// session.close("render")?;
///
/// // Output statistics of all regions to console.
/// // Using print_to_stdout() here is important because it prints nothing at
/// // all if no regions were recorded, not even an empty line.
/// session.print_to_stdout();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    tree: Arc<Mutex<RegionTree>>,
    platform: PlatformFacade,
}

impl Session {
    /// Creates a new region timing session with an empty region tree.
    #[expect(
        clippy::new_without_default,
        reason = "to avoid ambiguity with the notion of a 'default session' that is not actually a default session"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Mutex::new(RegionTree::new())),
            platform: PlatformFacade::real(),
        }
    }

    /// Creates a new region timing session with a specific platform.
    ///
    /// This method is primarily used for testing purposes to inject a fake
    /// clock that does not rely on the real passage of time.
    #[cfg(test)]
    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            tree: Arc::new(Mutex::new(RegionTree::new())),
            platform,
        }
    }

    /// Opens an activation of the named region.
    ///
    /// If another region is already open, the name resolves (or is created) as a
    /// child of the innermost open region; otherwise it resolves as a root
    /// region. The first open of a name at a given position creates the node;
    /// later opens reuse it, so counts and totals accumulate across activations.
    ///
    /// Returns a handle so the caller may close this region via
    /// [`close_handle()`](Self::close_handle) without re-resolving it by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reentrancy`](crate::Error::Reentrancy) if the resolved
    /// region already has a running activation; a region must fully close
    /// before that same node can be opened again.
    pub fn open(&self, name: impl AsRef<str>) -> Result<RegionId> {
        let now = self.platform.timestamp();
        self.tree
            .lock()
            .expect(ERR_POISONED_LOCK)
            .open(name.as_ref(), now)
    }

    /// Closes the innermost open region, which must be named `name`.
    ///
    /// Close calls must exactly mirror the nesting order of opens, like
    /// parentheses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackUnderflow`](crate::Error::StackUnderflow) if no
    /// region is open, or [`Error::Mismatch`](crate::Error::Mismatch) (carrying
    /// both names) if the innermost open region is not named `name`.
    pub fn close(&self, name: impl AsRef<str>) -> Result<()> {
        let now = self.platform.timestamp();
        self.tree
            .lock()
            .expect(ERR_POISONED_LOCK)
            .close_by_name(name.as_ref(), now)
    }

    /// Closes the running activation of the region identified by `region`.
    ///
    /// Equivalent to [`close()`](Self::close) for a handle previously returned
    /// by [`open()`](Self::open), skipping the name resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`](crate::Error::NotRunning) if the region
    /// has no running activation, [`Error::StackUnderflow`](crate::Error::StackUnderflow)
    /// if no region is open, or [`Error::Mismatch`](crate::Error::Mismatch) if
    /// the region is not the innermost open one.
    pub fn close_handle(&self, region: RegionId) -> Result<()> {
        let now = self.platform.timestamp();
        self.tree
            .lock()
            .expect(ERR_POISONED_LOCK)
            .close(region, now)
    }

    /// Opens an activation of the named region and returns a guard that closes
    /// it when dropped, on every exit path including unwinding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reentrancy`](crate::Error::Reentrancy) if the resolved
    /// region already has a running activation.
    ///
    /// # Examples
    ///
    /// ```
    /// use nested_time::Session;
    ///
    /// # fn main() -> Result<(), nested_time::Error> {
    /// let session = Session::new();
    ///
    /// {
    ///     let _render = session.measure("render")?;
    ///     {
    ///         let _layout = session.measure("layout")?;
    ///         // Perform layout work...
    ///     }
    /// }
    ///
    /// session.print_to_stdout();
    /// # Ok(())
    /// # }
    /// ```
    pub fn measure(&self, name: impl AsRef<str>) -> Result<RegionSpan> {
        let region = self.open(name)?;
        Ok(RegionSpan::new(
            Arc::clone(&self.tree),
            self.platform.clone(),
            region,
        ))
    }

    /// The number of currently open regions.
    ///
    /// Zero between independent root-level measurement runs; a well-nested
    /// sequence of opens and closes always returns the depth to its starting
    /// value.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tree.lock().expect(ERR_POISONED_LOCK).depth()
    }

    /// Creates a report from a snapshot of this session's region tree.
    ///
    /// The report can be safely sent to other threads for processing; later
    /// activity in the session does not affect it.
    #[must_use]
    pub fn to_report(&self) -> Report {
        let tree = self.tree.lock().expect(ERR_POISONED_LOCK);
        Report::from_tree(&tree)
    }

    /// Whether there is any recorded activity in this session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.lock().expect(ERR_POISONED_LOCK).is_empty()
    }

    /// Prints the region timing statistics to stdout as an indented tree.
    ///
    /// This is a convenience method equivalent to
    /// `self.to_report().print_to_stdout()`. Prints nothing if no activations
    /// were recorded.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        self.to_report().print_to_stdout();
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to Report's Display implementation for consistency.
        write!(f, "{}", self.to_report())
    }
}
