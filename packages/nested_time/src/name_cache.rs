//! Memoizing lookup for region names originating outside the local runtime.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// A memoizing cache from a stable foreign handle to a region name.
///
/// When region names originate from a foreign runtime boundary, converting them
/// to a local string on every open is wasted work. This cache performs the
/// conversion at most once per handle and hands out cheap [`Arc<str>`] clones
/// afterwards.
///
/// Correctness depends on foreign handles being immutable and non-relocatable
/// for the lifetime of the cache: a handle that is reused for a different name
/// will keep resolving to the old one. That is an accepted risk of the
/// caller's handle scheme, not something this type can detect.
///
/// # Examples
///
/// ```
/// use nested_time::NameCache;
///
/// let mut cache = NameCache::new();
///
/// // The conversion closure runs only on the first lookup of a handle.
/// let name = cache.resolve(42_u32, || "render".to_string());
/// assert_eq!(&*name, "render");
///
/// let again = cache.resolve(42_u32, || unreachable!("already cached"));
/// assert_eq!(&*again, "render");
/// ```
#[derive(Debug)]
pub struct NameCache<K> {
    entries: HashMap<K, Arc<str>>,
}

impl<K> NameCache<K>
where
    K: Eq + Hash,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Resolves the name for a handle, converting via `convert` on the first
    /// lookup and returning the memoized name on every later one.
    pub fn resolve(&mut self, handle: K, convert: impl FnOnce() -> String) -> Arc<str> {
        Arc::clone(
            self.entries
                .entry(handle)
                .or_insert_with(|| Arc::from(convert())),
        )
    }

    /// The number of handles cached so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handle has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> Default for NameCache<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn converts_each_handle_once() {
        let mut cache = NameCache::new();
        let conversions = Cell::new(0_u32);

        for _ in 0..3 {
            let name = cache.resolve(7_u64, || {
                conversions.set(conversions.get() + 1);
                "bridge_call".to_string()
            });
            assert_eq!(&*name, "bridge_call");
        }

        assert_eq!(conversions.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_handles_resolve_independently() {
        let mut cache = NameCache::new();

        let first = cache.resolve(1_u32, || "first".to_string());
        let second = cache.resolve(2_u32, || "second".to_string());

        assert_eq!(&*first, "first");
        assert_eq!(&*second, "second");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn starts_empty() {
        let cache: NameCache<u32> = NameCache::new();
        assert!(cache.is_empty());
    }

    static_assertions::assert_impl_all!(NameCache<u64>: Send, Sync);
}
