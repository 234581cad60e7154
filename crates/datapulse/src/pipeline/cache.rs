//! Single-slot cache holding the most recently analyzed dataset.

use crate::dataset::Dataset;
use parking_lot::Mutex;

/// The baseline for the next drift comparison.
///
/// Reading the previous snapshot and installing the new one happen under
/// one lock, so concurrent analyses never observe a half-swapped slot.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slot: Mutex<Option<Dataset>>,
}

static_assertions::assert_impl_all!(SnapshotCache: Send, Sync);

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the cached dataset, if any.
    pub fn latest(&self) -> Option<Dataset> {
        self.slot.lock().clone()
    }

    /// Whether a baseline is cached.
    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }

    /// Install `dataset` and return the one it replaced.
    pub fn replace(&self, dataset: Dataset) -> Option<Dataset> {
        self.slot.lock().replace(dataset)
    }

    /// Drop the cached dataset.
    pub fn clear(&self) -> Option<Dataset> {
        self.slot.lock().take()
    }

    /// Run `f` against the cached baseline while holding the lock.
    ///
    /// When `f` succeeds, `next` becomes the cached dataset. On error the
    /// slot is left untouched.
    pub fn swap_with<T, E>(
        &self,
        next: Dataset,
        f: impl FnOnce(&Dataset, Option<&Dataset>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut slot = self.slot.lock();
        let output = f(&next, slot.as_ref())?;
        *slot = Some(next);
        Ok(output)
    }
}
