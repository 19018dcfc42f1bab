use std::sync::{
    Arc,
    Mutex,
    PoisonError,
    RwLock,
    atomic::{AtomicU64, Ordering},
};

use tracing::debug;

use crate::{document_db::DocumentDb, error::Result, fuzzy::FuzzyIndex};

/// An index together with the mutation version it was built from.
#[derive(Debug)]
struct Published {
    index: Arc<FuzzyIndex>,
    version: u64,
}

/// Keeps the fuzzy index in step with the document store.
///
/// Every committed mutation bumps a version counter through
/// [`IndexSync::invalidate`]. A published index records the version that
/// was current when its rebuild started reading the store, and
/// [`IndexSync::snapshot`] only hands out an index whose version covers
/// every mutation that committed before the call. The index is swapped as
/// a whole, so a search never sees a half-built index.
#[derive(Debug)]
pub struct IndexSync {
    current: RwLock<Published>,
    dirty: AtomicU64,
    rebuild_lock: Mutex<()>,
}

impl IndexSync {
    /// Start one version behind so the first search builds from the store.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Published {
                index: Arc::new(FuzzyIndex::default()),
                version: 0,
            }),
            dirty: AtomicU64::new(1),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Record a committed mutation.
    pub fn invalidate(&self) {
        self.dirty.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_stale(&self) -> bool {
        self.published_version() < self.dirty.load(Ordering::Acquire)
    }

    /// An index reflecting every mutation committed before this call.
    ///
    /// When the published index is behind, this rebuilds it, or waits for
    /// a rebuild already in flight and uses its result if that covers the
    /// wanted version. A failed rebuild publishes nothing.
    pub fn snapshot(&self, db: &DocumentDb) -> Result<Arc<FuzzyIndex>> {
        let wanted = self.dirty.load(Ordering::Acquire);
        if let Some(index) = self.published_at(wanted) {
            return Ok(index);
        }

        let _guard = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = self.published_at(wanted) {
            return Ok(index);
        }

        let seen = self.dirty.load(Ordering::Acquire);
        let index = Arc::new(FuzzyIndex::build(db.list()?));
        self.publish(Arc::clone(&index), seen);

        debug!(documents = index.len(), version = seen, "rebuilt search index");
        Ok(index)
    }

    fn published_version(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    fn published_at(&self, wanted: u64) -> Option<Arc<FuzzyIndex>> {
        let current =
            self.current.read().unwrap_or_else(PoisonError::into_inner);
        (current.version >= wanted).then(|| Arc::clone(&current.index))
    }

    /// Callers hold `rebuild_lock`, so versions only move forward.
    fn publish(&self, index: Arc<FuzzyIndex>, version: u64) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Published { index, version };
    }
}

impl Default for IndexSync {
    fn default() -> Self {
        Self::new()
    }
}
