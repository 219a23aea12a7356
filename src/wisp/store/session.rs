use super::EntityStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identifies the session a gateway call was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// The single shared store of a client, plus its session generation.
///
/// Locks are only ever held for synchronous store operations, never across a
/// gateway await. A response is applied through [`Session::apply`], which
/// drops it when the session was reset after the call was issued.
#[derive(Debug, Default)]
pub struct Session {
    store: RwLock<EntityStore>,
    generation: AtomicU64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, EntityStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntityStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, issued: Generation) -> bool {
        self.generation() == issued
    }

    /// Applies `f` if no reset happened since `issued`. Returns `None` when stale.
    pub fn apply<T>(&self, issued: Generation, f: impl FnOnce(&mut EntityStore) -> T) -> Option<T> {
        let mut store = self.write();
        if !self.is_current(issued) {
            tracing::warn!(
                issued = issued.0,
                current = self.generation.load(Ordering::SeqCst),
                "discarding response from a previous session"
            );
            return None;
        }
        Some(f(&mut *store))
    }

    /// Local-only mutation (selection and the like), not tied to a gateway call.
    pub fn update<T>(&self, f: impl FnOnce(&mut EntityStore) -> T) -> T {
        let mut store = self.write();
        f(&mut *store)
    }

    /// Starts a new session: clears the store and invalidates in-flight calls.
    pub fn reset(&self) {
        let mut store = self.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        store.clear();
    }
}
