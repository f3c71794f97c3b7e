pub mod in_memory;

pub use in_memory::InMemorySessionStore;

use std::fmt::{Display, Formatter};

use crate::models::{MonitorError, PersistedMonitorState, ResourceId};

pub type PersistenceResult<T> = Result<T, MonitorError>;

/// Namespaced storage key, `<namespace>:<resourceId>`. Two different
/// resources never contend for the same record, and the reinstall and rescue
/// monitors for one resource keep separate records.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(namespace: &str, resource: &ResourceId) -> Self {
        Self(format!("{namespace}:{}", resource.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-scoped persistence for monitor snapshots. Stores hold only the
/// [`PersistedMonitorState`] subset; secrets and error text never reach a
/// store by construction. Callers treat every failure here as non-fatal.
pub trait SessionStore: Send + Sync {
    fn save(&self, key: &StorageKey, state: &PersistedMonitorState) -> PersistenceResult<()>;

    fn load(&self, key: &StorageKey) -> PersistenceResult<Option<PersistedMonitorState>>;

    fn clear(&self, key: &StorageKey) -> PersistenceResult<()>;
}
