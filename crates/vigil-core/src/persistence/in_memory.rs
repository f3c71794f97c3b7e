use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{MonitorError, MonitorErrorKind, PersistedMonitorState};
use crate::persistence::{PersistenceResult, SessionStore, StorageKey};

/// Process-local session store. Lives exactly as long as the session that
/// created it, which is the durability contract the monitors expect.
#[derive(Default)]
pub struct InMemorySessionStore {
    records: Mutex<HashMap<StorageKey, PersistedMonitorState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_records(
        &self,
    ) -> PersistenceResult<std::sync::MutexGuard<'_, HashMap<StorageKey, PersistedMonitorState>>>
    {
        self.records.lock().map_err(|_| MonitorError {
            resource: None,
            operation: None,
            kind: MonitorErrorKind::Internal,
            message: "session store mutex poisoned".to_string(),
        })
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, key: &StorageKey, state: &PersistedMonitorState) -> PersistenceResult<()> {
        self.lock_records()?.insert(key.clone(), state.clone());
        Ok(())
    }

    fn load(&self, key: &StorageKey) -> PersistenceResult<Option<PersistedMonitorState>> {
        Ok(self.lock_records()?.get(key).cloned())
    }

    fn clear(&self, key: &StorageKey) -> PersistenceResult<()> {
        self.lock_records()?.remove(key);
        Ok(())
    }
}
