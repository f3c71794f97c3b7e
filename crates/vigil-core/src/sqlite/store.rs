use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::models::{MonitorError, MonitorErrorKind, PersistedMonitorState};
use crate::persistence::{PersistenceResult, SessionStore, StorageKey};
use crate::sqlite::migrations::{SqliteMigration, current_schema_version, migration};

const MIGRATIONS_TABLE: &str = "vigil_schema_migrations";

/// Session store over a sqlite file. The file is expected to live in a
/// session-scoped scratch path owned by the caller; vigil treats it as
/// disposable, exactly like the in-memory store.
pub struct SqliteSessionStore {
    database_path: PathBuf,
}

impl SqliteSessionStore {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn current_version(&self) -> PersistenceResult<i64> {
        self.with_connection("current_version", |connection| {
            ensure_migrations_table(connection)?;
            read_current_version(connection)
        })
    }

    pub fn migrate_to_latest(&self) -> PersistenceResult<()> {
        self.apply_migration(current_schema_version())
    }

    pub fn apply_migration(&self, target_version: i64) -> PersistenceResult<()> {
        if target_version < 0 || target_version > current_schema_version() {
            return Err(storage_error_text(
                "apply_migration",
                format!("invalid migration target version '{target_version}'"),
            ));
        }

        if target_version > 0 && migration(target_version).is_none() {
            return Err(storage_error_text(
                "apply_migration",
                format!("migration version '{target_version}' is not defined"),
            ));
        }

        self.with_connection("apply_migration", |connection| {
            ensure_migrations_table(connection)?;
            let current_version = read_current_version(connection)?;

            if target_version == current_version {
                // All DDL uses CREATE TABLE IF NOT EXISTS, so re-applying is
                // idempotent and repairs a recorded-but-missing schema.
                for version in 1..=target_version {
                    if let Some(m) = migration(version) {
                        connection.execute_batch(m.up_sql)?;
                    }
                }
                return Ok(());
            }

            if target_version > current_version {
                for version in (current_version + 1)..=target_version {
                    if let Some(m) = migration(version) {
                        apply_up_migration(connection, m)?;
                    }
                }
            } else {
                for version in ((target_version + 1)..=current_version).rev() {
                    if let Some(m) = migration(version) {
                        apply_down_migration(connection, m)?;
                    }
                }
            }

            Ok(())
        })
    }

    fn with_connection<T>(
        &self,
        operation_name: &str,
        operation: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> PersistenceResult<T> {
        let mut connection = open_connection(&self.database_path)
            .map_err(|error| storage_error(operation_name, error))?;
        operation(&mut connection).map_err(|error| storage_error(operation_name, error))
    }
}

impl SessionStore for SqliteSessionStore {
    fn save(&self, key: &StorageKey, state: &PersistedMonitorState) -> PersistenceResult<()> {
        let payload = serde_json::to_string(state).map_err(|error| {
            storage_error_text("save", format!("failed to encode payload: {error}"))
        })?;

        self.with_connection("save", |connection| {
            ensure_schema_ready(connection)?;
            connection.execute(
                "
INSERT INTO monitor_sessions (storage_key, payload, updated_at_unix)
VALUES (?1, ?2, strftime('%s', 'now'))
ON CONFLICT(storage_key) DO UPDATE SET
    payload = excluded.payload,
    updated_at_unix = excluded.updated_at_unix
",
                (key.as_str(), payload.as_str()),
            )?;
            Ok(())
        })
    }

    fn load(&self, key: &StorageKey) -> PersistenceResult<Option<PersistedMonitorState>> {
        let payload: Option<String> = self.with_connection("load", |connection| {
            ensure_schema_ready(connection)?;
            let mut statement = connection
                .prepare("SELECT payload FROM monitor_sessions WHERE storage_key = ?1")?;
            let mut rows = statement.query_map([key.as_str()], |row| row.get(0))?;
            rows.next().transpose()
        })?;

        match payload {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|error| {
                storage_error_text("load", format!("corrupt persisted payload: {error}"))
            }),
        }
    }

    fn clear(&self, key: &StorageKey) -> PersistenceResult<()> {
        self.with_connection("clear", |connection| {
            ensure_schema_ready(connection)?;
            connection.execute(
                "DELETE FROM monitor_sessions WHERE storage_key = ?1",
                [key.as_str()],
            )?;
            Ok(())
        })
    }
}

fn open_connection(database_path: &Path) -> rusqlite::Result<Connection> {
    if let Some(parent) = database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;
    }
    Connection::open(database_path)
}

fn ensure_migrations_table(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(&format!(
        "
CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at_unix INTEGER NOT NULL
);
"
    ))?;
    Ok(())
}

fn ensure_schema_ready(connection: &Connection) -> rusqlite::Result<()> {
    ensure_migrations_table(connection)?;
    let version = read_current_version(connection)?;
    if version <= 0 {
        return Err(storage_error_sqlite(
            "database schema is not initialized; apply migrations before session operations",
        ));
    }
    Ok(())
}

fn read_current_version(connection: &Connection) -> rusqlite::Result<i64> {
    connection.query_row(
        &format!("SELECT COALESCE(MAX(version), 0) FROM {MIGRATIONS_TABLE}"),
        [],
        |row| row.get(0),
    )
}

fn apply_up_migration(
    connection: &mut Connection,
    migration: &SqliteMigration,
) -> rusqlite::Result<()> {
    let transaction = connection.transaction()?;
    transaction.execute_batch(migration.up_sql)?;
    transaction.execute(
        &format!(
            "INSERT INTO {MIGRATIONS_TABLE} (version, name, applied_at_unix)
             VALUES (?1, ?2, strftime('%s', 'now'))"
        ),
        (migration.version, migration.name),
    )?;
    transaction.commit()?;
    Ok(())
}

fn apply_down_migration(
    connection: &mut Connection,
    migration: &SqliteMigration,
) -> rusqlite::Result<()> {
    let transaction = connection.transaction()?;
    transaction.execute_batch(migration.down_sql)?;
    transaction.execute(
        &format!("DELETE FROM {MIGRATIONS_TABLE} WHERE version = ?1"),
        [migration.version],
    )?;
    transaction.commit()?;
    Ok(())
}

fn storage_error(operation: &str, error: rusqlite::Error) -> MonitorError {
    storage_error_text(operation, error.to_string())
}

fn storage_error_sqlite(message: &str) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::other(message.to_string())))
}

fn storage_error_text(operation: &str, message: impl AsRef<str>) -> MonitorError {
    MonitorError {
        resource: None,
        operation: None,
        kind: MonitorErrorKind::StorageFailure,
        message: format!("sqlite session store '{operation}' failed: {}", message.as_ref()),
    }
}
