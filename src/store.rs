use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension, Transaction, params};

use crate::error::StoreError;

/// Key under which the whole notebook collection lives.
pub const NOTEBOOKS_KEY: &str = "kawaii_dream_notebooks";
const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Single string-keyed blob store. Values are replaced whole.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub fn default_db_path() -> Result<PathBuf, StoreError> {
    let proj = directories::ProjectDirs::from("com", "DreamNotebook", "dream_notebook")
        .ok_or(StoreError::NoDataDir)?;
    Ok(proj.data_dir().join("notebook.db"))
}

pub struct SqliteBlobStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteBlobStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let conn = match open_migrated(&path) {
            Ok(conn) => conn,
            Err(err) if is_corruption_error(&err) => {
                tracing::warn!(path = %path.display(), error = %err, "notebook store is corrupt, recreating");
                recover_connection(&path)?
            }
            Err(err) => return Err(err),
        };
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_with_recovery<T, F>(&mut self, mut operation: F) -> Result<T, StoreError>
    where
        F: FnMut(&Connection) -> Result<T, StoreError>,
    {
        match operation(&self.conn) {
            Ok(value) => Ok(value),
            Err(err) if is_corruption_error(&err) => {
                tracing::warn!(error = %err, "notebook store corrupted mid-session, recreating");
                let old = std::mem::replace(&mut self.conn, Connection::open_in_memory()?);
                let _ = old.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
                drop(old);
                self.conn = recover_connection(&self.path)?;
                operation(&self.conn)
            }
            Err(err) => Err(err),
        }
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.run_with_recovery(|conn| {
            conn.execute(
                "INSERT INTO kv_store(key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
    }
}

fn create_connection(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_READ_WRITE,
    )?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(conn)
}

fn open_migrated(path: &Path) -> Result<Connection, StoreError> {
    let mut conn = create_connection(path)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn recover_connection(path: &Path) -> Result<Connection, StoreError> {
    backup_corrupt_db_files(path)?;
    open_migrated(path)
}

fn backup_corrupt_db_files(db_file: &Path) -> Result<(), StoreError> {
    let stamp = unix_timestamp();
    for file in [
        db_file.to_path_buf(),
        PathBuf::from(format!("{}-wal", db_file.display())),
        PathBuf::from(format!("{}-shm", db_file.display())),
    ] {
        if file.exists() {
            let backup = PathBuf::from(format!("{}.corrupt.{stamp}", file.display()));
            std::fs::rename(&file, &backup)?;
            tracing::info!(backup = %backup.display(), "moved corrupt store file aside");
        }
    }
    Ok(())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn is_corruption_error(err: &StoreError) -> bool {
    match err {
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(code, _)) => {
            code.code == ErrorCode::DatabaseCorrupt || code.code == ErrorCode::NotADatabase
        }
        StoreError::Sqlite(other) => other
            .to_string()
            .to_lowercase()
            .contains("database disk image is malformed"),
        _ => false,
    }
}

fn apply_migrations(conn: &mut Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );
        "#,
    )?;
    let mut version: i64 = conn
        .query_row(
            "SELECT version FROM schema_version WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);

    while version < CURRENT_SCHEMA_VERSION {
        let target = version + 1;
        let tx = conn.transaction()?;
        match target {
            1 => migrate_to_v1(&tx)?,
            _ => unreachable!("unsupported schema version migration: {target}"),
        }
        tx.execute(
            "INSERT INTO schema_version(id, version) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET version = excluded.version",
            [target],
        )?;
        tx.commit()?;
        version = target;
    }

    Ok(())
}

fn migrate_to_v1(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Process-local store, used by tests and when no data directory exists.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    values: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    #[cfg(test)]
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io(std::io::Error::other("quota exceeded")));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
