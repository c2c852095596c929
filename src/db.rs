use crate::storage::KeyValueStore;
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "lisan.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    // Early workspaces were created before updated_at existed.
    ensure_kv_updated_at(&conn)?;

    Ok(conn)
}

fn ensure_kv_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if !table_has_column(conn, "kv_store", "updated_at")? {
        conn.execute("ALTER TABLE kv_store ADD COLUMN updated_at TEXT", [])?;
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|n| n == column))
}

/// Workspace-backed store: one row per local-storage key.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: open_db(workspace)?,
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |r| {
                r.get::<_, String>(0)
            })
            .optional()
            .with_context(|| format!("failed to read key {}", key))?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv_store(key, value, updated_at) VALUES(?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                (key, value, &now),
            )
            .with_context(|| format!("failed to write key {}", key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?", [key])
            .with_context(|| format!("failed to delete key {}", key))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_store_set_get_remove() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = SqliteStore::open(dir.path()).expect("open store");
        assert_eq!(store.get("examinerName").expect("get"), None);

        store.set("examinerName", "Ustadz Hasan").expect("set");
        store.set("examinerName", "Ustadz Ali").expect("overwrite");
        assert_eq!(
            store.get("examinerName").expect("get").as_deref(),
            Some("Ustadz Ali")
        );

        store.remove("examinerName").expect("remove");
        assert_eq!(store.get("examinerName").expect("get"), None);
        // Removing a missing key is not an error.
        store.remove("examinerName").expect("remove again");
    }

    #[test]
    fn values_persist_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let mut store = SqliteStore::open(dir.path()).expect("open store");
            store.set("examDate", "2025-05-01").expect("set");
        }
        let store = SqliteStore::open(dir.path()).expect("reopen store");
        assert_eq!(
            store.get("examDate").expect("get").as_deref(),
            Some("2025-05-01")
        );
        assert!(dir.path().join(DB_FILE_NAME).is_file());
    }
}
