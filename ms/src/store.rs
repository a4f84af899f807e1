//! Core MemoryStore implementation

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use eyre::{Context, Result, eyre};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Tables created on open. `user_preferences` and `learned_patterns` are
/// declared for schema compatibility; nothing in this crate reads or writes them.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS interactions (
    id INTEGER PRIMARY KEY,
    timestamp REAL,
    interaction_type TEXT,
    data TEXT,
    context TEXT
);

CREATE TABLE IF NOT EXISTS user_preferences (
    id INTEGER PRIMARY KEY,
    user_id TEXT,
    preference_type TEXT,
    preference_value TEXT,
    last_updated REAL
);

CREATE TABLE IF NOT EXISTS learned_patterns (
    id INTEGER PRIMARY KEY,
    pattern_type TEXT,
    pattern_data TEXT,
    confidence REAL,
    last_used REAL
);
";

/// A single stored interaction, as returned by [`MemoryStore::get_recent_interactions`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Unix timestamp in fractional seconds
    pub timestamp: f64,
    /// Interaction type tag
    #[serde(rename = "type")]
    pub interaction_type: String,
    /// Interaction payload
    pub data: Value,
    /// Optional context captured alongside the payload
    pub context: Option<Value>,
}

/// Current wall-clock time as fractional Unix seconds
pub fn now_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Append-only interaction log backed by SQLite
pub struct MemoryStore {
    conn: Mutex<Connection>,
    location: String,
}

impl MemoryStore {
    /// Open or create a memory database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context(format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn =
            Connection::open(path).context(format!("Failed to open memory database: {}", path.display()))?;
        Self::from_connection(conn, path.display().to_string())
    }

    /// Open a private in-memory database (nothing survives the store)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn, ":memory:".to_string())
    }

    fn from_connection(conn: Connection, location: String) -> Result<Self> {
        conn.execute_batch(SCHEMA).context("Failed to create memory schema")?;
        info!(%location, "Opened memory store");
        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }

    /// Where this store lives (file path or `:memory:`)
    pub fn location(&self) -> &str {
        &self.location
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| eyre!("Memory store connection lock poisoned"))
    }

    /// Append an interaction stamped with the current time
    ///
    /// Prior records are never modified. A missing, null or empty-object
    /// context is stored as NULL.
    pub fn store_interaction(&self, interaction_type: &str, data: &Value, context: Option<&Value>) -> Result<()> {
        let data_json = serde_json::to_string(data).context("Failed to serialize interaction data")?;
        let context_json = match context {
            Some(value) if !is_empty_context(value) => {
                Some(serde_json::to_string(value).context("Failed to serialize interaction context")?)
            }
            _ => None,
        };

        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO interactions (timestamp, interaction_type, data, context) VALUES (?1, ?2, ?3, ?4)",
            params![now_timestamp(), interaction_type, data_json, context_json],
        )
        .context("Failed to store interaction")?;

        debug!(%interaction_type, "Stored interaction");
        Ok(())
    }

    /// Most recent interactions, newest first
    pub fn get_recent_interactions(&self, limit: usize) -> Result<Vec<Interaction>> {
        let rows = {
            let conn = self.connection()?;
            let mut stmt = conn.prepare(
                "SELECT timestamp, interaction_type, data, context FROM interactions \
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )?;
            let mapped = stmt.query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?;
            mapped
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("Failed to read interactions")?
        };

        rows.into_iter()
            .map(|(timestamp, interaction_type, data, context)| -> Result<Interaction> {
                let data = serde_json::from_str(&data)
                    .context(format!("Corrupt data column for interaction '{}'", interaction_type))?;
                let context = context
                    .map(|c| serde_json::from_str(&c))
                    .transpose()
                    .context(format!("Corrupt context column for interaction '{}'", interaction_type))?;
                Ok(Interaction {
                    timestamp,
                    interaction_type,
                    data,
                    context,
                })
            })
            .collect()
    }

    /// Total number of stored interactions
    pub fn interaction_count(&self) -> Result<u64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn is_empty_context(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_fetch_single() {
        let store = MemoryStore::open_in_memory().unwrap();
        store.store_interaction("greeting", &json!({"text": "hi"}), None).unwrap();

        let recent = store.get_recent_interactions(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].interaction_type, "greeting");
        assert_eq!(recent[0].data, json!({"text": "hi"}));
        assert!(recent[0].context.is_none());
        assert!(recent[0].timestamp > 0.0);
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let store = MemoryStore::open_in_memory().unwrap();
        for i in 0..5 {
            store.store_interaction("tick", &json!({"i": i}), None).unwrap();
        }

        let recent = store.get_recent_interactions(3).unwrap();
        let seen: Vec<i64> = recent.iter().map(|r| r.data["i"].as_i64().unwrap()).collect();
        assert_eq!(seen, vec![4, 3, 2]);
    }

    #[test]
    fn test_context_round_trip_and_empty_context() {
        let store = MemoryStore::open_in_memory().unwrap();
        store
            .store_interaction("query", &json!({"q": "weather"}), Some(&json!({"source": "voice"})))
            .unwrap();
        store.store_interaction("query", &json!({"q": "time"}), Some(&json!({}))).unwrap();

        let recent = store.get_recent_interactions(10).unwrap();
        assert!(recent[0].context.is_none());
        assert_eq!(recent[1].context, Some(json!({"source": "voice"})));
    }

    #[test]
    fn test_interaction_serializes_with_type_key() {
        let interaction = Interaction {
            timestamp: 1.5,
            interaction_type: "greeting".to_string(),
            data: json!({"text": "hi"}),
            context: None,
        };

        let value = serde_json::to_value(&interaction).unwrap();
        assert_eq!(value["type"], "greeting");
        assert!(value["context"].is_null());
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("nested").join("memory.db");

        {
            let store = MemoryStore::open(&db_path).unwrap();
            store.store_interaction("boot", &json!({}), None).unwrap();
        }

        let store = MemoryStore::open(&db_path).unwrap();
        assert_eq!(store.interaction_count().unwrap(), 1);
        assert_eq!(store.get_recent_interactions(10).unwrap()[0].interaction_type, "boot");
    }

    #[test]
    fn test_schema_parity_tables_exist() {
        let store = MemoryStore::open_in_memory().unwrap();
        let conn = store.connection().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(names, vec!["interactions", "learned_patterns", "user_preferences"]);
    }
}
