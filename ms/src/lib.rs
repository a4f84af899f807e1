//! MemoryStore - persistent interaction log for JarvisCore
//!
//! An append-only log of interactions (type, JSON payload, optional JSON
//! context) kept in SQLite. Components and the controller write to it; the
//! `ms` binary inspects it.
//!
//! # Schema
//!
//! ```text
//! interactions(id, timestamp, interaction_type, data, context)
//! user_preferences(id, user_id, preference_type, preference_value, last_updated)
//! learned_patterns(id, pattern_type, pattern_data, confidence, last_used)
//! ```
//!
//! Only `interactions` is read or written; the other two tables exist so the
//! database file stays compatible with older tooling.
//!
//! # Example
//!
//! ```ignore
//! use memorystore::MemoryStore;
//! use serde_json::json;
//!
//! let store = MemoryStore::open("jarvis_memory.db")?;
//! store.store_interaction("greeting", &json!({"text": "hi"}), None)?;
//! let recent = store.get_recent_interactions(1)?;
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{Interaction, MemoryStore, now_timestamp};

/// Default number of interactions returned by "recent" queries
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Default database file name
pub const DEFAULT_DB_FILE: &str = "jarvis_memory.db";
