//! Table definitions.

use crate::error::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS activation_keys (
        key TEXT PRIMARY KEY,
        is_used INTEGER NOT NULL DEFAULT 0,
        expired INTEGER NOT NULL DEFAULT 0,
        expires_at TEXT,
        created_by TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS key_activations (
        key TEXT NOT NULL,
        hwid TEXT NOT NULL,
        activated_at TEXT NOT NULL,
        last_check TEXT NOT NULL,
        first_val REAL NOT NULL,
        second_val REAL NOT NULL,
        PRIMARY KEY (key, hwid)
    );

    CREATE TABLE IF NOT EXISTS user_levels (
        user_id TEXT PRIMARY KEY,
        level INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS key_usage_logs (
        id TEXT PRIMARY KEY,
        key TEXT NOT NULL,
        place_name TEXT NOT NULL,
        ip_address TEXT NOT NULL,
        used_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_key_usage_logs_key ON key_usage_logs (key);
";

/// Creates any missing tables. Safe to run on every open.
pub(crate) fn init(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| DbError::Migration(format!("failed to init schema: {e}")))
}
