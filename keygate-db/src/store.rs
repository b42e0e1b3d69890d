//! SQLite-backed key store.

use crate::error::{DbError, DbResult};
use crate::schema;
use chrono::{DateTime, SecondsFormat, Utc};
use keygate_license::{
    ActivationFields, ActivationKey, KeyActivation, KeyStore, StoreError, StoreResult,
    UsageLog, UsageRecord,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Persistent key store backed by SQLite.
///
/// One connection is shared by every request; queries are serialized
/// through its mutex.
#[derive(Clone)]
pub struct SqliteKeyStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("opened key store at {}", path.display());
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        schema::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    // ── Provisioning ─────────────────────────────────────────────

    /// Inserts or replaces a key row.
    pub fn insert_key(&self, key: &ActivationKey) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO activation_keys (key, is_used, expired, expires_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                key.key,
                key.is_used,
                key.expired,
                key.expires_at.map(encode_time),
                key.created_by,
            ],
        )?;
        Ok(())
    }

    /// Sets a user's level.
    pub fn set_user_level(&self, user_id: &str, level: i64) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO user_levels (user_id, level) VALUES (?1, ?2)",
            params![user_id, level],
        )?;
        Ok(())
    }

    // ── Inspection ───────────────────────────────────────────────

    /// Returns a key row regardless of its used/expired state.
    pub fn find_key(&self, key: &str) -> DbResult<Option<ActivationKey>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT key, is_used, expired, expires_at, created_by
                 FROM activation_keys WHERE key = ?1",
                params![key],
                RawKey::from_row,
            )
            .optional()?;
        raw.map(RawKey::decode).transpose()
    }

    /// Returns every activation row for a key, ordered by hwid.
    pub fn activations_for(&self, key: &str) -> DbResult<Vec<KeyActivation>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT key, hwid, activated_at, last_check, first_val, second_val
             FROM key_activations WHERE key = ?1 ORDER BY hwid",
        )?;
        let rows = stmt.query_map(params![key], RawActivation::from_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?.decode()?);
        }
        Ok(result)
    }

    /// Returns the usage log for a key, oldest first.
    pub fn usage_for(&self, key: &str) -> DbResult<Vec<UsageRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT key, place_name, ip_address, used_at
             FROM key_usage_logs WHERE key = ?1 ORDER BY used_at, rowid",
        )?;
        let rows = stmt.query_map(params![key], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (key, place_name, ip_address, used_at) = row?;
            result.push(UsageRecord {
                key,
                place_name,
                ip_address,
                used_at: decode_time(&used_at)?,
            });
        }
        Ok(result)
    }
}

impl KeyStore for SqliteKeyStore {
    fn find_active_key(&self, key: &str) -> StoreResult<Option<ActivationKey>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT key, is_used, expired, expires_at, created_by
                 FROM activation_keys WHERE key = ?1 AND is_used = 0 AND expired = 0
                 LIMIT 1",
                params![key],
                RawKey::from_row,
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(raw.map(RawKey::decode).transpose()?)
    }

    fn mark_expired(&self, key: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE activation_keys SET expired = 1 WHERE key = ?1",
                params![key],
            )
            .map_err(|e| StoreError::Write(e.to_string()))?;
        debug!(changed, "marked key expired");
        Ok(())
    }

    fn find_other_device_activation(
        &self,
        key: &str,
        hwid: &str,
    ) -> StoreResult<Option<KeyActivation>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT key, hwid, activated_at, last_check, first_val, second_val
                 FROM key_activations WHERE key = ?1 AND hwid != ?2
                 LIMIT 1",
                params![key, hwid],
                RawActivation::from_row,
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(raw.map(RawActivation::decode).transpose()?)
    }

    fn upsert_activation(&self, key: &str, hwid: &str, fields: ActivationFields) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO key_activations (key, hwid, activated_at, last_check, first_val, second_val)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (key, hwid) DO UPDATE SET
                 activated_at = excluded.activated_at,
                 last_check = excluded.last_check,
                 first_val = excluded.first_val,
                 second_val = excluded.second_val",
            params![
                key,
                hwid,
                encode_time(fields.activated_at),
                encode_time(fields.last_check),
                fields.first_val,
                fields.second_val,
            ],
        )
        .map_err(|e| StoreError::Write(format!("failed to upsert activation: {e}")))?;
        Ok(())
    }

    fn find_user_level(&self, user_id: &str) -> StoreResult<Option<i64>> {
        let conn = self.lock()?;
        let level = conn
            .query_row(
                "SELECT level FROM user_levels WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(level)
    }
}

impl UsageLog for SqliteKeyStore {
    fn record_usage(&self, record: &UsageRecord) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO key_usage_logs (id, key, place_name, ip_address, used_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid::Uuid::now_v7().to_string(),
                record.key,
                record.place_name,
                record.ip_address,
                encode_time(record.used_at),
            ],
        )
        .map_err(|e| StoreError::Write(format!("failed to record usage: {e}")))?;
        Ok(())
    }
}

// ── Row decoding ─────────────────────────────────────────────────

struct RawKey {
    key: String,
    is_used: bool,
    expired: bool,
    expires_at: Option<String>,
    created_by: String,
}

impl RawKey {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            is_used: row.get(1)?,
            expired: row.get(2)?,
            expires_at: row.get(3)?,
            created_by: row.get(4)?,
        })
    }

    fn decode(self) -> DbResult<ActivationKey> {
        Ok(ActivationKey {
            key: self.key,
            is_used: self.is_used,
            expired: self.expired,
            expires_at: self.expires_at.as_deref().map(decode_time).transpose()?,
            created_by: self.created_by,
        })
    }
}

struct RawActivation {
    key: String,
    hwid: String,
    activated_at: String,
    last_check: String,
    first_val: f64,
    second_val: f64,
}

impl RawActivation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            hwid: row.get(1)?,
            activated_at: row.get(2)?,
            last_check: row.get(3)?,
            first_val: row.get(4)?,
            second_val: row.get(5)?,
        })
    }

    fn decode(self) -> DbResult<KeyActivation> {
        Ok(KeyActivation {
            key: self.key,
            hwid: self.hwid,
            activated_at: decode_time(&self.activated_at)?,
            last_check: decode_time(&self.last_check)?,
            first_val: self.first_val,
            second_val: self.second_val,
        })
    }
}

fn encode_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode_time(s: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidData(format!("bad timestamp {s:?}: {e}")))
}
