use chrono::{Duration, NaiveDate};
use rusqlite::{params, OptionalExtension, Transaction};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{PlannerEntry, PlannerMap, PlannerRecord};
use crate::pipeline::dates::{day_key, expand_date_keys, MAX_EXPANDED_DAYS};
use crate::pipeline::dedup::is_duplicate;

use super::schema::SCHEMA;

/// Row in `kv_store` that holds the planner blob.
pub const PLANNER_KEY: &str = "planner";
/// Day keys older than this many days before today are pruned.
pub const RETENTION_DAYS: i64 = 7;

/// Durable planner: a date-keyed map stored as one JSON value.
///
/// Every operation is a single read-modify-write transaction, so concurrent
/// callers never lose each other's updates.
pub struct PlannerStore {
    conn: Connection,
}

impl PlannerStore {
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Runs `f` against the pruned planner inside one transaction and
    /// writes the result back.
    async fn transact<F, R>(&self, today: NaiveDate, f: F) -> Result<R>
    where
        F: FnOnce(&mut PlannerMap) -> R + Send + 'static,
        R: Send + 'static,
    {
        let result = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut planner = read_planner(&tx)?;
                let pruned = prune_map(&mut planner, today);
                if pruned > 0 {
                    debug!("Pruned {} planner days", pruned);
                }
                let result = f(&mut planner);
                write_planner(&tx, &planner)?;
                tx.commit()?;
                Ok(result)
            })
            .await?;
        Ok(result)
    }

    /// The whole planner, pruned relative to `today`.
    pub async fn load(&self, today: NaiveDate) -> Result<PlannerMap> {
        self.transact(today, |planner| planner.clone()).await
    }

    pub async fn day(&self, date_key: &str, today: NaiveDate) -> Result<Vec<PlannerRecord>> {
        let date_key = date_key.to_string();
        self.transact(today, move |planner| {
            planner.get(&date_key).cloned().unwrap_or_default()
        })
        .await
    }

    /// Adds each entry under every day its date covers, skipping days that
    /// already hold the same id or a near-identical title. Returns how many
    /// records were added.
    pub async fn merge(&self, entries: Vec<PlannerEntry>, today: NaiveDate) -> Result<usize> {
        self.transact(today, move |planner| {
            let mut added = 0;
            for entry in entries {
                for key in expand_date_keys(&entry.date, MAX_EXPANDED_DAYS) {
                    let day = planner.entry(key).or_default();
                    if is_duplicate(day, &entry.record.id, &entry.record.title) {
                        continue;
                    }
                    day.push(entry.record.clone());
                    added += 1;
                }
            }
            // merged days may already be out of the retention window
            prune_map(planner, today);
            added
        })
        .await
    }

    /// Removes one record from one day. Returns whether anything was removed.
    pub async fn remove(&self, date_key: &str, id: &str, today: NaiveDate) -> Result<bool> {
        let date_key = date_key.to_string();
        let id = id.to_string();
        self.transact(today, move |planner| {
            let Some(day) = planner.get_mut(&date_key) else {
                return false;
            };
            let before = day.len();
            day.retain(|r| r.id != id);
            let removed = day.len() != before;
            if day.is_empty() {
                planner.remove(&date_key);
            }
            removed
        })
        .await
    }

    /// Returns the number of day keys dropped.
    pub async fn prune(&self, today: NaiveDate) -> Result<usize> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut planner = read_planner(&tx)?;
                let pruned = prune_map(&mut planner, today);
                write_planner(&tx, &planner)?;
                tx.commit()?;
                Ok(pruned)
            })
            .await
            .map_err(Into::into)
    }

    pub async fn clear(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", params![PLANNER_KEY])?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn read_planner(tx: &Transaction<'_>) -> std::result::Result<PlannerMap, tokio_rusqlite::Error> {
    let value: Option<String> = tx
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![PLANNER_KEY],
            |row| row.get(0),
        )
        .optional()?;

    let Some(value) = value else {
        return Ok(PlannerMap::new());
    };
    match serde_json::from_str(&value) {
        Ok(planner) => Ok(planner),
        Err(e) => {
            warn!("Discarding unreadable planner blob: {}", e);
            Ok(PlannerMap::new())
        }
    }
}

fn write_planner(
    tx: &Transaction<'_>,
    planner: &PlannerMap,
) -> std::result::Result<(), tokio_rusqlite::Error> {
    let value =
        serde_json::to_string(planner).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
    tx.execute(
        r#"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
           ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at"#,
        params![PLANNER_KEY, value],
    )?;
    Ok(())
}

/// Drops day keys strictly older than `today - RETENTION_DAYS`. Keys that
/// are not dates are dropped as well.
pub fn prune_map(planner: &mut PlannerMap, today: NaiveDate) -> usize {
    let cutoff = day_key(today - Duration::days(RETENTION_DAYS));
    let before = planner.len();
    planner.retain(|key, records| {
        !records.is_empty()
            && NaiveDate::parse_from_str(key, "%Y-%m-%d").is_ok()
            && key.as_str() >= cutoff.as_str()
    });
    before - planner.len()
}
