//! In-memory SQLite journal.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods and never executes SQL directly.
//! Nothing is written to disk, and `prune` keeps the journal bounded
//! for as long as the process runs.

use crate::{error::DashResult, event::EventLogEntry, types::Tick};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    pub fn in_memory() -> DashResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DashResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str, as_of: &str) -> DashResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, as_of) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, as_of],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> DashResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, tick, source, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.tick as i64,
                entry.source,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_tick(&self, run_id: &str, tick: Tick) -> DashResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, tick, source, event_type, payload
             FROM event_log WHERE run_id = ?1 AND tick = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, tick as i64], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    tick:       row.get::<_, i64>(2)? as u64,
                    source:     row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str, event_type: &str) -> DashResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
            params![run_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Snapshot checkpoints ───────────────────────────────────

    pub fn save_snapshot(&self, run_id: &str, tick: Tick, state_json: &str) -> DashResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (run_id, tick, state_json) VALUES (?1, ?2, ?3)",
            params![run_id, tick as i64, state_json],
        )?;
        Ok(())
    }

    pub fn latest_snapshot_before(
        &self,
        run_id: &str,
        tick: Tick,
    ) -> DashResult<Option<(Tick, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT tick, state_json FROM snapshot
                 WHERE run_id = ?1 AND tick <= ?2
                 ORDER BY tick DESC LIMIT 1",
                params![run_id, tick as i64],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }

    // ── Retention ──────────────────────────────────────────────

    /// Drop events older than `keep_from` (tick 0 build events stay)
    /// and all but the `keep_checkpoints` most recent checkpoints.
    pub fn prune(&self, run_id: &str, keep_from: Tick, keep_checkpoints: u64) -> DashResult<()> {
        let events = self.conn.execute(
            "DELETE FROM event_log WHERE run_id = ?1 AND tick > 0 AND tick < ?2",
            params![run_id, keep_from as i64],
        )?;
        let checkpoints = self.conn.execute(
            "DELETE FROM snapshot WHERE run_id = ?1 AND tick NOT IN (
                 SELECT tick FROM snapshot WHERE run_id = ?1
                 ORDER BY tick DESC LIMIT ?2)",
            params![run_id, keep_checkpoints as i64],
        )?;
        log::debug!("Pruned {events} events and {checkpoints} checkpoints before tick {keep_from}");
        Ok(())
    }

    /// (event rows, checkpoint rows) currently held for a run.
    pub fn journal_size(&self, run_id: &str) -> DashResult<(i64, i64)> {
        let events = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        let checkpoints = self.conn.query_row(
            "SELECT COUNT(*) FROM snapshot WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok((events, checkpoints))
    }
}
