//! Refresh clock: owns tick state, pause, and the refresh schedule.
//!
//! The clock never sleeps. An external scheduler calls `poll(now)`
//! whenever it likes; the clock answers whether a refresh is due.
//!
//! Overrun policy: drop-and-resync. If several refresh periods elapsed
//! since the deadline, one tick runs, the rest are counted as skipped,
//! and the next deadline is `now + interval`. Ticks never queue up.
//! Time spent paused is never counted as skipped.

use crate::types::{RunId, Tick};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:        RunId,
    pub current_tick:  Tick,
    pub paused:        bool,
    pub interval_secs: u64,
    next_due:          Option<DateTime<Utc>>,
    skipped_total:     u64,
}

/// Outcome of polling the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// Nothing to do yet (or paused).
    Idle,
    /// Run one tick. `skipped` periods were dropped.
    Due { skipped: u64 },
}

impl SimClock {
    pub fn new(run_id: RunId, interval_secs: u64) -> Self {
        Self {
            run_id,
            current_tick: 0,
            paused: false,
            interval_secs: interval_secs.max(1),
            next_due: None,
            skipped_total: 0,
        }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Periods spent paused are not overruns: the schedule is re-armed
    /// by the next poll, as on a fresh clock.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_due = None;
        }
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// Total refresh periods dropped since the clock started.
    pub fn skipped_total(&self) -> u64 {
        self.skipped_total
    }

    fn interval(&self) -> Duration {
        Duration::seconds(self.interval_secs as i64)
    }

    /// Decide whether a scheduled refresh is due at `now`. The first
    /// poll arms the schedule without ticking.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Poll {
        let Some(due) = self.next_due else {
            self.next_due = Some(now + self.interval());
            return Poll::Idle;
        };
        if self.paused || now < due {
            return Poll::Idle;
        }
        let overdue = (now - due).num_seconds().max(0) as u64;
        let skipped = overdue / self.interval_secs;
        self.skipped_total += skipped;
        self.next_due = Some(now + self.interval());
        Poll::Due { skipped }
    }
}
