// SQLite persistence: one JSON blob per key, overwritten on every change.
//
// Keys: `user`, `exercises`, `journal`, `shopping`, and `log_YYYY-MM-DD` for
// each day's log.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::model::{DailyLog, ExerciseEntry, JournalEntry, ShoppingItem, UserProfile};
use crate::tracker::{Section, Tracker};

const PROFILE_KEY: &str = "user";
const EXERCISES_KEY: &str = "exercises";
const JOURNAL_KEY: &str = "journal";
const SHOPPING_KEY: &str = "shopping";
const DAILY_LOG_PREFIX: &str = "log_";

/// Key/value store backed by a single SQLite table.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the store at `path`. Pass `":memory:"` for an
    /// ephemeral store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create store directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {}", path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set store pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );",
        )
        .context("failed to create store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection. Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Raw blobs
    // ------------------------------------------------------------------

    /// Serialize `value` and overwrite whatever is stored under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize `{key}`"))?;
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, json],
        )
        .with_context(|| format!("failed to save `{key}`"))?;
        Ok(())
    }

    /// Load and deserialize the blob under `key`. `None` if absent.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .context("failed to prepare load query")?;
        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .with_context(|| format!("failed to query `{key}`"))?;

        match rows.next() {
            Some(row) => {
                let json = row.with_context(|| format!("failed to read `{key}`"))?;
                let value = serde_json::from_str(&json)
                    .with_context(|| format!("failed to deserialize `{key}`"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Load `key`, logging and falling back to `None` when the blob is
    /// corrupt.
    fn load_or_warn<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load(key) {
            Ok(v) => Ok(v),
            Err(e) if is_decode_error(&e) => {
                warn!("Discarding unreadable `{}`: {:#}", key, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Typed sections
    // ------------------------------------------------------------------

    pub fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.load_or_warn(PROFILE_KEY)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.save(PROFILE_KEY, profile)
    }

    pub fn load_exercises(&self) -> Result<Vec<ExerciseEntry>> {
        Ok(self.load_or_warn(EXERCISES_KEY)?.unwrap_or_default())
    }

    pub fn save_exercises(&self, exercises: &[ExerciseEntry]) -> Result<()> {
        self.save(EXERCISES_KEY, exercises)
    }

    pub fn load_journal(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.load_or_warn(JOURNAL_KEY)?.unwrap_or_default())
    }

    pub fn save_journal(&self, journal: &[JournalEntry]) -> Result<()> {
        self.save(JOURNAL_KEY, journal)
    }

    pub fn load_shopping(&self) -> Result<Vec<ShoppingItem>> {
        Ok(self.load_or_warn(SHOPPING_KEY)?.unwrap_or_default())
    }

    pub fn save_shopping(&self, items: &[ShoppingItem]) -> Result<()> {
        self.save(SHOPPING_KEY, items)
    }

    pub fn load_daily_log(&self, date: NaiveDate) -> Result<Option<DailyLog>> {
        self.load_or_warn(&daily_log_key(date))
    }

    pub fn save_daily_log(&self, log: &DailyLog) -> Result<()> {
        self.save(&daily_log_key(log.date), log)
    }

    /// Stored daily logs for the `days` calendar days ending on `today`,
    /// newest first. Days without a stored log are skipped.
    pub fn load_daily_logs(&self, today: NaiveDate, days: i64) -> Result<Vec<DailyLog>> {
        let mut logs = Vec::new();
        for offset in 0..days {
            let date = today - Duration::days(offset);
            if let Some(log) = self.load_daily_log(date)? {
                logs.push(log);
            }
        }
        Ok(logs)
    }

    // ------------------------------------------------------------------
    // Whole tracker
    // ------------------------------------------------------------------

    /// Assemble a tracker from the stored sections. Missing sections take
    /// their defaults; today's calories burned are recomputed from the
    /// stored exercises.
    pub fn load_tracker(&self, today: NaiveDate) -> Result<Tracker> {
        let mut tracker = Tracker::new(today);
        if let Some(profile) = self.load_profile()? {
            tracker.profile = profile;
        }
        tracker.exercises = self.load_exercises()?;
        tracker.journal = self.load_journal()?;
        tracker.shopping = self.load_shopping()?;
        if let Some(log) = self.load_daily_log(today)? {
            tracker.daily_log = log;
        }
        tracker.refresh_calories_burned();
        Ok(tracker)
    }

    /// Overwrite one section of `tracker`.
    pub fn save_section(&self, tracker: &Tracker, section: Section) -> Result<()> {
        match section {
            Section::Profile => self.save_profile(&tracker.profile),
            Section::DailyLog => self.save_daily_log(&tracker.daily_log),
            Section::Exercises => self.save_exercises(&tracker.exercises),
            Section::Journal => self.save_journal(&tracker.journal),
            Section::Shopping => self.save_shopping(&tracker.shopping),
        }
    }
}

pub fn daily_log_key(date: NaiveDate) -> String {
    format!("{DAILY_LOG_PREFIX}{}", date.format("%Y-%m-%d"))
}

fn is_decode_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<serde_json::Error>())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
