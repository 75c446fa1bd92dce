//! SQLite-backed store.
//!
//! The attempts table is append-only at the schema level: triggers abort any
//! UPDATE or DELETE, so the log stays the source of truth.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use factdrill_core::error::{DrillError, DrillResult};
use factdrill_core::model::{Attempt, DisabledFactors, Learner, LearnerId, NewAttempt};
use factdrill_core::traits::{AttemptLog, LearnerDirectory};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS learners (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    avatar      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attempts (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    learner_id        INTEGER NOT NULL REFERENCES learners(id),
    factor_a          INTEGER NOT NULL,
    factor_b          INTEGER NOT NULL,
    submitted_answer  INTEGER NOT NULL,
    correct_answer    INTEGER NOT NULL,
    is_correct        INTEGER NOT NULL,
    elapsed_ms        INTEGER NOT NULL CHECK (elapsed_ms >= 0),
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_attempts_learner ON attempts(learner_id, id);

CREATE TRIGGER IF NOT EXISTS attempts_no_update
BEFORE UPDATE ON attempts
BEGIN
    SELECT RAISE(ABORT, 'attempts are append-only');
END;

CREATE TRIGGER IF NOT EXISTS attempts_no_delete
BEFORE DELETE ON attempts
BEGIN
    SELECT RAISE(ABORT, 'attempts are append-only');
END;

CREATE TABLE IF NOT EXISTS disabled_factors (
    learner_id  INTEGER NOT NULL REFERENCES learners(id),
    factor      INTEGER NOT NULL,
    PRIMARY KEY (learner_id, factor)
);
"#;

/// A [`factdrill_core::traits::DrillStore`] persisted in a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn persistence(e: rusqlite::Error) -> DrillError {
    DrillError::Persistence(e.to_string())
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation)
}

fn learner_from_row(row: &Row<'_>) -> rusqlite::Result<Learner> {
    Ok(Learner {
        id: row.get(0)?,
        name: row.get(1)?,
        avatar: row.get(2)?,
        created_at: row.get::<_, DateTime<Utc>>(3)?,
    })
}

fn attempt_from_row(row: &Row<'_>) -> rusqlite::Result<Attempt> {
    Ok(Attempt {
        id: row.get(0)?,
        learner_id: row.get(1)?,
        factor_a: row.get(2)?,
        factor_b: row.get(3)?,
        submitted_answer: row.get(4)?,
        correct_answer: row.get(5)?,
        is_correct: row.get(6)?,
        elapsed_ms: {
            let stored: i64 = row.get(7)?;
            u64::try_from(stored).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(7, stored))?
        },
        created_at: row.get(8)?,
    })
}

impl SqliteStore {
    /// Open (creating if needed) a database file and apply the schema.
    pub fn open(path: &Path) -> DrillResult<Self> {
        let conn = Connection::open(path).map_err(persistence)?;
        tracing::debug!("opened attempt log at {}", path.display());
        Self::init(conn)
    }

    /// A private database that vanishes when the store is dropped.
    pub fn open_in_memory() -> DrillResult<Self> {
        Self::init(Connection::open_in_memory().map_err(persistence)?)
    }

    fn init(conn: Connection) -> DrillResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(persistence)?;
        conn.execute_batch(SCHEMA).map_err(persistence)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DrillResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DrillError::Persistence(format!("connection lock poisoned: {e}")))
    }

    fn fetch_learner(conn: &Connection, id: LearnerId) -> DrillResult<Option<Learner>> {
        conn.query_row(
            "SELECT id, name, avatar, created_at FROM learners WHERE id = ?1",
            params![id],
            learner_from_row,
        )
        .optional()
        .map_err(persistence)
    }
}

impl AttemptLog for SqliteStore {
    fn append(&self, attempt: NewAttempt) -> DrillResult<Attempt> {
        let elapsed_ms = i64::try_from(attempt.elapsed_ms).map_err(|_| {
            DrillError::Validation(format!(
                "elapsed time {} ms does not fit in the log",
                attempt.elapsed_ms
            ))
        })?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO attempts (learner_id, factor_a, factor_b, submitted_answer, \
             correct_answer, is_correct, elapsed_ms, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                attempt.learner_id,
                attempt.factor_a,
                attempt.factor_b,
                attempt.submitted_answer,
                attempt.correct_answer,
                attempt.is_correct,
                elapsed_ms,
                attempt.created_at,
            ],
        )
        .map_err(persistence)?;
        let id = conn.last_insert_rowid();
        Ok(attempt.into_attempt(id))
    }

    fn scan(&self, learner_id: LearnerId) -> DrillResult<Vec<Attempt>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, learner_id, factor_a, factor_b, submitted_answer, correct_answer, \
                 is_correct, elapsed_ms, created_at \
                 FROM attempts WHERE learner_id = ?1 ORDER BY id",
            )
            .map_err(persistence)?;
        let attempts = stmt
            .query_map(params![learner_id], attempt_from_row)
            .map_err(persistence)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(persistence)?;
        Ok(attempts)
    }
}

impl LearnerDirectory for SqliteStore {
    fn create_learner(&self, name: &str, avatar: &str) -> DrillResult<Learner> {
        let conn = self.lock()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO learners (name, avatar, created_at) VALUES (?1, ?2, ?3)",
            params![name, avatar, created_at],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                DrillError::Validation("learner name already taken".into())
            } else {
                persistence(e)
            }
        })?;
        Ok(Learner {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            avatar: avatar.to_string(),
            created_at,
        })
    }

    fn learner(&self, id: LearnerId) -> DrillResult<Option<Learner>> {
        let conn = self.lock()?;
        Self::fetch_learner(&conn, id)
    }

    fn learners(&self) -> DrillResult<Vec<Learner>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, avatar, created_at FROM learners ORDER BY id")
            .map_err(persistence)?;
        let learners = stmt
            .query_map([], learner_from_row)
            .map_err(persistence)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(persistence)?;
        Ok(learners)
    }

    fn update_learner(&self, id: LearnerId, name: &str, avatar: &str) -> DrillResult<Learner> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE learners SET name = ?1, avatar = ?2 WHERE id = ?3",
                params![name, avatar, id],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    DrillError::Validation("learner name already taken".into())
                } else {
                    persistence(e)
                }
            })?;
        if changed == 0 {
            return Err(DrillError::LearnerNotFound(id));
        }
        Self::fetch_learner(&conn, id)?.ok_or(DrillError::LearnerNotFound(id))
    }

    fn disabled_factors(&self, learner_id: LearnerId) -> DrillResult<DisabledFactors> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT factor FROM disabled_factors WHERE learner_id = ?1 ORDER BY factor")
            .map_err(persistence)?;
        let factors = stmt
            .query_map(params![learner_id], |row| row.get::<_, u8>(0))
            .map_err(persistence)?
            .collect::<rusqlite::Result<DisabledFactors>>()
            .map_err(persistence)?;
        Ok(factors)
    }

    fn set_factor_disabled(
        &self,
        learner_id: LearnerId,
        factor: u8,
        disabled: bool,
    ) -> DrillResult<()> {
        let conn = self.lock()?;
        let sql = if disabled {
            "INSERT OR IGNORE INTO disabled_factors (learner_id, factor) VALUES (?1, ?2)"
        } else {
            "DELETE FROM disabled_factors WHERE learner_id = ?1 AND factor = ?2"
        };
        conn.execute(sql, params![learner_id, factor])
            .map_err(persistence)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factdrill_core::model::Fact;

    fn store_with_learner() -> (SqliteStore, Learner) {
        let store = SqliteStore::open_in_memory().unwrap();
        let learner = store.create_learner("Ada", "owl").unwrap();
        (store, learner)
    }

    #[test]
    fn append_and_scan_round_trip_fields() {
        let (store, learner) = store_with_learner();
        let first = store
            .append(NewAttempt::new(learner.id, Fact::new(7, 3), 21, 2100, Utc::now()))
            .unwrap();
        let second = store
            .append(NewAttempt::new(learner.id, Fact::new(3, 7), 20, 6400, Utc::now()))
            .unwrap();
        assert!(second.id > first.id);

        let log = store.scan(learner.id).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].fact(), Fact::new(7, 3));
        assert!(log[0].is_correct);
        assert_eq!(log[1].fact(), Fact::new(3, 7));
        assert_eq!(log[1].correct_answer, 21);
        assert!(!log[1].is_correct);
        assert_eq!(log[1].elapsed_ms, 6400);
    }

    #[test]
    fn elapsed_time_is_stored_exactly_or_rejected() {
        let (store, learner) = store_with_learner();
        let too_long = NewAttempt::new(learner.id, Fact::new(3, 4), 12, 1 << 63, Utc::now());
        assert!(matches!(
            store.append(too_long),
            Err(DrillError::Validation(_))
        ));
        assert!(store.scan(learner.id).unwrap().is_empty());

        let longest = i64::MAX as u64;
        store
            .append(NewAttempt::new(learner.id, Fact::new(3, 4), 12, longest, Utc::now()))
            .unwrap();
        let log = store.scan(learner.id).unwrap();
        assert_eq!(log[0].elapsed_ms, longest);
        assert!(factdrill_core::coverage::is_problematic(&log[0]));
    }

    #[test]
    fn attempts_cannot_be_rewritten() {
        let (store, learner) = store_with_learner();
        store
            .append(NewAttempt::new(learner.id, Fact::new(2, 2), 5, 100, Utc::now()))
            .unwrap();
        let conn = store.lock().unwrap();
        assert!(conn
            .execute("UPDATE attempts SET is_correct = 1", [])
            .is_err());
        assert!(conn.execute("DELETE FROM attempts", []).is_err());
    }

    #[test]
    fn append_for_unknown_learner_is_persistence_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.append(NewAttempt::new(77, Fact::new(1, 1), 1, 100, Utc::now()));
        assert!(matches!(result, Err(DrillError::Persistence(_))));
        assert!(store.scan(77).unwrap().is_empty());
    }

    #[test]
    fn duplicate_learner_name_is_validation_error() {
        let (store, learner) = store_with_learner();
        assert!(matches!(
            store.create_learner("Ada", "cat"),
            Err(DrillError::Validation(_))
        ));
        let bo = store.create_learner("Bo", "cat").unwrap();
        assert!(matches!(
            store.update_learner(bo.id, "Ada", "cat"),
            Err(DrillError::Validation(_))
        ));
        let renamed = store.update_learner(learner.id, "Ada L.", "fox").unwrap();
        assert_eq!(renamed.name, "Ada L.");
        assert_eq!(renamed.avatar, "fox");
        assert_eq!(store.learners().unwrap().len(), 2);
    }

    #[test]
    fn update_unknown_learner() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.update_learner(3, "Zed", "smile"),
            Err(DrillError::LearnerNotFound(3))
        ));
        assert_eq!(store.learner(3).unwrap(), None);
    }

    #[test]
    fn disabled_factor_membership() {
        let (store, learner) = store_with_learner();
        store.set_factor_disabled(learner.id, 10, true).unwrap();
        store.set_factor_disabled(learner.id, 10, true).unwrap();
        store.set_factor_disabled(learner.id, 0, true).unwrap();
        let disabled = store.disabled_factors(learner.id).unwrap();
        assert_eq!(disabled.iter().collect::<Vec<_>>(), vec![0, 10]);

        store.set_factor_disabled(learner.id, 10, false).unwrap();
        store.set_factor_disabled(learner.id, 5, false).unwrap();
        let disabled = store.disabled_factors(learner.id).unwrap();
        assert_eq!(disabled.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drill.db");
        let learner_id = {
            let store = SqliteStore::open(&path).unwrap();
            let learner = store.create_learner("Ada", "owl").unwrap();
            store
                .append(NewAttempt::new(learner.id, Fact::new(9, 9), 81, 3000, Utc::now()))
                .unwrap();
            store.set_factor_disabled(learner.id, 1, true).unwrap();
            learner.id
        };

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.learner(learner_id).unwrap().unwrap().name, "Ada");
        assert_eq!(store.scan(learner_id).unwrap().len(), 1);
        assert!(store.disabled_factors(learner_id).unwrap().contains(1));
    }
}
