//! Score sources for hints and the automated player.

use std::path::Path;
use std::sync::Mutex;

use morris_core::{Oracle, ScoreTable, StateCode};
use rusqlite::{Connection, OptionalExtension};

/// SQLite-backed tablebase written by `export_sqlite`.
pub struct Tablebase {
    conn: Mutex<Connection>,
}

impl Tablebase {
    pub fn load(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "query_only", true)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Tablebase {
            conn: Mutex::new(conn),
        }
    }

    /// Score of `code`, or None if absent (or the query failed).
    pub fn lookup(&self, code: StateCode) -> Option<f64> {
        let conn = self.conn.lock().unwrap();
        let result = conn
            .query_row(
                "SELECT score FROM positions WHERE code = ?1",
                [code.value()],
                |row| row.get::<_, f64>(0),
            )
            .optional();
        match result {
            Ok(score) => score,
            Err(err) => {
                tracing::warn!(%code, error = %err, "tablebase lookup failed");
                None
            }
        }
    }
}

impl Oracle for Tablebase {
    fn score(&self, code: StateCode) -> Option<f64> {
        self.lookup(code)
    }
}

/// Where scores come from.
pub enum Scores {
    Sqlite(Tablebase),
    Memory(ScoreTable),
}

impl Scores {
    pub fn describe(&self) -> String {
        match self {
            Scores::Sqlite(_) => "sqlite tablebase".to_string(),
            Scores::Memory(table) => format!("in-memory table ({} entries)", table.len()),
        }
    }
}

impl Oracle for Scores {
    fn score(&self, code: StateCode) -> Option<f64> {
        match self {
            Scores::Sqlite(tablebase) => tablebase.score(code),
            Scores::Memory(table) => table.score(code),
        }
    }
}
