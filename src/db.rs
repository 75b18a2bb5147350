//! Database module for Quizlexa
//!
//! Remembers each user's last used set across sessions.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
    #[error("Invalid timestamp for {0}")]
    InvalidTimestamp(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.lock()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== User Data Operations ====================

    /// Fetch a user's record
    pub fn get_user_data(&self, customer_id: &str) -> DbResult<Option<UserData>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT customer_id, data, updated_at FROM user_data WHERE customer_id = ?1",
                params![customer_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(customer_id, data, updated_at)| {
            let updated_at = parse_timestamp(&customer_id, &updated_at)?;
            Ok(UserData {
                customer_id,
                data,
                updated_at,
            })
        })
        .transpose()
    }

    /// Last used set token, if the user has one
    pub fn get_last_set(&self, customer_id: &str) -> DbResult<Option<String>> {
        Ok(self.get_user_data(customer_id)?.map(|u| u.data))
    }

    /// Insert or replace the user's last used set token
    pub fn put_last_set(&self, customer_id: &str, token: &str) -> DbResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO user_data (customer_id, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(customer_id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![customer_id, token, now],
        )?;
        Ok(())
    }
}

fn parse_timestamp(customer_id: &str, value: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp(customer_id.to_string()))
}
