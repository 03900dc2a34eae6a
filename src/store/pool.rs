//! A small SQLite connection pool
//!
//! Connections are opened on demand and up to `max_idle` of them are kept
//! for reuse. Every connection runs in WAL mode with a busy timeout, so
//! concurrent writers queue on SQLite's own lock instead of failing.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

use crate::core::sync::handle_mutex_poison;

use super::error::{StoreError, StoreResult};

pub(crate) struct ConnectionPool {
    path: PathBuf,
    busy_timeout: Duration,
    max_idle: usize,
    idle: Mutex<Vec<Connection>>,
}

impl ConnectionPool {
    pub(crate) fn new(path: &Path, busy_timeout: Duration, max_idle: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            busy_timeout,
            max_idle,
            idle: Mutex::new(Vec::with_capacity(max_idle)),
        }
    }

    fn connect(&self) -> StoreResult<Connection> {
        let connection_error = |source| StoreError::Connection {
            path: self.path.display().to_string(),
            source,
        };

        let conn = Connection::open(&self.path).map_err(connection_error)?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(connection_error)?;
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(connection_error)?;
        if !mode.eq_ignore_ascii_case("wal") {
            log::debug!("journal mode for {} is {}", self.path.display(), mode);
        }
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(connection_error)?;
        Ok(conn)
    }

    /// Take an idle connection or open a new one
    pub(crate) fn acquire(self: &Arc<Self>) -> StoreResult<PooledConnection> {
        let reused = {
            let mut idle = handle_mutex_poison(self.idle.lock(), |message| StoreError::Pool {
                message,
            })?;
            idle.pop()
        };

        let conn = match reused {
            Some(conn) => conn,
            None => self.connect()?,
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(self),
        })
    }

    fn release(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(conn);
            }
        }
    }

    pub(crate) fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

/// A connection on loan from the pool; returned on drop
pub(crate) struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<ConnectionPool>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only taken in drop
        self.conn.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            // A connection left inside a transaction must not be reused
            if conn.is_autocommit() {
                self.pool.release(conn);
            }
        }
    }
}
