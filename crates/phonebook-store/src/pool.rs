//! Reader connection pool
//!
//! Queries check a connection out, use it, and hand it back on drop. The
//! idle list lock is only held to push or pop, so concurrent reads never
//! wait on each other; when no idle connection is available a new one is
//! opened.

use std::ops::Deref;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::db::DbTarget;
use crate::errors::Result;

/// Idle reader connections kept around for reuse
pub const MAX_IDLE_READERS: usize = 8;

pub struct ReadPool {
    target: DbTarget,
    idle: Mutex<Vec<Connection>>,
}

impl ReadPool {
    pub fn new(target: DbTarget) -> Self {
        Self {
            target,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn target(&self) -> &DbTarget {
        &self.target
    }

    /// Check out a reader connection
    ///
    /// # Errors
    /// Fails when a new connection has to be opened and SQLite refuses it.
    pub fn get(&self) -> Result<PooledConnection<'_>> {
        let reused = self.idle.lock().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                tracing::debug!("opening reader connection");
                self.target.open_reader()?
            }
        };
        Ok(PooledConnection {
            pool: self,
            conn: Some(conn),
        })
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    fn put_back(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if idle.len() < MAX_IDLE_READERS {
            idle.push(conn);
        }
    }
}

/// A checked-out reader; returns to the pool when dropped
pub struct PooledConnection<'a> {
    pool: &'a ReadPool,
    conn: Option<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only taken in drop
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn);
        }
    }
}
