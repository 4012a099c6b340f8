//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use phonebook_core::queries::search::fold;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};

use crate::errors::{from_rusqlite, io_error, Result};

/// How long a statement waits on a locked database before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Name of the SQL function that folds case the same way the in-memory store does
pub const LOWER_FN: &str = "phonebook_lower";

/// Open a SQLite database at the given path, creating parent directories
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("open_database", e))?;
    }
    let conn = Connection::open(path).map_err(from_rusqlite)?;
    configure(&conn, true)?;
    Ok(conn)
}

/// Open an in-memory SQLite database
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    configure(&conn, false)?;
    Ok(conn)
}

static SHARED_MEMORY_SEQ: AtomicU64 = AtomicU64::new(0);

/// Where a store's connections point
///
/// A store holds one writer connection and opens reader connections on
/// demand, so every target must be reachable from more than one connection.
/// In-memory databases therefore use SQLite's shared cache under a
/// process-unique URI; the database lives as long as any connection to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    SharedMemory(String),
}

impl DbTarget {
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        DbTarget::File(path.as_ref().to_path_buf())
    }

    /// A new, empty in-memory database no other target refers to
    pub fn shared_memory() -> Self {
        let seq = SHARED_MEMORY_SEQ.fetch_add(1, Ordering::Relaxed);
        DbTarget::SharedMemory(format!(
            "file:phonebook-mem-{}-{}?mode=memory&cache=shared",
            std::process::id(),
            seq
        ))
    }

    /// Open the read-write connection used for migrations and mutations
    pub fn open_writer(&self) -> Result<Connection> {
        match self {
            DbTarget::File(path) => open(path),
            DbTarget::SharedMemory(uri) => {
                let conn = Connection::open_with_flags(
                    uri,
                    OpenFlags::SQLITE_OPEN_READ_WRITE
                        | OpenFlags::SQLITE_OPEN_CREATE
                        | OpenFlags::SQLITE_OPEN_URI
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(from_rusqlite)?;
                configure(&conn, false)?;
                Ok(conn)
            }
        }
    }

    /// Open a connection used only for queries
    ///
    /// File readers are read-only and rely on WAL to run alongside the
    /// writer. Shared-cache readers use `read_uncommitted` so they take no
    /// table locks; every write is a single statement or a transaction that
    /// commits unless it fails before writing.
    pub fn open_reader(&self) -> Result<Connection> {
        match self {
            DbTarget::File(path) => {
                let conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(from_rusqlite)?;
                conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;
                register_functions(&conn)?;
                Ok(conn)
            }
            DbTarget::SharedMemory(uri) => {
                let conn = Connection::open_with_flags(
                    uri,
                    OpenFlags::SQLITE_OPEN_READ_WRITE
                        | OpenFlags::SQLITE_OPEN_URI
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(from_rusqlite)?;
                conn.pragma_update(None, "read_uncommitted", "ON")
                    .map_err(from_rusqlite)?;
                conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;
                register_functions(&conn)?;
                Ok(conn)
            }
        }
    }
}

/// Apply connection settings
///
/// WAL is only requested for file-backed databases; in-memory databases
/// always report `memory`.
pub fn configure(conn: &Connection, file_backed: bool) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    if file_backed {
        // journal_mode answers with the resulting mode, so read the row back
        let _mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
    }

    conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;
    register_functions(conn)?;

    Ok(())
}

/// Register `phonebook_lower(text)`; SQLite's built-in `lower()` is ASCII-only
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| fold(&v)))
        },
    )
    .map_err(from_rusqlite)
}
