//! Bounded SQLite connection pool.
//!
//! The pool is an explicitly owned object: callers build one, `initialize()` it
//! at startup, share it behind an `Arc`, and `shutdown()` it on exit. A
//! semaphore bounds the number of connections handed out; connections are
//! opened lazily up to that bound and returned to the idle list when their
//! [`PooledConnection`] guard drops.

use crate::error::{PlacementError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

const NOT_INITIALIZED: &str = "Database pool not initialized. Call initialize() first.";

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// Upper bound on connections handed out at once.
    pub max_connections: usize,
    /// Open connections with `PRAGMA query_only = ON`.
    pub read_only: bool,
}

impl PoolConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 10,
            read_only: true,
        }
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    fn open(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| {
            PlacementError::Config(format!(
                "Cannot open placements database at {:?}: {}",
                self.path, e
            ))
        })?;
        if self.read_only {
            conn.execute_batch("PRAGMA query_only = ON;")?;
        }
        Ok(conn)
    }
}

/// Point-in-time view of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatus {
    pub initialized: bool,
    pub capacity: usize,
    /// Slots not currently held by a guard.
    pub available: usize,
    /// Open connections waiting in the idle list.
    pub idle: usize,
}

struct PoolInner {
    config: PoolConfig,
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    closed: AtomicBool,
}

impl PoolInner {
    fn take_idle(&self) -> Option<Connection> {
        self.idle.lock().ok().and_then(|mut idle| idle.pop())
    }

    fn give_back(&self, conn: Connection) {
        if self.closed.load(Ordering::Acquire) {
            drop(conn);
            return;
        }
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(conn);
        }
    }
}

/// Process-lifetime pool of placements database connections.
pub struct ConnectionPool {
    config: PoolConfig,
    inner: RwLock<Option<Arc<PoolInner>>>,
}

impl ConnectionPool {
    /// Create an uninitialized pool.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Open the pool. Calling this on an already-initialized pool is a no-op.
    pub fn initialize(&self) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| PlacementError::Pool(format!("Failed to acquire lock: {}", e)))?;

        if inner.is_some() {
            debug!("Connection pool already initialized");
            return Ok(());
        }

        if self.config.max_connections == 0 {
            return Err(PlacementError::Config(
                "Connection pool capacity must be at least 1".to_string(),
            ));
        }

        // Open one connection up front so a bad path fails at startup.
        let first = self.config.open()?;

        *inner = Some(Arc::new(PoolInner {
            config: self.config.clone(),
            idle: Mutex::new(vec![first]),
            permits: Arc::new(Semaphore::new(self.config.max_connections)),
            closed: AtomicBool::new(false),
        }));

        info!(
            "Database connection pool initialized ({:?}, capacity {})",
            self.config.path, self.config.max_connections
        );
        Ok(())
    }

    fn current(&self) -> Result<Arc<PoolInner>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| PlacementError::Pool(format!("Failed to acquire lock: {}", e)))?;
        inner
            .clone()
            .ok_or_else(|| PlacementError::Config(NOT_INITIALIZED.to_string()))
    }

    /// Wait for a free slot and check out a connection.
    ///
    /// The connection goes back to the pool when the returned guard drops,
    /// including when the owning task is cancelled or panics.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let inner = self.current()?;

        let permit = inner
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PlacementError::Config(NOT_INITIALIZED.to_string()))?;

        let conn = match inner.take_idle() {
            Some(conn) => conn,
            None => {
                debug!("Opening new pooled connection");
                inner.config.open()?
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            inner,
            _permit: permit,
        })
    }

    /// Close the pool. Waiting and future `acquire()` calls fail; connections
    /// still checked out are closed when their guards drop.
    pub fn shutdown(&self) {
        let taken = match self.inner.write() {
            Ok(mut inner) => inner.take(),
            Err(e) => {
                warn!("Connection pool lock poisoned during shutdown: {}", e);
                return;
            }
        };

        if let Some(inner) = taken {
            inner.closed.store(true, Ordering::Release);
            inner.permits.close();
            let drained = inner
                .idle
                .lock()
                .map(|mut idle| idle.drain(..).count())
                .unwrap_or(0);
            info!("Database connection pool closed ({} idle connections)", drained);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.read().map(|inner| inner.is_some()).unwrap_or(false)
    }

    pub fn status(&self) -> PoolStatus {
        match self.current() {
            Ok(inner) => PoolStatus {
                initialized: true,
                capacity: inner.config.max_connections,
                available: inner.permits.available_permits(),
                idle: inner.idle.lock().map(|idle| idle.len()).unwrap_or(0),
            },
            Err(_) => PoolStatus {
                initialized: false,
                capacity: self.config.max_connections,
                available: 0,
                idle: 0,
            },
        }
    }
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A checked-out connection. Derefs to [`rusqlite::Connection`].
pub struct PooledConnection {
    conn: Option<Connection>,
    inner: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection").finish_non_exhaustive()
    }
}

impl std::ops::Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        // Only `drop` takes the connection out.
        self.conn.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.inner.give_back(conn);
        }
        // `_permit` is released after the connection is back in the idle list.
    }
}
