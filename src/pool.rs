//! Fixed-size connection pool.
//!
//! Connections are opened up front and parked in a bounded
//! `crossbeam_channel`. [`PgPool::acquire`] takes one out, waiting at most
//! the configured timeout, and the returned [`PooledConnection`] puts it back
//! on drop. A connection that fails its health probe on checkout is replaced.

use crate::config::DatabaseConfig;
use crate::connection::{connect, ConnectionError};
use crate::executor::PgExecutor;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

#[derive(Debug)]
pub enum PoolError {
    /// No connection became free within the timeout
    Timeout(Duration),
    /// Opening or re-opening a connection failed
    Connection(ConnectionError),
    /// Pool configured with zero connections
    Empty,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Timeout(d) => write!(f, "Timed out after {d:?} waiting for a connection"),
            PoolError::Connection(e) => write!(f, "Pool connection error: {e}"),
            PoolError::Empty => write!(f, "Pool must hold at least one connection"),
        }
    }
}

impl std::error::Error for PoolError {}

impl From<ConnectionError> for PoolError {
    fn from(err: ConnectionError) -> Self {
        PoolError::Connection(err)
    }
}

struct Slots {
    url: String,
    tx: Sender<PgExecutor>,
    rx: Receiver<PgExecutor>,
    timeout: Duration,
}

#[derive(Clone)]
pub struct PgPool {
    slots: Arc<Slots>,
}

impl PgPool {
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, PoolError> {
        let size = usize::try_from(config.max_connections).unwrap_or(0);
        if size == 0 {
            return Err(PoolError::Empty);
        }

        let (tx, rx) = bounded(size);
        for _ in 0..size {
            let executor = PgExecutor::new(connect(&config.url)?);
            // Capacity equals `size`, so this never blocks.
            let _ = tx.send(executor);
        }
        log::info!("opened {size} postgres connection(s)");

        Ok(Self {
            slots: Arc::new(Slots {
                url: config.url.clone(),
                tx,
                rx,
                timeout: Duration::from_secs(config.pool_timeout_seconds),
            }),
        })
    }

    /// Check a connection out of the pool.
    pub fn acquire(&self) -> Result<PooledConnection, PoolError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::acquire_connection_span().entered();

        let executor = match self.slots.rx.recv_timeout(self.slots.timeout) {
            Ok(executor) => executor,
            Err(RecvTimeoutError::Timeout) => return Err(PoolError::Timeout(self.slots.timeout)),
            Err(RecvTimeoutError::Disconnected) => return Err(PoolError::Empty),
        };

        let executor = match executor.check_health() {
            Ok(()) => executor,
            Err(e) => {
                log::warn!("replacing unhealthy connection: {e}");
                match connect(&self.slots.url) {
                    Ok(client) => PgExecutor::new(client),
                    Err(err) => {
                        // Keep the slot so the pool does not shrink.
                        let _ = self.slots.tx.send(executor);
                        return Err(err.into());
                    }
                }
            }
        };

        Ok(PooledConnection {
            executor: Some(executor),
            home: self.slots.tx.clone(),
        })
    }
}

/// A checked-out connection; derefs to [`PgExecutor`].
pub struct PooledConnection {
    executor: Option<PgExecutor>,
    home: Sender<PgExecutor>,
}

impl Deref for PooledConnection {
    type Target = PgExecutor;

    fn deref(&self) -> &PgExecutor {
        // Only taken in `drop`.
        self.executor.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(executor) = self.executor.take() {
            let _ = self.home.send(executor);
        }
    }
}
