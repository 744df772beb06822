use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Hook, Pool};
use derive_more::{Deref, DerefMut};
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};

use super::custom_hooks;
use crate::{
    ConnectionPool, CountRow, PgConfig, PgError, PgResult, PooledConnection,
    TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION,
};

/// Acquiring a connection slower than this is logged as a warning.
const SLOW_ACQUIRE: Duration = Duration::from_millis(100);

/// Snapshot of the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgPoolStatus {
    /// Upper bound on open connections.
    pub capacity: usize,
    /// Connections currently open.
    pub open: usize,
    /// Open connections not checked out by a caller.
    pub idle: usize,
    /// Callers queued for a connection.
    pub waiting: usize,
}

impl PgPoolStatus {
    /// Returns the number of connections checked out by callers.
    #[inline]
    pub fn in_use(&self) -> usize {
        self.open.saturating_sub(self.idle)
    }

    /// Returns the share of the capacity checked out, between 0.0 and 1.0.
    pub fn utilization(&self) -> f64 {
        match self.capacity {
            0 => 0.0,
            capacity => self.in_use() as f64 / capacity as f64,
        }
    }

    /// Returns whether every connection is checked out and callers are queued.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.waiting > 0 && self.in_use() >= self.capacity
    }
}

/// Pool of Postgres connections for paginated queries.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    masked_url: String,
}

impl PgClient {
    /// Builds the pool described by `config`.
    ///
    /// No connection is opened until one is requested.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Unexpected`] if deadpool rejects the pool settings.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CLIENT,
        fields(database_url = %config.database_url_masked())
    )]
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(custom_hooks::setup_callback);
        let manager =
            AsyncDieselConnectionManager::new_with_config(&config.postgres_url, manager_config);

        let timeout = config.connection_timeout();
        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .runtime(deadpool::Runtime::Tokio1)
            .post_create(Hook::sync_fn(custom_hooks::post_create))
            .post_recycle(Hook::sync_fn(custom_hooks::post_recycle))
            .build()
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET_CLIENT, error = %e, "Rejected pool settings");
                PgError::Unexpected(format!("Invalid pool settings: {e}").into())
            })?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            capacity = config.postgres_max_connections,
            "Built connection pool"
        );

        Ok(Self {
            inner: Arc::new(PgClientInner {
                pool,
                masked_url: config.database_url_masked(),
            }),
        })
    }

    /// Builds the pool and runs one count query to prove the database answers.
    ///
    /// # Errors
    ///
    /// Fails like [`PgClient::new`] and [`PgClient::get_connection`], or with
    /// [`PgError::Query`] if the count query fails.
    pub async fn new_with_test(config: PgConfig) -> PgResult<Self> {
        let client = Self::new(config)?;
        let mut conn = client.get_connection().await?;

        let row: CountRow = diesel::sql_query("SELECT COUNT(*) AS count FROM (SELECT 1) AS ping")
            .get_result(&mut **conn)
            .await
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET_CLIENT, error = %e, "Database did not answer");
                PgError::from(e)
            })?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            database_url = %client.inner.masked_url,
            rows = row.count,
            "Database answered"
        );

        Ok(client)
    }

    /// Checks a connection out of the pool, waiting up to the configured
    /// connection timeout.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONNECTION)]
    pub async fn get_connection(&self) -> PgResult<PgConn> {
        let started = Instant::now();
        let conn = self.inner.pool.get().await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %e,
                waited = ?started.elapsed(),
                status = ?self.pool_status(),
                "No connection available"
            );
            PgError::from(e)
        })?;

        let waited = started.elapsed();
        if waited > SLOW_ACQUIRE {
            tracing::warn!(
                target: TRACING_TARGET_CONNECTION,
                waited = ?waited,
                status = ?self.pool_status(),
                "Slow connection checkout"
            );
        }

        Ok(PgConn { conn })
    }

    /// Returns a snapshot of the pool.
    pub fn pool_status(&self) -> PgPoolStatus {
        let status = self.inner.pool.status();
        PgPoolStatus {
            capacity: status.max_size,
            open: status.size,
            idle: status.available,
            waiting: status.waiting,
        }
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgClient")
            .field("database_url", &self.inner.masked_url)
            .field("pool", &self.pool_status())
            .finish()
    }
}

/// A connection checked out of a [`PgClient`].
///
/// `PgConn` implements [`SqlSource`] so raw queries can be paginated with
/// [`paginate_by_sql`]. Dropping it hands the connection back to the pool.
///
/// [`SqlSource`]: pagekit_core::SqlSource
/// [`paginate_by_sql`]: pagekit_core::paginate_by_sql
#[derive(Deref, DerefMut)]
pub struct PgConn {
    #[deref]
    #[deref_mut]
    conn: PooledConnection,
}

impl From<PooledConnection> for PgConn {
    fn from(conn: PooledConnection) -> Self {
        Self { conn }
    }
}

impl fmt::Debug for PgConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConn").finish_non_exhaustive()
    }
}
