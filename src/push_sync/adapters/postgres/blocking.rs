//! Blocking operation helpers shared by the push synchronisation adapters.
//!
//! Diesel is synchronous; every query runs on the blocking thread pool so the
//! async executor's workers are never held by database I/O.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

/// `PostgreSQL` connection pool type used by push synchronisation adapters.
pub type PushSyncPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot establish its first connection.
pub fn build_pool(database_url: &str, max_connections: u32) -> Result<PushSyncPgPool, PoolError> {
    Pool::builder()
        .max_size(max_connections)
        .build(ConnectionManager::<PgConnection>::new(database_url))
}

/// Port error types that can wrap arbitrary persistence failures.
pub(super) trait PersistenceFailure: Sized {
    /// Wraps the underlying error.
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

/// Checks a connection out of `pool` and runs `f` on the blocking pool.
///
/// Pool and join failures are mapped into the caller's error type.
pub(super) async fn run_blocking<F, T, E>(pool: &PushSyncPgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: PersistenceFailure + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(E::from_persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(E::from_persistence)?
}
