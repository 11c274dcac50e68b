//! Database connection management and the per-request unit of work.

use sqlx::{
    PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow, query,
};

/// Storage error type carried by the `Sql` variants of every service error.
pub use sqlx::Error as SqlError;

/// Bound on how long a unit of work waits for a row lock before failing.
pub const SET_LOCK_TIMEOUT_SQL: &str = "SET LOCAL lock_timeout = '5s'";

/// Shared database handle.
///
/// Every service operation opens exactly one transaction through
/// [`Db::begin_unit_of_work`], performs all of its repository calls on it and
/// commits once. Dropping the transaction without committing rolls every
/// mutation back, so "create order, retire basket" either happens as a whole or
/// not at all.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction for a single inbound request.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or applying the session
    /// settings fails.
    pub async fn begin_unit_of_work(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_LOCK_TIMEOUT_SQL).execute(&mut *tx).await?;

        Ok(tx)
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a non-negative money column (minor units).
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert a money amount into the `BIGINT` representation used by the schema.
pub(crate) fn amount_to_i64(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
