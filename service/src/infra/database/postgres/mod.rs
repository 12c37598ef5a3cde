//! Postgres [`Database`] implementation.

mod migrations;
mod user;

use deadpool_postgres::{CreatePoolError, Object, Pool, PoolError, Runtime};
use derive_more::{Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, types::ToSql, NoTls, Row};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use deadpool_postgres::Config;
pub use refinery::embed_migrations;

/// Postgres [`Database`] client backed by a connection [`Pool`].
///
/// Cloning is cheap and shares the [`Pool`].
#[derive(Clone, Debug)]
pub struct Postgres {
    /// [`Pool`] of connections.
    pool: Pool,
}

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// No connection is established until the first operation.
    ///
    /// # Errors
    ///
    /// If the [`Config`] is invalid.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self { pool })
    }

    /// Closes the underlying [`Pool`].
    ///
    /// Idle connections are dropped immediately, and any further operation
    /// fails.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Takes a connection from the [`Pool`].
    async fn client(&self) -> Result<Object, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }

    /// Runs the provided statement returning at most one row.
    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>> {
        self.client()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(sql, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }

    /// Executes the provided statement returning the number of affected rows.
    async fn exec(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>> {
        self.client()
            .await
            .map_err(tracerr::wrap!())?
            .execute(sql, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement execution error.
    #[display("Postgres statement failed: {_0}")]
    Connection(tokio_postgres::Error),

    /// Error of creating a new [`Pool`].
    #[display("Failed to create a new `Pool`: {_0}")]
    PoolCreation(CreatePoolError),

    /// Error of taking a connection from the [`Pool`].
    #[display("`Pool` error: {_0}")]
    Pool(PoolError),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the `constraint`
    /// uniqueness (or of any uniqueness, if [`None`]).
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::Connection(e) => {
                e.code() == Some(&SqlState::UNIQUE_VIOLATION)
                    && constraint.map_or(true, |c| {
                        e.as_db_error().and_then(|e| e.constraint()) == Some(c)
                    })
            }
            Self::Pool(..) | Self::PoolCreation(..) => false,
        }
    }
}
