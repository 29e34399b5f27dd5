//! [`Connection`] definitions.

use std::future::Future;

use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres, Postgres};

pub use deadpool_postgres::{
    Client as Pooled, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Parameters of a SQL statement.
pub type Params<'p> = &'p [&'p (dyn ToSql + Sync)];

/// Something SQL statements run on.
pub trait Connection {
    /// Runs the provided query statement, returning all the selected rows.
    ///
    /// # Errors
    ///
    /// If the statement fails or no connection is available.
    fn query<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the provided query statement, returning at most one selected row.
    ///
    /// # Errors
    ///
    /// If the statement fails, selects more than one row, or no connection is
    /// available.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the provided modifying statement, returning how many rows it
    /// touched.
    ///
    /// # Errors
    ///
    /// If the statement fails or no connection is available.
    fn exec<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;
}

/// Each statement takes its own [`Pooled`] connection, returning it back to
/// the [`Pool`] once done.
impl Connection for Postgres {
    async fn query<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.query(stmt, params).await.map_err(failed)
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.query_opt(stmt, params).await.map_err(failed)
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.execute(stmt, params).await.map_err(failed)
    }
}

/// Traces the provided failure of a statement.
#[track_caller]
fn failed(err: Error) -> Traced<database::Error> {
    tracerr::new!(database::Error::from(postgres::Error::from(err)))
}
