use super::Store;
use crate::{
    errors::{FetchError, InsertError},
    query::{
        Conjunction, Selection, count_statement, create_table_statement, insert_statement,
        select_statement,
    },
    record::{Record, Value},
};
use async_trait::async_trait;
use sqlx::{
    FromRow,
    sqlite::{SqlitePool, SqliteRow},
};
use std::{
    fmt::{Debug, Error as FmtError, Formatter},
    marker::PhantomData,
};
use tracing::debug;

/// Bind every value of `$binds` to `$query`, in order.
///
/// A macro rather than a function since the query, query-as and query-scalar builders share the
/// `bind` method but no trait.
macro_rules! bind_all {
    ($query:expr, $binds:expr) => {{
        let mut query = $query;
        for value in $binds {
            query = match value {
                Value::Null => query.bind(None::<i64>),
                Value::Int(int) => query.bind(*int),
                Value::Text(text) => query.bind(text.clone()),
            };
        }
        query
    }};
}

/// A [`Store`] backed by an SQLite table named after [`Record::ENTITY`].
///
/// Examples are translated to parameterised SQL (see [`ToSql`](crate::query::ToSql)); values are
/// always bound, never interpolated. Concurrency is left to the connection pool.
pub struct SqliteStore<R> {
    /// The connection pool.
    pool: SqlitePool,
    /// Ties the store to its record type.
    _phantom: PhantomData<fn() -> R>,
}

impl<R> SqliteStore<R>
where
    R: Record,
{
    /// Connect to the database at `url`, e.g. `sqlite:books.db?mode=rwc` or `sqlite::memory:`.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection could be established.
    #[inline]
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(url).await?;
        Ok(Self::from_pool(pool))
    }

    /// Use an existing pool.
    #[inline]
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    /// The underlying pool.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the table for `R` unless it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails, e.g. because an incompatible table exists.
    #[inline]
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        let sql = create_table_statement::<R>();
        debug!(entity = R::ENTITY, "ensuring table exists");
        let _result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }
}

impl<R> Clone for SqliteStore<R> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<R> Debug for SqliteStore<R> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_struct("SqliteStore")
            .field("pool", &self.pool)
            .finish()
    }
}

#[async_trait]
#[allow(single_use_lifetimes, reason = "sqlx requires a higher-ranked row bound")]
impl<R> Store<R> for SqliteStore<R>
where
    R: Record + Unpin + for<'r> FromRow<'r, SqliteRow>,
{
    #[inline]
    async fn insert(&self, record: R) -> Result<R, InsertError> {
        let statement = insert_statement(&record);
        debug!(sql = %statement.sql, binds = statement.binds.len(), "executing insert");
        let result = bind_all!(sqlx::query(&statement.sql), &statement.binds)
            .execute(&self.pool)
            .await?;
        Ok(record.with_id(result.last_insert_rowid()))
    }

    #[inline]
    async fn select(&self, selection: &Selection<R>) -> Result<Vec<R>, FetchError> {
        let statement = select_statement(selection)?;
        debug!(sql = %statement.sql, binds = ?statement.binds, "executing select");
        let records = bind_all!(sqlx::query_as::<_, R>(&statement.sql), &statement.binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    #[inline]
    async fn count(&self, filter: &Conjunction<R>) -> Result<u64, FetchError> {
        let statement = count_statement(filter);
        debug!(sql = %statement.sql, binds = ?statement.binds, "executing count");
        let count = bind_all!(
            sqlx::query_scalar::<_, i64>(&statement.sql),
            &statement.binds
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    /// Runs both statements in one transaction, so they read the same database state.
    #[inline]
    async fn select_counted(&self, selection: &Selection<R>) -> Result<(Vec<R>, u64), FetchError> {
        let select = select_statement(selection)?;
        let count = count_statement(&selection.filter);
        debug!(sql = %select.sql, binds = ?select.binds, "executing counted select");
        let mut transaction = self.pool.begin().await?;
        let records = bind_all!(sqlx::query_as::<_, R>(&select.sql), &select.binds)
            .fetch_all(&mut *transaction)
            .await?;
        let total = bind_all!(sqlx::query_scalar::<_, i64>(&count.sql), &count.binds)
            .fetch_one(&mut *transaction)
            .await?;
        transaction.commit().await?;
        Ok((records, total as u64))
    }
}
