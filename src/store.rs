//! The [`Store`] trait and its implementations.

use crate::{
    errors::{FetchError, FetchOneError, InsertError},
    query::{Conjunction, Selection},
    record::{Id, Record},
};
use async_trait::async_trait;

mod memory;
pub use memory::*;

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::*;

/// Persistent storage for records of type `R`.
///
/// A store owns identifier assignment and answers [`Selection`]s. It never sees examples: those
/// are validated and turned into predicates before they reach the store, so every implementation
/// only has to agree on what a [`Conjunction`] means. The in-memory store evaluates it directly
/// and the SQLite store translates it; both must return the same records in the same order.
///
/// Implementations are shared between tasks behind an [`Arc`](std::sync::Arc) and must be safe to
/// call concurrently.
#[async_trait]
pub trait Store<R>: Send + Sync
where
    R: Record,
{
    /// Store `record` under a freshly assigned identifier and return it with that identifier.
    ///
    /// The identifier carried by `record` is ignored. Identifiers are positive, increase with
    /// every insert and are never reused.
    async fn insert(&self, record: R) -> Result<R, InsertError>;

    /// Fetch the records selected by `selection`.
    ///
    /// Records are ordered by the selection's ordering if there is one, with ties and the
    /// unordered case in ascending identifier order. Pagination applies after ordering.
    async fn select(&self, selection: &Selection<R>) -> Result<Vec<R>, FetchError>;

    /// Count the records matching `filter`.
    async fn count(&self, filter: &Conjunction<R>) -> Result<u64, FetchError>;

    /// Fetch the records selected by `selection` together with the number of records matching
    /// its filter on all pages.
    ///
    /// Both are read from the same state of the store: an insert running concurrently is either
    /// reflected in both or in neither.
    async fn select_counted(&self, selection: &Selection<R>) -> Result<(Vec<R>, u64), FetchError>;

    /// Fetch the record with identifier `id`, if one exists.
    ///
    /// The default implementation selects by primary key.
    #[inline]
    async fn fetch_optional(&self, id: Id) -> Result<Option<R>, FetchError> {
        let selection = Selection::new(Conjunction::by_id(id));
        Ok(self.select(&selection).await?.into_iter().next())
    }

    /// Fetch the record with identifier `id`. If no such record exists,
    /// <code>[Err]\([`NotFound`](FetchOneError::NotFound))</code> is returned.
    ///
    /// The default implementation calls [`fetch_optional`](Self::fetch_optional).
    #[inline]
    async fn fetch_one(&self, id: Id) -> Result<R, FetchOneError> {
        self.fetch_optional(id)
            .await?
            .ok_or(FetchOneError::NotFound)
    }
}
