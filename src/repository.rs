//! The [`Repository`] front end over a [`Store`].

use crate::{
    errors::{FetchError, FetchOneError, InsertError},
    example::Example,
    query::{Conjunction, Order, Page, Selection},
    record::{Id, Record},
    store::Store,
};
use std::{
    fmt::{Debug, Error as FmtError, Formatter},
    sync::Arc,
};
use tracing::{debug, instrument};

/// Options of [`Repository::find_by_example`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Explicit ordering. Primary key ascending if [`None`].
    pub order: Option<Order>,
    /// The slice of the ordered matches to return. Everything if [`None`].
    pub page: Option<Page>,
    /// Also count every match, ignoring the page.
    pub count: bool,
}

/// The result of [`Repository::find_by_example`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matches<R> {
    /// The matching records on the requested page.
    pub records: Vec<R>,
    /// The number of matching records on all pages, if requested. Counted from the same state of
    /// the store as `records`.
    pub total: Option<u64>,
}

/// Typed access to the records of one store.
///
/// Every read is a fresh query against the store: nothing is cached, and two identical reads
/// over an unmodified store return identical results. Cloning is cheap and clones share the store.
pub struct Repository<R> {
    store: Arc<dyn Store<R>>,
}

impl<R> Repository<R>
where
    R: Record,
{
    /// A repository owning `store`.
    #[inline]
    #[must_use]
    pub fn new<S>(store: S) -> Self
    where
        S: Store<R> + 'static,
    {
        Self::from_shared(Arc::new(store))
    }

    /// A repository over a store that is shared with others.
    #[inline]
    #[must_use]
    pub fn from_shared(store: Arc<dyn Store<R>>) -> Self {
        Self { store }
    }

    /// Store `record` and return it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// See [`Store::insert`].
    #[inline]
    #[instrument(level = "debug", skip_all, fields(entity = R::ENTITY))]
    pub async fn insert(&self, record: R) -> Result<R, InsertError> {
        self.store.insert(record).await
    }

    /// Every record, in ascending identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::StoreUnavailable`] if the store fails.
    #[inline]
    pub async fn get_all(&self) -> Result<Vec<R>, FetchError> {
        self.store.select(&Selection::new(Conjunction::all())).await
    }

    /// The record with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchOneError::NotFound`] if there is none.
    #[inline]
    pub async fn get_by_id(&self, id: Id) -> Result<R, FetchOneError> {
        self.store.fetch_one(id).await
    }

    /// Returns `true` if a record with identifier `id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::StoreUnavailable`] if the store fails.
    #[inline]
    pub async fn exists_by_id(&self, id: Id) -> Result<bool, FetchError> {
        Ok(self.store.count(&Conjunction::by_id(id)).await? > 0)
    }

    /// The number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::StoreUnavailable`] if the store fails.
    #[inline]
    pub async fn count(&self) -> Result<u64, FetchError> {
        self.store.count(&Conjunction::all()).await
    }

    /// Every record matching `example`, in ascending identifier order.
    ///
    /// An example with every field absent matches every record.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidExample`] if the example does not fit the schema of `R`, and
    /// [`FetchError::StoreUnavailable`] if the store fails.
    #[inline]
    pub async fn match_by_example(&self, example: &Example<R>) -> Result<Vec<R>, FetchError> {
        self.find_by_example(example, &FindOptions::default())
            .await
            .map(|matches| matches.records)
    }

    /// The records matching `example`, ordered and paged as requested, optionally with the total
    /// number of matches.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidExample`] if the example or ordering does not fit the schema
    /// of `R`, and [`FetchError::StoreUnavailable`] if the store fails.
    #[inline]
    #[instrument(level = "debug", skip_all, fields(entity = R::ENTITY))]
    pub async fn find_by_example(
        &self,
        example: &Example<R>,
        options: &FindOptions,
    ) -> Result<Matches<R>, FetchError> {
        let FindOptions { order, page, count } = options;
        let filter = Conjunction::from_example(example)?;
        debug!(filter = format_args!("{filter:#?}"), "matching by example");

        let selection = Selection::new(filter)
            .order(order.clone())
            .page(*page);
        let (records, total) = if *count {
            let (records, total) = self.store.select_counted(&selection).await?;
            (records, Some(total))
        } else {
            (self.store.select(&selection).await?, None)
        };
        Ok(Matches { records, total })
    }

    /// The single record matching `example`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchOneError::NotFound`] if nothing matches, [`FetchOneError::NotUnique`] if
    /// more than one record matches, and the errors of
    /// [`match_by_example`](Self::match_by_example) otherwise.
    #[inline]
    pub async fn find_one_by_example(&self, example: &Example<R>) -> Result<R, FetchOneError> {
        let options = FindOptions {
            page: Some(Page {
                offset: 0,
                limit: 2,
            }),
            ..FindOptions::default()
        };
        let mut records = self.find_by_example(example, &options).await?.records;
        match records.len() {
            0 => Err(FetchOneError::NotFound),
            1 => Ok(records.remove(0)),
            _ => Err(FetchOneError::NotUnique {
                count: self.count_by_example(example).await?,
            }),
        }
    }

    /// The number of records matching `example`.
    ///
    /// # Errors
    ///
    /// See [`match_by_example`](Self::match_by_example).
    #[inline]
    pub async fn count_by_example(&self, example: &Example<R>) -> Result<u64, FetchError> {
        let filter = Conjunction::from_example(example)?;
        self.store.count(&filter).await
    }

    /// Returns `true` if any record matches `example`.
    ///
    /// # Errors
    ///
    /// See [`match_by_example`](Self::match_by_example).
    #[inline]
    pub async fn exists_by_example(&self, example: &Example<R>) -> Result<bool, FetchError> {
        Ok(self.count_by_example(example).await? > 0)
    }
}

impl<R> Clone for Repository<R> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R> Debug for Repository<R> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}
