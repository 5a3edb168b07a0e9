use super::Store;
use crate::{
    errors::{FetchError, InsertError},
    query::{Conjunction, Direction, Page, Query as _, Selection},
    record::{Id, Record},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    fmt::{Debug, Error as FmtError, Formatter},
};
use tracing::debug;

/// Rows and the next identifier to hand out.
struct Inner<R> {
    /// Records keyed by identifier, so iteration is in primary key order.
    rows: BTreeMap<Id, R>,
    /// Never decreases, so identifiers are not reused.
    next_id: Id,
}

/// A [`Store`] keeping records in process memory.
///
/// Reads take a shared lock and writes an exclusive one; the lock is never held across an
/// `.await`. Examples are evaluated with [`Query::evaluate`](crate::query::Query::evaluate).
pub struct MemoryStore<R> {
    inner: RwLock<Inner<R>>,
}

impl<R> MemoryStore<R>
where
    R: Record,
{
    /// An empty store. The first identifier assigned is `1`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// A store holding `records`, each assigned a fresh identifier in iteration order.
    #[inline]
    #[must_use]
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for record in records {
                let _id = inner.push(record);
            }
        }
        store
    }

    /// Answer `selection` against the current rows, along with the number of matches before
    /// paging. Both come from a single read of the rows.
    fn snapshot(&self, selection: &Selection<R>) -> Result<(Vec<R>, u64), FetchError> {
        let Selection {
            filter,
            order,
            page,
        } = selection;
        let key = order
            .as_ref()
            .map(|order| order.resolve::<R>().map(|field| (field.name, order.direction)))
            .transpose()?;

        let mut matched = {
            let inner = self.inner.read();
            inner
                .rows
                .values()
                .filter(|record| filter.evaluate(record))
                .cloned()
                .collect::<Vec<_>>()
        };
        let total = matched.len() as u64;

        // Stable, so equal keys stay in primary key order.
        if let Some((field, direction)) = key {
            matched.sort_by(|a, b| {
                let (a, b) = (a.get(field), b.get(field));
                match direction {
                    Direction::Asc => a.cmp(&b),
                    Direction::Desc => b.cmp(&a),
                }
            });
        }

        let records = match page {
            Some(Page { offset, limit }) => {
                matched.into_iter().skip(*offset).take(*limit).collect()
            },
            None => matched,
        };
        Ok((records, total))
    }
}

impl<R> Inner<R>
where
    R: Record,
{
    /// Store `record` under the next identifier.
    fn push(&mut self, record: R) -> R {
        let id = self.next_id;
        self.next_id += 1;
        let record = record.with_id(id);
        let _previous = self.rows.insert(id, record.clone());
        record
    }
}

impl<R> Default for MemoryStore<R>
where
    R: Record,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Debug for MemoryStore<R> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let inner = self.inner.read();
        f.debug_struct("MemoryStore")
            .field("rows", &inner.rows.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}

#[async_trait]
impl<R> Store<R> for MemoryStore<R>
where
    R: Record,
{
    #[inline]
    async fn insert(&self, record: R) -> Result<R, InsertError> {
        let record = self.inner.write().push(record);
        debug!(entity = R::ENTITY, id = record.id(), "inserted record");
        Ok(record)
    }

    #[inline]
    async fn select(&self, selection: &Selection<R>) -> Result<Vec<R>, FetchError> {
        let (records, _total) = self.snapshot(selection)?;
        debug!(
            entity = R::ENTITY,
            filter = format_args!("{:#?}", selection.filter),
            rows = records.len(),
            "selected records"
        );
        Ok(records)
    }

    #[inline]
    async fn count(&self, filter: &Conjunction<R>) -> Result<u64, FetchError> {
        let inner = self.inner.read();
        let count = inner
            .rows
            .values()
            .filter(|record| filter.evaluate(record))
            .count();
        Ok(count as u64)
    }

    #[inline]
    async fn select_counted(&self, selection: &Selection<R>) -> Result<(Vec<R>, u64), FetchError> {
        let (records, total) = self.snapshot(selection)?;
        debug!(
            entity = R::ENTITY,
            filter = format_args!("{:#?}", selection.filter),
            rows = records.len(),
            total,
            "selected and counted records"
        );
        Ok((records, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::FetchOneError,
        fixtures::{Book, library},
        query::Order,
    };

    fn ids(books: &[Book]) -> Vec<Id> {
        books.iter().map(|book| book.id).collect()
    }

    #[tokio::test]
    async fn identifiers_increase_from_one() {
        let store = MemoryStore::<Book>::new();
        let first = store.insert(Book::default()).await.expect("insert");
        let second = store.insert(Book::default().with_id(42)).await.expect("insert");
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(store.fetch_one(2).await.expect("stored"), second);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::with_records(library());
        assert!(store.fetch_optional(99).await.expect("fetch").is_none());
        assert!(matches!(
            store.fetch_one(99).await,
            Err(FetchOneError::NotFound)
        ));
    }

    #[tokio::test]
    async fn default_order_is_primary_key() {
        let store = MemoryStore::with_records(library());
        let all = store
            .select(&Selection::new(Conjunction::all()))
            .await
            .expect("select");
        assert_eq!(ids(&all), [1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn ordering_puts_nulls_first_and_breaks_ties_by_id() {
        let store = MemoryStore::with_records(library());
        let asc = store
            .select(&Selection::new(Conjunction::all()).order(Some(Order::asc("author"))))
            .await
            .expect("select");
        // None, Anonymous, Craig Walls x2, Jane Austen x2.
        assert_eq!(ids(&asc), [6, 5, 1, 4, 2, 3]);

        let desc = store
            .select(&Selection::new(Conjunction::all()).order(Some(Order::desc("author"))))
            .await
            .expect("select");
        assert_eq!(ids(&desc), [2, 3, 1, 4, 5, 6]);
    }

    #[tokio::test]
    async fn pages_slice_after_ordering() {
        let store = MemoryStore::with_records(library());
        let selection = Selection::new(Conjunction::all())
            .order(Some(Order::desc("published_year")))
            .page(Some(Page {
                offset: 1,
                limit: 2,
            }));
        let page = store.select(&selection).await.expect("select");
        // 2022, 2015, 1999, 1815, 1813, null.
        assert_eq!(ids(&page), [4, 5]);

        let past_end = store
            .select(&selection.page(Some(Page {
                offset: 10,
                limit: 2,
            })))
            .await
            .expect("select");
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn unknown_order_field_is_invalid() {
        let store = MemoryStore::with_records(library());
        let err = store
            .select(&Selection::new(Conjunction::all()).order(Some(Order::asc("isbn"))))
            .await
            .expect_err("undeclared field");
        assert!(matches!(err, FetchError::InvalidExample(_)));
    }

    #[tokio::test]
    async fn select_counted_totals_all_pages() {
        let store = MemoryStore::with_records(library());
        let selection = Selection::new(Conjunction::all())
            .order(Some(Order::asc("title")))
            .page(Some(Page {
                offset: 4,
                limit: 10,
            }));
        let (page, total) = store.select_counted(&selection).await.expect("select");
        // "", Emma, Pride..., Spring Boot..., Spring in..., The Rust...
        assert_eq!(ids(&page), [1, 6]);
        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn count_agrees_with_select() {
        let store = MemoryStore::with_records(library());
        let filter = Conjunction::by_id(3);
        assert_eq!(store.count(&filter).await.expect("count"), 1);
        assert_eq!(store.count(&Conjunction::all()).await.expect("count"), 6);
    }
}
