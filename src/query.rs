//! Predicates built from examples, and the shape of a read.

use crate::{
    errors::ExampleError,
    record::{Field, Record},
};

mod predicate;
pub use predicate::*;

mod translate;
pub use translate::*;

/// A query that can be evaluated to check if a record matches a predicate.
pub trait Query<T> {
    /// Try to match `data` to the predicate specified by this query.
    fn evaluate(&self, data: &T) -> bool;
}

/// Sort direction of an [`Order`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// An explicit ordering by one field.
///
/// Records that compare equal on the field keep primary key order, so results are always
/// deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// The field to sort by.
    pub field: Box<str>,
    /// The sort direction.
    pub direction: Direction,
}

impl Order {
    /// Ascending by `field`.
    #[inline]
    #[must_use]
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending by `field`.
    #[inline]
    #[must_use]
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Look up the field to sort by in the schema of `R`.
    ///
    /// # Errors
    ///
    /// Returns [`ExampleError::UnknownField`] if `R` declares no such field.
    #[inline]
    pub fn resolve<R>(&self) -> Result<&'static Field, ExampleError>
    where
        R: Record,
    {
        R::field(&self.field).ok_or_else(|| ExampleError::UnknownField {
            field: self.field.clone(),
        })
    }
}

/// Offset-based pagination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Page {
    /// The number of matching records to skip.
    pub offset: usize,
    /// The maximum number of records to return.
    pub limit: usize,
}

/// Everything a store needs to answer a read: which records, in which order, which slice.
#[derive(Clone, Debug)]
pub struct Selection<R> {
    /// The records to select.
    pub filter: Conjunction<R>,
    /// Explicit ordering. Primary key ascending if [`None`].
    pub order: Option<Order>,
    /// The slice of the ordered matches to return. Everything if [`None`].
    pub page: Option<Page>,
}

impl<R> Selection<R> {
    /// Select every record matching `filter`, in primary key order.
    #[inline]
    #[must_use]
    pub const fn new(filter: Conjunction<R>) -> Self {
        Self {
            filter,
            order: None,
            page: None,
        }
    }

    /// Replace the ordering.
    #[inline]
    #[must_use]
    pub fn order(self, order: Option<Order>) -> Self {
        Self { order, ..self }
    }

    /// Replace the pagination.
    #[inline]
    #[must_use]
    pub fn page(self, page: Option<Page>) -> Self {
        Self { page, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Book;

    #[test]
    fn order_resolves_against_schema() {
        let field = Order::desc("published_year")
            .resolve::<Book>()
            .expect("declared field");
        assert_eq!(field.name, "published_year");

        let err = Order::asc("isbn")
            .resolve::<Book>()
            .expect_err("undeclared field");
        assert!(matches!(err, ExampleError::UnknownField { field } if &*field == "isbn"));
    }

    #[test]
    fn selection_defaults_to_everything() {
        let selection = Selection::new(Conjunction::<Book>::all());
        assert!(selection.order.is_none());
        assert!(selection.page.is_none());
        assert!(selection.filter.is_unconstrained());
    }
}
