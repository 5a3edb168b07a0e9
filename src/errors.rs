//! Error types used by examples, stores and repositories.

use crate::record::Kind;
use serde_json::Error as JsonError;
use std::error::Error;
use thiserror::Error;
use transitive::Transitive;

/// Convenience alias.
type BoxError = Box<dyn Error + Send + Sync>;

/// An example, or the ordering accompanying it, does not fit the record schema.
#[derive(Debug, Error)]
pub enum ExampleError {
    /// The example names a field the record does not declare.
    #[error("Unknown field `{field}`.")]
    UnknownField {
        /// The name as given by the caller.
        field: Box<str>,
    },
    /// The example value has a different kind than the field.
    #[error("Field `{field}` holds {expected} values, but the example gives {found}.")]
    KindMismatch {
        /// The field the value was given for.
        field: &'static str,
        /// The kind declared by the field.
        expected: Kind,
        /// The kind of the example value.
        found: Kind,
    },
    /// The example asks for null on a field that can never be null.
    #[error("Field `{field}` is not nullable.")]
    NotNullable {
        /// The field the null was given for.
        field: &'static str,
    },
    /// The serialized example could not be read.
    #[error("Malformed example: {0}")]
    Malformed(#[source] JsonError),
}

/// Errors that may occur when reading records. Created by methods of
/// [`Store`](crate::store::Store) and [`Repository`](crate::Repository).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The example or ordering did not fit the record schema.
    #[error(transparent)]
    InvalidExample(#[from] ExampleError),
    /// The backing store could not be reached or failed while answering.
    #[error("The store is unavailable: {0}")]
    StoreUnavailable(#[source] BoxError),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for FetchError {
    #[inline]
    fn from(value: sqlx::Error) -> Self {
        Self::StoreUnavailable(Box::new(value))
    }
}

/// Errors that may occur when reading exactly one record. Created by
/// [`Store::fetch_one`](crate::store::Store::fetch_one) and the single-record lookups of
/// [`Repository`](crate::Repository).
#[derive(Debug, Error, Transitive)]
#[transitive(from(ExampleError, FetchError))]
pub enum FetchOneError {
    /// Error occurred during fetching.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// There was no record matching the lookup.
    #[error("There was no record matching the lookup.")]
    NotFound,
    /// More than one record matched where at most one was expected.
    #[error("Expected at most one matching record, found {count}.")]
    NotUnique {
        /// The number of matching records.
        count: u64,
    },
}

/// Errors that may occur when inserting records. Created by
/// [`Store::insert`](crate::store::Store::insert).
#[derive(Debug, Error)]
pub enum InsertError {
    /// The store refused the record, e.g. because of a constraint.
    #[error("The record was rejected: {0}")]
    Rejected(#[source] BoxError),
    /// The backing store could not be reached or failed while answering.
    #[error("The store is unavailable: {0}")]
    StoreUnavailable(#[source] BoxError),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for InsertError {
    #[inline]
    fn from(value: sqlx::Error) -> Self {
        let violation = matches!(
            &value,
            sqlx::Error::Database(err) if !matches!(err.kind(), sqlx::error::ErrorKind::Other)
        );
        if violation {
            Self::Rejected(Box::new(value))
        } else {
            Self::StoreUnavailable(Box::new(value))
        }
    }
}
