//! Query by example over statically described records.
//!
//! A record type declares its fields once ([`Record`], usually derived). Callers filter records by
//! giving an [`Example`]: a partially populated record where every field is either absent, null or
//! a value. Present fields are compared using the mode the record declares for them (exact, or
//! substring with or without case), and all present fields must match.
//!
//! Examples are validated and turned into a [`Conjunction`](query::Conjunction) of predicates,
//! which a [`Store`](store::Store) answers either by evaluating it in memory or by translating it
//! to parameterised SQL. A [`Repository`] puts the pieces together:
//!
//! ```ignore
//! let books = Repository::new(MemoryStore::new());
//! books.insert(book).await?;
//! let austen = books
//!     .match_by_example(&Example::new().set("author", "austen"))
//!     .await?;
//! ```

pub mod errors;
pub mod example;
pub mod query;
pub mod record;
pub mod repository;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use example::{Example, Probe};
pub use record::{Field, Id, Kind, MatchMode, Record, Value};
/// Derive macro generating the [`Record`](trait@Record) implementation of a struct.
pub use record_macro::Record;
pub use repository::{FindOptions, Matches, Repository};
pub use store::{MemoryStore, Store};

#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
