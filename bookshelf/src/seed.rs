//! The demo catalogue.
use crate::book_schema::Book;
use anyhow::{Context as _, Result};
use qbe::Repository;
use tracing::info;

/// The books inserted into an empty catalogue, in insertion order.
pub(crate) fn demo_books() -> Vec<Book> {
    vec![
        Book::new("Spring in Action", "Craig Walls", 2022),
        Book::new("Pride and Prejudice", "Jane Austen", 1813),
        Book::new("Emma", "Jane Austen", 1815),
        Book::new("Spring Boot in Action", "Craig Walls", 2015),
        Book::new("The Rust Programming Language", "Steve Klabnik", 2018),
    ]
}

/// Insert the demo catalogue unless the store already holds books.
///
/// Returns the number of books inserted.
///
/// # Errors
///
/// Returns an error if the store cannot be read or an insert fails.
pub(crate) async fn seed(books: &Repository<Book>) -> Result<usize> {
    let existing = books.count().await.context("failed to count books")?;
    if existing > 0 {
        info!(existing, "catalogue is not empty, skipping seed");
        return Ok(0);
    }
    let demo = demo_books();
    let inserted = demo.len();
    for book in demo {
        let _book = books.insert(book).await.context("failed to insert book")?;
    }
    info!(inserted, "seeded the catalogue");
    Ok(inserted)
}
