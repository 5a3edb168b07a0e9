//! The GraphQL query root.
use crate::book_schema::{Book, BookExample, BookOrder, BookPage, PageInput};
use async_graphql::{Error, ErrorExtensions, Object, Result};
use qbe::{
    FindOptions, Repository,
    errors::{FetchError, FetchOneError},
};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced to GraphQL clients. Each carries a stable `code` extension.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    /// Reading several books failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Reading exactly one book failed.
    #[error(transparent)]
    FetchOne(#[from] FetchOneError),
}

impl ApiError {
    /// The `code` extension sent to the client.
    fn code(&self) -> &'static str {
        match self {
            Self::Fetch(FetchError::InvalidExample(_))
            | Self::FetchOne(FetchOneError::Fetch(FetchError::InvalidExample(_))) => {
                "INVALID_EXAMPLE"
            },
            Self::Fetch(FetchError::StoreUnavailable(_))
            | Self::FetchOne(FetchOneError::Fetch(FetchError::StoreUnavailable(_))) => {
                "STORE_UNAVAILABLE"
            },
            Self::FetchOne(FetchOneError::NotFound) => "NOT_FOUND",
            Self::FetchOne(FetchOneError::NotUnique { .. }) => "NOT_UNIQUE",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        let code = self.code();
        if code == "STORE_UNAVAILABLE" {
            warn!(error = %self, "store unavailable");
        }
        Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

/// Convert a library error into a GraphQL error with a `code` extension.
fn api_error<E>(err: E) -> Error
where
    ApiError: From<E>,
{
    ApiError::from(err).extend()
}

/// The query root.
pub(crate) struct Query {
    /// The catalogue.
    pub(crate) books: Repository<Book>,
}

#[Object]
impl Query {
    /// Every book, in identifier order.
    async fn get_all(&self) -> Result<Vec<Book>> {
        self.books.get_all().await.map_err(api_error)
    }

    /// The book with the given identifier. Fails with `NOT_FOUND` if there is none.
    async fn get_by_id(&self, id: i64) -> Result<Book> {
        self.books.get_by_id(id).await.map_err(api_error)
    }

    /// Every book matching the example, in identifier order unless an ordering is given.
    async fn match_by_example(
        &self,
        example: BookExample,
        order_by: Option<BookOrder>,
        page: Option<PageInput>,
    ) -> Result<Vec<Book>> {
        let options = FindOptions {
            order: order_by.map(Into::into),
            page: page.map(Into::into),
            count: false,
        };
        let matches = self
            .books
            .find_by_example(&example.into_example(), &options)
            .await
            .map_err(api_error)?;
        Ok(matches.records)
    }

    /// One page of the books matching the example, with the total number of matches. Without an
    /// example every book matches.
    async fn find_by_example(
        &self,
        example: Option<BookExample>,
        order_by: Option<BookOrder>,
        page: Option<PageInput>,
    ) -> Result<BookPage> {
        let options = FindOptions {
            order: order_by.map(Into::into),
            page: page.map(Into::into),
            count: true,
        };
        let matches = self
            .books
            .find_by_example(&example.unwrap_or_default().into_example(), &options)
            .await
            .map_err(api_error)?;
        Ok(BookPage {
            items: matches.records,
            total_count: matches.total.unwrap_or_default(),
        })
    }

    /// The single book matching the example. Fails with `NOT_FOUND` if none matches and
    /// `NOT_UNIQUE` if several do.
    async fn find_one_by_example(&self, example: BookExample) -> Result<Book> {
        self.books
            .find_one_by_example(&example.into_example())
            .await
            .map_err(api_error)
    }

    /// The number of books matching the example. Without an example every book matches.
    async fn count_by_example(&self, example: Option<BookExample>) -> Result<u64> {
        self.books
            .count_by_example(&example.unwrap_or_default().into_example())
            .await
            .map_err(api_error)
    }
}
