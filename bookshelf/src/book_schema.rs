//! The structs and enums that build the GraphQL schema.
use async_graphql::{Enum, InputObject, MaybeUndefined, SimpleObject};
use qbe::{
    Example, Probe, Record, Value,
    query::{Order, Page},
};
use sqlx::FromRow;

// --- Needed for fetching ---
/// A book in the catalogue.
#[derive(SimpleObject, Record, FromRow, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Book {
    /// The identifier, assigned when the book is stored.
    pub(crate) id: i64,
    /// The title of the book.
    pub(crate) title: Option<String>,
    /// The people who authored the book.
    pub(crate) author: Option<String>,
    /// The year the book was first published.
    pub(crate) published_year: Option<i32>,
}

impl Book {
    /// A book that has not been stored yet.
    pub(crate) fn new(title: &str, author: &str, published_year: i32) -> Self {
        Self {
            id: 0,
            title: Some(title.to_owned()),
            author: Some(author.to_owned()),
            published_year: Some(published_year),
        }
    }
}

// --- Needed for matching ---
/// A partially filled in book to match against.
///
/// Omitted fields are ignored. A field given as `null` matches books where that field is null.
/// Text fields match case-insensitive substrings; `id` and `publishedYear` match exactly.
#[derive(InputObject, Clone, Debug, Default)]
pub(crate) struct BookExample {
    /// Match the identifier exactly.
    pub(crate) id: MaybeUndefined<i64>,
    /// Match books whose title contains this text.
    pub(crate) title: MaybeUndefined<String>,
    /// Match books whose author contains this text.
    pub(crate) author: MaybeUndefined<String>,
    /// Match the publication year exactly.
    pub(crate) published_year: MaybeUndefined<i32>,
}

/// Map the GraphQL tri-state onto a probe.
fn probe<T>(value: MaybeUndefined<T>) -> Probe
where
    T: Into<Value>,
{
    match value {
        MaybeUndefined::Undefined => Probe::Absent,
        MaybeUndefined::Null => Probe::Null,
        MaybeUndefined::Value(value) => Probe::Value(value.into()),
    }
}

impl BookExample {
    /// The example this input describes.
    pub(crate) fn into_example(self) -> Example<Book> {
        let Self {
            id,
            title,
            author,
            published_year,
        } = self;
        [
            ("id", probe(id)),
            ("title", probe(title)),
            ("author", probe(author)),
            ("published_year", probe(published_year)),
        ]
        .into_iter()
        .collect()
    }
}

/// The fields books can be ordered by.
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum BookField {
    /// The identifier.
    Id,
    /// The title.
    Title,
    /// The author.
    Author,
    /// The publication year.
    PublishedYear,
}

impl BookField {
    /// The schema name of the field.
    const fn name(self) -> &'static str {
        match self {
            Self::Id => Book::ID,
            Self::Title => "title",
            Self::Author => "author",
            Self::PublishedYear => "published_year",
        }
    }
}

/// Sort direction.
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub(crate) enum SortDirection {
    /// Smallest first. Nulls come first.
    #[default]
    Asc,
    /// Largest first. Nulls come last.
    Desc,
}

/// Ordering of matched books. Books that tie are ordered by identifier.
#[derive(InputObject, Clone, Copy, Debug)]
pub(crate) struct BookOrder {
    /// The field to order by.
    pub(crate) field: BookField,
    /// The direction to order in.
    #[graphql(default)]
    pub(crate) direction: SortDirection,
}

impl From<BookOrder> for Order {
    fn from(BookOrder { field, direction }: BookOrder) -> Self {
        match direction {
            SortDirection::Asc => Self::asc(field.name()),
            SortDirection::Desc => Self::desc(field.name()),
        }
    }
}

/// A slice of the ordered matches.
#[derive(InputObject, Clone, Copy, Debug)]
pub(crate) struct PageInput {
    /// The number of matches to skip.
    #[graphql(default)]
    pub(crate) offset: u32,
    /// The maximum number of matches to return.
    pub(crate) limit: u32,
}

impl From<PageInput> for Page {
    fn from(PageInput { offset, limit }: PageInput) -> Self {
        Self {
            offset: offset as usize,
            limit: limit as usize,
        }
    }
}

/// One page of matches, with the number of matches on all pages.
#[derive(SimpleObject, Clone, Debug)]
pub(crate) struct BookPage {
    /// The books on this page.
    pub(crate) items: Vec<Book>,
    /// The number of matching books on all pages.
    pub(crate) total_count: u64,
}
