//! A hand-written record type and sample data shared by unit tests.

use crate::record::{Field, Id, Kind, MatchMode, Record, Value};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "sqlite", derive(sqlx::FromRow))]
pub(crate) struct Book {
    pub(crate) id: Id,
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) published_year: Option<i32>,
}

impl Record for Book {
    const ENTITY: &'static str = "book";
    const FIELDS: &'static [Field] = &[
        Field {
            name: "id",
            kind: Kind::Int,
            mode: MatchMode::Exact,
            nullable: false,
        },
        Field {
            name: "title",
            kind: Kind::Text,
            mode: MatchMode::ContainsIgnoreCase,
            nullable: true,
        },
        Field {
            name: "author",
            kind: Kind::Text,
            mode: MatchMode::ContainsIgnoreCase,
            nullable: true,
        },
        Field {
            name: "published_year",
            kind: Kind::Int,
            mode: MatchMode::Exact,
            nullable: true,
        },
    ];
    const ID: &'static str = "id";

    fn id(&self) -> Id {
        self.id
    }

    fn with_id(self, id: Id) -> Self {
        Self { id, ..self }
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.clone().into()),
            "author" => Some(self.author.clone().into()),
            "published_year" => Some(self.published_year.into()),
            _ => None,
        }
    }
}

/// Six books with identifiers 1 to 6, including an empty title and a row of nulls.
pub(crate) fn library() -> Vec<Book> {
    let book = |id, title: &str, author: Option<&str>, published_year| Book {
        id,
        title: Some(title.to_owned()),
        author: author.map(str::to_owned),
        published_year,
    };
    vec![
        book(1, "Spring in Action", Some("Craig Walls"), Some(2022)),
        book(2, "Pride and Prejudice", Some("Jane Austen"), Some(1813)),
        book(3, "Emma", Some("Jane Austen"), Some(1815)),
        book(4, "Spring Boot in Action", Some("Craig Walls"), Some(2015)),
        book(5, "", Some("Anonymous"), Some(1999)),
        book(6, "The Rust Programming Language", None, None),
    ]
}
