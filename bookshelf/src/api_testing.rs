//! End-to-end tests of the GraphQL schema and the HTTP router.
use crate::{
    app::{BookshelfSchema, router, schema},
    book_schema::Book,
    queries::ApiError,
    seed::seed,
};
use async_graphql::{ErrorExtensions as _, Pos};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use qbe::{
    MemoryStore, Repository, SqliteStore,
    errors::{ExampleError, FetchError, FetchOneError},
};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt as _; // trait for calling the app

/// A schema over the seeded demo catalogue, kept in memory.
async fn seeded_schema() -> BookshelfSchema {
    let books = Repository::new(MemoryStore::new());
    let _inserted = seed(&books).await.expect("Failed to seed catalogue");
    schema(books)
}

/// Execute `query` and return the response as JSON.
async fn execute(schema: &BookshelfSchema, query: &str) -> Value {
    let response = schema.execute(query).await;
    serde_json::to_value(&response).expect("Failed to serialize response")
}

/// The `id`s of a list of books in a response.
fn ids(books: &Value) -> Vec<i64> {
    books
        .as_array()
        .expect("Expected a list of books")
        .iter()
        .map(|book| book["id"].as_i64().expect("Expected an id"))
        .collect()
}

/// The `code` extension of the first error in a response.
fn error_code(response: &Value) -> &str {
    response["errors"][0]["extensions"]["code"]
        .as_str()
        .expect("Expected an error code")
}

#[tokio::test]
async fn match_by_example_filters_on_present_fields() {
    let schema = seeded_schema().await;

    let walls = execute(
        &schema,
        r#"{ matchByExample(example: { author: "craig walls" }) { id author } }"#,
    )
    .await;
    assert_eq!(ids(&walls["data"]["matchByExample"]), [1, 4]);

    let everything = execute(&schema, "{ matchByExample(example: {}) { id } }").await;
    assert_eq!(ids(&everything["data"]["matchByExample"]), [1, 2, 3, 4, 5]);

    let austen_1815 = execute(
        &schema,
        r#"{ matchByExample(example: { author: "Austen", publishedYear: 1815 }) { title } }"#,
    )
    .await;
    assert_eq!(
        austen_1815["data"]["matchByExample"],
        json!([{ "title": "Emma" }])
    );
}

#[tokio::test]
async fn null_and_omitted_fields_differ() {
    let books = Repository::new(MemoryStore::new());
    let _spring = books
        .insert(Book::new("Spring in Action", "Craig Walls", 2022))
        .await
        .expect("Failed to insert book");
    let _anonymous = books
        .insert(Book {
            id: 0,
            title: Some("Beowulf".to_owned()),
            author: None,
            published_year: None,
        })
        .await
        .expect("Failed to insert book");
    let schema = schema(books);

    let unknown_author = execute(
        &schema,
        "{ matchByExample(example: { author: null }) { id } }",
    )
    .await;
    assert_eq!(ids(&unknown_author["data"]["matchByExample"]), [2]);

    let any_author = execute(&schema, "{ matchByExample(example: { title: \"\" }) { id } }").await;
    assert!(
        ids(&any_author["data"]["matchByExample"]).is_empty(),
        "An empty title only matches empty titles"
    );
}

#[tokio::test]
async fn get_by_id_reports_missing_books() {
    let schema = seeded_schema().await;

    let emma = execute(&schema, "{ getById(id: 3) { title author publishedYear } }").await;
    assert_eq!(
        emma["data"]["getById"],
        json!({ "title": "Emma", "author": "Jane Austen", "publishedYear": 1815 })
    );

    let missing = execute(&schema, "{ getById(id: 42) { title } }").await;
    assert_eq!(error_code(&missing), "NOT_FOUND");
}

#[tokio::test]
async fn find_by_example_pages_and_counts() {
    let schema = seeded_schema().await;
    let page = execute(
        &schema,
        r#"{
            findByExample(
                example: { author: "a" }
                orderBy: { field: PUBLISHED_YEAR, direction: DESC }
                page: { limit: 2 }
            ) {
                items { title }
                totalCount
            }
        }"#,
    )
    .await;
    assert_eq!(
        page["data"]["findByExample"],
        json!({
            "items": [
                { "title": "Spring in Action" },
                { "title": "The Rust Programming Language" },
            ],
            "totalCount": 5,
        })
    );

    let count = execute(
        &schema,
        "{ countByExample(example: { publishedYear: 1815 }) }",
    )
    .await;
    assert_eq!(count["data"]["countByExample"], json!(1));

    let all = execute(&schema, "{ countByExample }").await;
    assert_eq!(all["data"]["countByExample"], json!(5));
}

#[tokio::test]
async fn find_one_by_example_requires_a_unique_match() {
    let schema = seeded_schema().await;

    let rust = execute(
        &schema,
        r#"{ findOneByExample(example: { title: "rust" }) { id } }"#,
    )
    .await;
    assert_eq!(rust["data"]["findOneByExample"]["id"], json!(5));

    let austen = execute(
        &schema,
        r#"{ findOneByExample(example: { author: "austen" }) { id } }"#,
    )
    .await;
    assert_eq!(error_code(&austen), "NOT_UNIQUE");
}

/// The `code` extension of a converted library error.
fn code_of(err: &ApiError) -> Value {
    let server_error = err.extend().into_server_error(Pos::default());
    let server_error = serde_json::to_value(server_error).expect("Failed to serialize error");
    server_error["extensions"]["code"].clone()
}

#[test]
fn errors_carry_codes() {
    let invalid = ApiError::from(FetchError::InvalidExample(ExampleError::UnknownField {
        field: "isbn".into(),
    }));
    assert_eq!(code_of(&invalid), json!("INVALID_EXAMPLE"));

    let unavailable = ApiError::from(FetchOneError::Fetch(FetchError::StoreUnavailable(
        "connection refused".into(),
    )));
    assert_eq!(code_of(&unavailable), json!("STORE_UNAVAILABLE"));

    assert_eq!(
        code_of(&ApiError::from(FetchOneError::NotUnique { count: 2 })),
        json!("NOT_UNIQUE")
    );
}

#[tokio::test]
async fn sqlite_catalogue_answers_like_memory() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open database");
    let store = SqliteStore::<Book>::from_pool(pool);
    store.migrate().await.expect("Failed to create table");
    let books = Repository::new(store);
    let _inserted = seed(&books).await.expect("Failed to seed catalogue");
    let sqlite = schema(books);
    let memory = seeded_schema().await;

    for query in [
        r#"{ matchByExample(example: { author: "CRAIG" }) { id title } }"#,
        r#"{ matchByExample(example: { title: "in" }, orderBy: { field: TITLE }) { id } }"#,
        r#"{ findByExample(orderBy: { field: AUTHOR, direction: DESC }, page: { offset: 1, limit: 3 }) { items { id } totalCount } }"#,
        "{ getById(id: 2) { id title author publishedYear } }",
    ] {
        assert_eq!(
            execute(&sqlite, query).await,
            execute(&memory, query).await,
            "{query}"
        );
    }
}

#[tokio::test]
async fn router_serves_queries_and_graphiql() {
    let app = router(seeded_schema().await);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/graphql")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "query": "{ getAll { id title } }" }).to_string(),
                ))
                .expect("Failed to build query request"),
        )
        .await
        .expect("Failed to execute query request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read query body");
    let body: Value = serde_json::from_slice(&body).expect("Failed to deserialize response");
    assert_eq!(ids(&body["data"]["getAll"]), [1, 2, 3, 4, 5]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/graphql")
                .body(Body::empty())
                .expect("Failed to build playground request"),
        )
        .await
        .expect("Failed to execute playground request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read playground body");
    let html = String::from_utf8(body.to_vec()).expect("Expected UTF-8");
    assert!(html.to_lowercase().contains("graphiql"));
}
