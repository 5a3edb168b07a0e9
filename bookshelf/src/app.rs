//! The GraphQL schema and the HTTP router serving it.
use crate::{book_schema::Book, queries::Query};
use async_graphql::{
    EmptyMutation, EmptySubscription, Schema, extensions::Tracing, http::GraphiQLSource,
};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{Router, extract::State, response::Html, routing::get};
use qbe::Repository;
use tower_http::trace::TraceLayer;

/// The schema type, named to keep handler signatures readable.
pub(crate) type BookshelfSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Build the schema over the given catalogue.
pub(crate) fn schema(books: Repository<Book>) -> BookshelfSchema {
    Schema::build(Query { books }, EmptyMutation, EmptySubscription)
        .extension(Tracing)
        .finish()
}

/// Run a GraphQL request against the schema.
async fn graphql(
    State(schema): State<BookshelfSchema>,
    graphql_request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(graphql_request.into_inner()).await.into()
}

/// The GraphiQL playground.
async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// The router: `POST /graphql` runs queries, `GET /graphql` serves GraphiQL.
pub(crate) fn router(schema: BookshelfSchema) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql))
        .layer(TraceLayer::new_for_http())
        .with_state(schema)
}
