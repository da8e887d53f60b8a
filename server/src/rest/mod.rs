// Bookshelf
// Copyright 2024 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Entry point to the REST server.

use crate::driver::Driver;
use crate::model::BookId;
use axum::Router;
use serde::Serialize;

mod book_delete;
mod book_get;
mod book_put;
mod books_get;
mod books_post;
#[cfg(test)]
mod testutils;

/// Response sent to the client after a successful modification of a book.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, derive_getters::Getters, serde::Deserialize, PartialEq))]
pub(crate) struct MutationResponse {
    /// Human-readable description of the modification.
    message: String,

    /// Identifier of the book that was modified.
    #[serde(rename = "bookID")]
    id: BookId,
}

impl MutationResponse {
    /// Creates a new response for a modification to the book `id`.
    pub(crate) fn new<S: Into<String>>(message: S, id: BookId) -> Self {
        Self { message: message.into(), id }
    }
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/books", get(books_get::handler).post(books_post::handler))
        .route(
            "/books/:id",
            get(book_get::handler).put(book_put::handler).delete(book_delete::handler),
        )
        .with_state(driver)
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use crate::model::testutils::*;
    use crate::model::*;
    use axum::http;
    use bookshelf_core::rest::testutils::*;

    #[tokio::test]
    async fn test_book_lifecycle() {
        let context = TestContext::setup().await;

        let request = serde_json::json!({
            "Title": "Dune",
            "AuthorID": 1,
            "GenreID": 2,
            "Pages": 412,
            "PublishedDate": "1965-08-01",
        });
        let response = OneShotBuilder::new(context.app(), (http::Method::POST, "/books"))
            .send_json(&request)
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!("Book added successfully", response["message"]);
        let id = response["bookID"].as_i64().unwrap();

        let mut exp_book = request.clone();
        exp_book["bookID"] = serde_json::json!(id);
        let book = OneShotBuilder::new(context.app(), (http::Method::GET, format!("/books/{}", id)))
            .send_empty()
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(exp_book, book);

        let mut request = request;
        request["Pages"] = serde_json::json!(500);
        let response =
            OneShotBuilder::new(context.app(), (http::Method::PUT, format!("/books/{}", id)))
                .send_json(&request)
                .await
                .expect_json::<serde_json::Value>()
                .await;
        assert_eq!(
            serde_json::json!({"message": "Book updated successfully", "bookID": id}),
            response
        );

        exp_book["Pages"] = serde_json::json!(500);
        let book = OneShotBuilder::new(context.app(), (http::Method::GET, format!("/books/{}", id)))
            .send_empty()
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(exp_book, book);

        let books = OneShotBuilder::new(context.app(), (http::Method::GET, "/books"))
            .send_empty()
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(serde_json::json!([exp_book]), books);

        let response =
            OneShotBuilder::new(context.app(), (http::Method::DELETE, format!("/books/{}", id)))
                .send_empty()
                .await
                .expect_json::<serde_json::Value>()
                .await;
        assert_eq!(
            serde_json::json!({"message": "Book deleted successfully", "bookID": id}),
            response
        );

        OneShotBuilder::new(context.app(), (http::Method::GET, format!("/books/{}", id)))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^No Book Found$")
            .await;

        OneShotBuilder::new(context.app(), (http::Method::DELETE, format!("/books/{}", id)))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error(&format!("^Book not found with id: {}$", id))
            .await;

        assert!(context.get_books().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_matches_row_count() {
        let context = TestContext::setup().await;

        for i in 0..5 {
            let id = context.create_book(dune().with_pages(i)).await;
            let books = OneShotBuilder::new(context.app(), (http::Method::GET, "/books"))
                .send_empty()
                .await
                .expect_json::<Vec<Book>>()
                .await;
            assert_eq!(context.get_books().await, books);
            assert_eq!(Some(&Book::new(id, dune().with_pages(i))), books.last());
        }
    }

    #[tokio::test]
    async fn test_backend_details_are_not_leaked() {
        let context = TestContext::setup_without_schema().await;

        for (method, uri) in [
            (http::Method::GET, "/books"),
            (http::Method::GET, "/books/1"),
            (http::Method::DELETE, "/books/1"),
        ] {
            let body = OneShotBuilder::new(context.app(), (method, uri))
                .send_empty()
                .await
                .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .take_body_as_text()
                .await;
            assert!(!body.contains("no such table"), "Body {} leaks backend details", body);
        }
    }
}
