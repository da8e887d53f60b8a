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

//! API to delete a book.

use crate::driver::Driver;
use crate::model::BookId;
use crate::rest::MutationResponse;
use axum::extract::State;
use axum::Json;
use bookshelf_core::rest::{DriverResultExt, EmptyBody, RestResult, UrlPath};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    UrlPath(id): UrlPath<BookId>,
    _: EmptyBody,
) -> RestResult<Json<MutationResponse>> {
    driver.delete_book(id).await.context("Failed to delete book")?;
    Ok(Json(MutationResponse::new("Book deleted successfully", id)))
}

#[cfg(test)]
mod tests {
    use crate::model::testutils::*;
    use crate::model::*;
    use crate::rest::testutils::*;
    use crate::rest::MutationResponse;
    use axum::http;
    use bookshelf_core::rest::testutils::*;
    use std::fmt;

    fn route<T: fmt::Display>(id: T) -> (http::Method, String) {
        (http::Method::DELETE, format!("/books/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let id = context.create_book(dune()).await;
        let other = context.create_book(neuromancer()).await;

        let response = OneShotBuilder::new(context.app(), route(id))
            .send_empty()
            .await
            .expect_json::<MutationResponse>()
            .await;
        assert_eq!(MutationResponse::new("Book deleted successfully", id), response);

        assert_eq!(None, context.get_book(id).await);
        assert_eq!(vec![Book::new(other, neuromancer())], context.get_books().await);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        context.create_book(dune()).await;

        OneShotBuilder::new(context.app(), route(999999))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Book not found with id: 999999$")
            .await;

        assert_eq!(1, context.get_books().await.len());
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let context = TestContext::setup_without_schema().await;

        OneShotBuilder::new(context.into_app(), route("1.5"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Cannot parse `\"1\\.5\"` to a `i64`")
            .await;
    }

    #[tokio::test]
    async fn test_backend_error() {
        let context = TestContext::setup_without_schema().await;

        OneShotBuilder::new(context.into_app(), route(1))
            .send_empty()
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("^Failed to delete book$")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(1));
}
