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

//! API to add a new book.

use crate::driver::Driver;
use crate::model::BookFields;
use crate::rest::MutationResponse;
use axum::extract::State;
use axum::Json;
use bookshelf_core::rest::{DriverResultExt, JsonBody, RestResult};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    JsonBody(fields): JsonBody<BookFields>,
) -> RestResult<Json<MutationResponse>> {
    let id = driver.create_book(fields).await.context("Failed to add book")?;
    Ok(Json(MutationResponse::new("Book added successfully", id)))
}

#[cfg(test)]
mod tests {
    use crate::model::testutils::*;
    use crate::model::*;
    use crate::rest::testutils::*;
    use crate::rest::MutationResponse;
    use axum::http;
    use bookshelf_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/books".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(dune())
            .await
            .expect_json::<MutationResponse>()
            .await;
        assert_eq!("Book added successfully", response.message());

        let id = *response.id();
        assert_eq!(Some(Book::new(id, dune())), context.get_book(id).await);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let context = TestContext::setup().await;

        let response1 = OneShotBuilder::new(context.app(), route())
            .send_json(dune())
            .await
            .expect_json::<MutationResponse>()
            .await;
        let response2 = OneShotBuilder::new(context.app(), route())
            .send_json(dune())
            .await
            .expect_json::<MutationResponse>()
            .await;
        assert_ne!(response1.id(), response2.id());

        assert_eq!(2, context.get_books().await.len());
    }

    #[tokio::test]
    async fn test_invalid_title() {
        let context = TestContext::setup().await;

        let mut request = serde_json::to_value(dune()).unwrap();
        request["Title"] = serde_json::json!("   ");
        OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Title cannot be empty")
            .await;

        assert!(context.get_books().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date() {
        let context = TestContext::setup().await;

        let mut request = serde_json::to_value(dune()).unwrap();
        request["PublishedDate"] = serde_json::json!("August 1965");
        OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("could not be parsed")
            .await;

        assert!(context.get_books().await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_error() {
        let context = TestContext::setup_without_schema().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_json(dune())
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("^Failed to add book$")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
