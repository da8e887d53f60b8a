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

//! API to get one book.

use crate::driver::Driver;
use crate::model::{Book, BookId};
use axum::extract::State;
use axum::Json;
use bookshelf_core::rest::{DriverResultExt, EmptyBody, RestResult, UrlPath};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    UrlPath(id): UrlPath<BookId>,
    _: EmptyBody,
) -> RestResult<Json<Book>> {
    let book = driver.get_book(id).await.context("Failed to fetch book data")?;
    Ok(Json(book))
}
