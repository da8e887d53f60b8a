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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use bookshelf_core::db::Db;
use std::sync::Arc;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the app.
    db: Arc<dyn Db + Send + Sync>,

    /// The router for the app under test.
    app: Router,
}

impl TestContext {
    /// Initializes an app backed by an in-memory database with the schema in place.
    pub(crate) async fn setup() -> Self {
        let context = Self::setup_without_schema().await;
        db::init_schema(&mut context.db.ex().await.unwrap()).await.unwrap();
        context
    }

    /// Initializes an app backed by an empty in-memory database so that all operations that
    /// reach the database fail.
    pub(crate) async fn setup_without_schema() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(bookshelf_core::db::sqlite::testutils::setup().await);
        let driver = Driver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    /// Returns a copy of the router for the app.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the router for the app.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Adds a book with `fields` directly into the database.
    pub(crate) async fn create_book(&self, fields: BookFields) -> BookId {
        db::create_book(&mut self.db.ex().await.unwrap(), &fields).await.unwrap()
    }

    /// Fetches the book identified by `id` directly from the database.
    pub(crate) async fn get_book(&self, id: BookId) -> Option<Book> {
        db::get_book(&mut self.db.ex().await.unwrap(), id).await.unwrap()
    }

    /// Fetches all books directly from the database.
    pub(crate) async fn get_books(&self) -> Vec<Book> {
        db::get_books(&mut self.db.ex().await.unwrap()).await.unwrap()
    }
}
