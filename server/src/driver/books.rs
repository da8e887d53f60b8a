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

//! Operations on the catalog of books.

use crate::db;
use crate::driver::Driver;
use crate::model::{Book, BookFields, BookId};
use bookshelf_core::db::DbError;
use bookshelf_core::driver::{DriverError, DriverResult};

impl Driver {
    /// Gets all books in the catalog.
    pub(crate) async fn get_books(self) -> DriverResult<Vec<Book>> {
        let books = db::get_books(&mut self.db.ex().await?).await?;
        Ok(books)
    }

    /// Gets the book identified by `id`.
    pub(crate) async fn get_book(self, id: BookId) -> DriverResult<Book> {
        match db::get_book(&mut self.db.ex().await?, id).await? {
            Some(book) => Ok(book),
            None => Err(DriverError::NotFound("No Book Found".to_owned())),
        }
    }

    /// Adds a new book with the given `fields` to the catalog and returns its identifier.
    pub(crate) async fn create_book(self, fields: BookFields) -> DriverResult<BookId> {
        let id = db::create_book(&mut self.db.ex().await?, &fields).await?;
        Ok(id)
    }

    /// Overwrites all properties of the existing book identified by `id` with `fields`.
    ///
    /// The existence check and the update are not atomic.  If the book vanishes in between, the
    /// update is a no-op that still reports success.
    pub(crate) async fn update_book(self, id: BookId, fields: BookFields) -> DriverResult<()> {
        if db::get_book(&mut self.db.ex().await?, id).await?.is_none() {
            return Err(DriverError::NotFound("Book not found".to_owned()));
        }
        db::update_book(&mut self.db.ex().await?, id, &fields).await?;
        Ok(())
    }

    /// Deletes the existing book identified by `id`.
    pub(crate) async fn delete_book(self, id: BookId) -> DriverResult<()> {
        let not_found = || DriverError::NotFound(format!("Book not found with id: {}", id));

        if db::get_book(&mut self.db.ex().await?, id).await?.is_none() {
            return Err(not_found());
        }
        match db::delete_book(&mut self.db.ex().await?, id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }
}
