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

//! Database abstraction in terms of the operations needed by the server.
//!
//! The schema of the `books` table is managed outside of this service.  The schemas in this
//! directory mirror the production table and only exist to support tests.

use crate::model::{Book, BookFields, BookId, Title};
use bookshelf_core::db::mysql;
#[cfg(any(test, feature = "sqlite"))]
use bookshelf_core::db::sqlite;
use bookshelf_core::db::{DbError, DbResult, Executor};
use futures::TryStreamExt;
use sqlx::mysql::MySqlRow;
#[cfg(any(test, feature = "sqlite"))]
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::Date;


/// Initializes the database schema.
#[cfg(test)]
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::MySql(ex) => mysql::run_schema(ex, include_str!("mysql.sql")).await,

        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

impl TryFrom<MySqlRow> for Book {
    type Error = DbError;

    fn try_from(row: MySqlRow) -> DbResult<Self> {
        let id: i64 = row.try_get("bookID").map_err(mysql::map_sqlx_error)?;
        let title: String = row.try_get("Title").map_err(mysql::map_sqlx_error)?;
        let author_id: i32 = row.try_get("AuthorID").map_err(mysql::map_sqlx_error)?;
        let genre_id: i32 = row.try_get("GenreID").map_err(mysql::map_sqlx_error)?;
        let pages: i32 = row.try_get("Pages").map_err(mysql::map_sqlx_error)?;
        let published_date: Date = row.try_get("PublishedDate").map_err(mysql::map_sqlx_error)?;

        let title = Title::from_db(title);
        let fields = BookFields::new(title, author_id, genre_id, pages, published_date);
        Ok(Book::new(BookId::new(id), fields))
    }
}

#[cfg(any(test, feature = "sqlite"))]
impl TryFrom<SqliteRow> for Book {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("bookID").map_err(sqlite::map_sqlx_error)?;
        let title: String = row.try_get("Title").map_err(sqlite::map_sqlx_error)?;
        let author_id: i32 = row.try_get("AuthorID").map_err(sqlite::map_sqlx_error)?;
        let genre_id: i32 = row.try_get("GenreID").map_err(sqlite::map_sqlx_error)?;
        let pages: i32 = row.try_get("Pages").map_err(sqlite::map_sqlx_error)?;
        let published_date: Date = row.try_get("PublishedDate").map_err(sqlite::map_sqlx_error)?;

        let title = Title::from_db(title);
        let fields = BookFields::new(title, author_id, genre_id, pages, published_date);
        Ok(Book::new(BookId::new(id), fields))
    }
}

/// Gets all books in the catalog sorted by their identifier.
pub(crate) async fn get_books(ex: &mut Executor) -> DbResult<Vec<Book>> {
    let query_str = "
        SELECT bookID, Title, AuthorID, GenreID, Pages, PublishedDate
        FROM books
        ORDER BY bookID
    ";

    let mut books = vec![];
    match ex {
        Executor::MySql(ex) => {
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(mysql::map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
        }

        #[cfg(any(test, feature = "sqlite"))]
        Executor::Sqlite(ex) => {
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(books)
}

/// Gets the book identified by `id`, or `None` if it does not exist.
pub(crate) async fn get_book(ex: &mut Executor, id: BookId) -> DbResult<Option<Book>> {
    let query_str = "
        SELECT bookID, Title, AuthorID, GenreID, Pages, PublishedDate
        FROM books
        WHERE bookID = ?
    ";

    match ex {
        Executor::MySql(ex) => {
            let maybe_row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(&mut **ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
            maybe_row.map(Book::try_from).transpose()
        }

        #[cfg(any(test, feature = "sqlite"))]
        Executor::Sqlite(ex) => {
            let maybe_row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            maybe_row.map(Book::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Inserts a new book with the given `fields` and returns the identifier that the database
/// assigned to it.
pub(crate) async fn create_book(ex: &mut Executor, fields: &BookFields) -> DbResult<BookId> {
    let query_str = "
        INSERT INTO books (Title, AuthorID, GenreID, Pages, PublishedDate)
        VALUES (?, ?, ?, ?, ?)
    ";

    match ex {
        Executor::MySql(ex) => {
            let done = sqlx::query(query_str)
                .bind(fields.title().as_str())
                .bind(fields.author_id())
                .bind(fields.genre_id())
                .bind(fields.pages())
                .bind(fields.published_date())
                .execute(&mut **ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion did not affect exactly one row".to_owned(),
                ));
            }
            match i64::try_from(done.last_insert_id()) {
                Ok(id) => Ok(BookId::new(id)),
                Err(e) => Err(DbError::DataIntegrityError(format!("Invalid book id: {}", e))),
            }
        }

        #[cfg(any(test, feature = "sqlite"))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query(query_str)
                .bind(fields.title().as_str())
                .bind(fields.author_id())
                .bind(fields.genre_id())
                .bind(fields.pages())
                .bind(fields.published_date())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion did not affect exactly one row".to_owned(),
                ));
            }
            Ok(BookId::new(done.last_insert_rowid()))
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Overwrites all the properties of the book identified by `id` with `fields`.
///
/// Updating a book that does not exist is not an error: the caller is responsible for checking
/// for existence beforehand if it cares.
pub(crate) async fn update_book(
    ex: &mut Executor,
    id: BookId,
    fields: &BookFields,
) -> DbResult<()> {
    let query_str = "
        UPDATE books
        SET Title = ?, AuthorID = ?, GenreID = ?, Pages = ?, PublishedDate = ?
        WHERE bookID = ?
    ";

    match ex {
        Executor::MySql(ex) => {
            sqlx::query(query_str)
                .bind(fields.title().as_str())
                .bind(fields.author_id())
                .bind(fields.genre_id())
                .bind(fields.pages())
                .bind(fields.published_date())
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
        }

        #[cfg(any(test, feature = "sqlite"))]
        Executor::Sqlite(ex) => {
            sqlx::query(query_str)
                .bind(fields.title().as_str())
                .bind(fields.author_id())
                .bind(fields.genre_id())
                .bind(fields.pages())
                .bind(fields.published_date())
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(())
}

/// Deletes the book identified by `id`.
pub(crate) async fn delete_book(ex: &mut Executor, id: BookId) -> DbResult<()> {
    let query_str = "DELETE FROM books WHERE bookID = ?";

    let rows_affected = match ex {
        Executor::MySql(ex) => {
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(mysql::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(test, feature = "sqlite"))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    } else if rows_affected != 1 {
        return Err(DbError::BackendError("Deletion affected more than one row".to_owned()));
    }
    Ok(())
}
