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

//! High-level data types.

use bookshelf_core::model::{ModelError, ModelResult};
use derive_getters::Getters;
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

/// Maximum length of a book title as specified in the schema.
pub(crate) const BOOKS_MAX_TITLE_LENGTH: usize = 255;

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Identifier of a book.  Identifiers are assigned by the database when books are created.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct BookId(i64);

impl BookId {
    /// Creates a new identifier from its raw database representation.
    pub(crate) fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database representation of the identifier.
    pub(crate) fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a correctly-formatted book title.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct Title(String);

impl Title {
    /// Creates a new title from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.trim().is_empty() {
            return Err(ModelError("Title cannot be empty".to_owned()));
        }
        if s.chars().count() > BOOKS_MAX_TITLE_LENGTH {
            return Err(ModelError("Title is too long".to_owned()));
        }

        Ok(Self(s))
    }

    /// Creates a new title from a string `s` read from the database, without validation.
    pub(crate) fn from_db<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Returns a string view of the title.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&'static str> for Title {
    /// Creates a new title from a hardcoded string, which must be valid.
    fn from(title: &'static str) -> Self {
        Title::new(title).expect("Hardcoded titles must be valid")
    }
}

/// A deserialization visitor for a `Title`.
struct TitleVisitor;

impl Visitor<'_> for TitleVisitor {
    type Value = Title;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Title::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Title::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Title {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(TitleVisitor)
    }
}

/// The properties of a book that clients can set.
///
/// This is the payload that clients send to create or update a book.  All fields are required.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub(crate) struct BookFields {
    /// The title of the book.
    #[serde(rename = "Title")]
    title: Title,

    /// Identifier of the author of the book.  Authors are not managed by this service.
    #[serde(rename = "AuthorID")]
    author_id: i32,

    /// Identifier of the genre of the book.  Genres are not managed by this service.
    #[serde(rename = "GenreID")]
    genre_id: i32,

    /// Number of pages in the book.
    #[serde(rename = "Pages")]
    pages: i32,

    /// Publication date of the book.
    #[serde(rename = "PublishedDate", with = "date_format")]
    published_date: Date,
}

impl BookFields {
    /// Creates a new set of book properties.
    pub(crate) fn new(
        title: Title,
        author_id: i32,
        genre_id: i32,
        pages: i32,
        published_date: Date,
    ) -> Self {
        Self { title, author_id, genre_id, pages, published_date }
    }

    /// Returns a copy of these properties with the number of pages set to `pages`.
    #[cfg(test)]
    pub(crate) fn with_pages(mut self, pages: i32) -> Self {
        self.pages = pages;
        self
    }
}

/// A book as stored in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct Book {
    /// Identifier of the book.
    #[serde(rename = "bookID")]
    id: BookId,

    /// Properties of the book.
    #[serde(flatten)]
    fields: BookFields,
}

impl Book {
    /// Creates a new book from its identifier and its properties.
    pub(crate) fn new(id: BookId, fields: BookFields) -> Self {
        Self { id, fields }
    }
}


#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use serde_test::{assert_de_tokens_error, assert_tokens, Token};
    use time::macros::date;

    #[test]
    fn test_book_id_display() {
        assert_eq!("999999", BookId::new(999999).to_string());
    }

    #[test]
    fn test_book_id_ser_de_ok() {
        assert_tokens(&BookId::new(42), &[Token::I64(42)]);
    }

    #[test]
    fn test_title_ok() {
        assert_eq!("Dune", Title::new("Dune").unwrap().as_str());
        assert_eq!("  Padded  ", Title::new("  Padded  ").unwrap().as_str());
        assert_eq!("Cien años de soledad", Title::new("Cien años de soledad").unwrap().as_str());
    }

    #[test]
    fn test_title_error() {
        assert_eq!(ModelError("Title cannot be empty".to_owned()), Title::new("").unwrap_err());
        assert_eq!(ModelError("Title cannot be empty".to_owned()), Title::new(" \t ").unwrap_err());

        let mut long_title = "x".repeat(BOOKS_MAX_TITLE_LENGTH - 1);
        long_title.push('é');
        assert!(Title::new(&long_title).is_ok());
        long_title.push('x');
        assert_eq!(ModelError("Title is too long".to_owned()), Title::new(long_title).unwrap_err());
    }

    #[test]
    fn test_title_from_db_skips_validation() {
        assert_eq!("", Title::from_db("").as_str());
        assert!(Title::new(Title::from_db(" ").as_str()).is_err());
    }

    #[test]
    fn test_title_ser_de_ok() {
        assert_tokens(&Title::from("Dune"), &[Token::String("Dune")]);
    }

    #[test]
    fn test_title_de_error() {
        assert_de_tokens_error::<Title>(&[Token::String("")], "Title cannot be empty");
    }

    #[test]
    fn test_book_fields_de_ok() {
        let fields: BookFields = serde_json::from_str(
            r#"{"Title":"Dune","AuthorID":1,"GenreID":2,"Pages":412,"PublishedDate":"1965-08-01"}"#,
        )
        .unwrap();
        assert_eq!(dune(), fields);
        assert_eq!(&date!(1965 - 08 - 01), fields.published_date());
    }

    #[test]
    fn test_book_fields_de_errors() {
        let valid = serde_json::to_value(dune()).unwrap();
        for (field, value, exp_error) in [
            ("AuthorID", serde_json::json!("1"), "invalid type"),
            ("Pages", serde_json::json!(null), "invalid type"),
            ("Title", serde_json::json!(""), "Title cannot be empty"),
            ("PublishedDate", serde_json::json!("1965-13-01"), "month"),
            ("PublishedDate", serde_json::json!("08/01/1965"), "year"),
        ] {
            let mut json = valid.clone();
            json[field] = value;
            let err = serde_json::from_value::<BookFields>(json).unwrap_err().to_string();
            assert!(err.contains(exp_error), "Error '{}' does not contain '{}'", err, exp_error);
        }

        let mut json = valid;
        json.as_object_mut().unwrap().remove("GenreID");
        let err = serde_json::from_value::<BookFields>(json).unwrap_err().to_string();
        assert_eq!("missing field `GenreID`", err);
    }

    #[test]
    fn test_book_ser_ok() {
        let book = Book::new(BookId::new(7), dune());
        assert_eq!(
            serde_json::json!({
                "bookID": 7,
                "Title": "Dune",
                "AuthorID": 1,
                "GenreID": 2,
                "Pages": 412,
                "PublishedDate": "1965-08-01",
            }),
            serde_json::to_value(&book).unwrap()
        );
    }
}
