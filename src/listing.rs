//! Display snapshots of the catalog.
//!
//! Records are owned copies, so a listing stays valid after the catalog
//! changes. The text layout is the one printed at the front desk.

use std::fmt;

use serde::Serialize;

use crate::{
    book::{Book, BookId},
    user::{User, UserId},
};

/// How listings are rendered for the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingFormat {
    /// Line-oriented `Key: value` layout
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl ListingFormat {
    /// Render a sequence of records in this format
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the records cannot be serialized
    pub fn render<T: fmt::Display + Serialize>(self, records: &[T]) -> serde_json::Result<String> {
        match self {
            Self::Text => {
                Ok(records.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))
            }
            Self::Json => serde_json::to_string_pretty(records),
        }
    }
}

/// Snapshot of a single book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub available: bool,
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id(),
            title: book.title().to_string(),
            author: book.author().to_string(),
            isbn: book.isbn().to_string(),
            available: book.is_available(),
        }
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Book {}:", self.id)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Author: {}", self.author)?;
        write!(f, "ISBN: {}", self.isbn)
    }
}

/// Snapshot of a user together with the books they hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub user_type: &'static str,
    pub max_books: usize,
    /// Borrowed books resolved against the catalog, in borrow order
    pub books: Vec<BookRecord>,
}

impl UserRecord {
    /// Build a record from a user and the books already resolved for them
    #[must_use]
    pub fn new(user: &User, books: impl IntoIterator<Item = BookRecord>) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            user_type: user.user_type(),
            max_books: user.max_books(),
            books: books.into_iter().collect(),
        }
    }
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User {}:", self.id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Class: {}", self.user_type)?;
        write!(f, "Books Checked Out:")?;
        for book in &self.books {
            write!(f, "\n{book}")?;
        }
        Ok(())
    }
}
