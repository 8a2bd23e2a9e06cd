use std::{
    fmt,
    num::ParseIntError,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

/// Source of book ids, shared by every catalog in the process
static NEXT_BOOK_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a book, never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    /// Wrap a raw id, e.g. one typed in by a patron
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Claim the next unused id
    fn next() -> Self {
        Self(NEXT_BOOK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A catalogued book
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Identity assigned at construction
    id: BookId,
    /// Book title, matched exactly by title lookups
    title: String,
    /// Book author
    author: String,
    /// Free-text ISBN, not checked for uniqueness
    isbn: String,
    /// False while the book is checked out
    available: bool,
}

impl Book {
    /// Create an available book with a fresh id
    #[must_use]
    pub fn new(title: &str, author: &str, isbn: &str) -> Self {
        Self {
            id: BookId::next(),
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            available: true,
        }
    }

    /// Identity assigned at construction
    #[must_use]
    pub fn id(&self) -> BookId {
        self.id
    }

    /// Book title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Book author
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Free-text ISBN
    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// False while the book is checked out
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Only the catalog flips availability, keeping it in step with the borrowers
    pub(crate) fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Overwrite the descriptive fields, leaving id and availability alone
    pub fn edit(&mut self, title: &str, author: &str, isbn: &str) {
        self.title = title.to_string();
        self.author = author.to_string();
        self.isbn = isbn.to_string();
    }
}
