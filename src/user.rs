use std::{
    fmt,
    num::ParseIntError,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{
    book::BookId,
    error::{LibraryError, Result},
};

/// Source of user ids, shared by every catalog in the process
static NEXT_USER_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a user, never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw id, e.g. one typed in at the front desk
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Claim the next unused id
    fn next() -> Self {
        Self(NEXT_USER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// The kinds of patron, each with its own borrowing limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum UserKind {
    /// May hold up to three books
    Student,
    /// May hold up to five books
    Faculty,
}

impl UserKind {
    /// Resolve the numeric code used at the front desk (1 or 2)
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::InvalidUserType` for any other code
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Self::Student),
            2 => Ok(Self::Faculty),
            other => Err(LibraryError::InvalidUserType(other)),
        }
    }

    /// Maximum number of books a user of this kind may hold at once
    #[must_use]
    pub const fn max_books(self) -> usize {
        match self {
            Self::Student => 3,
            Self::Faculty => 5,
        }
    }

    /// Label shown in listings
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Faculty => "Faculty",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A registered patron and the books they currently hold
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct User {
    /// Identity assigned at construction
    id: UserId,
    /// Display name, the only editable field
    name: String,
    /// Fixed at construction
    kind: UserKind,
    /// Books currently held, in borrow order
    borrowed: Vec<BookId>,
}

impl User {
    /// Create a user with a fresh id and nothing borrowed
    #[must_use]
    pub fn new(kind: UserKind, name: &str) -> Self {
        Self { id: UserId::next(), name: name.to_string(), kind, borrowed: Vec::new() }
    }

    /// Identity assigned at construction
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of patron, fixed at construction
    #[must_use]
    pub fn kind(&self) -> UserKind {
        self.kind
    }

    /// Type label, `"Student"` or `"Faculty"`
    #[must_use]
    pub fn user_type(&self) -> &'static str {
        self.kind.label()
    }

    /// Borrowing limit of this user's kind
    #[must_use]
    pub fn max_books(&self) -> usize {
        self.kind.max_books()
    }

    /// Books currently held, in borrow order
    #[must_use]
    pub fn borrowed_books(&self) -> &[BookId] {
        &self.borrowed
    }

    /// Whether this user holds the given book
    #[must_use]
    pub fn has_borrowed(&self, book_id: BookId) -> bool {
        self.borrowed.contains(&book_id)
    }

    /// Whether one more book would stay within the borrowing limit
    #[must_use]
    pub fn can_borrow(&self) -> bool {
        self.borrowed.len() < self.max_books()
    }

    /// Record a borrowed book. The caller checks `can_borrow` first.
    pub(crate) fn borrow_book(&mut self, book_id: BookId) {
        self.borrowed.push(book_id);
    }

    /// Remove a book from the borrowed list
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotBorrowed` if the user does not hold the book
    pub(crate) fn return_book(&mut self, book_id: BookId) -> Result<()> {
        let pos = self
            .borrowed
            .iter()
            .position(|id| *id == book_id)
            .ok_or(LibraryError::NotBorrowed { user: self.id, book: book_id })?;
        self.borrowed.remove(pos);
        Ok(())
    }

    /// Drop a book from the borrowed list if present, e.g. when the book
    /// leaves the catalog
    pub(crate) fn forget_book(&mut self, book_id: BookId) {
        self.borrowed.retain(|id| *id != book_id);
    }

    /// Empty the borrowed list, handing back what was held
    pub(crate) fn release_all(&mut self) -> Vec<BookId> {
        std::mem::take(&mut self.borrowed)
    }

    /// Rename the user
    pub fn edit_user(&mut self, name: &str) {
        self.name = name.to_string();
    }
}
