//! Error types for catalog and circulation operations.
//!
//! Every variant is a recoverable, caller-facing condition. No operation
//! that returns one of these leaves the catalog partially modified.

use thiserror::Error;

use crate::{book::BookId, user::UserId};

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Errors raised by the catalog, the factories and the entities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// No book with the given id is in the catalog.
    ///
    /// The front desk picks books by title and checks user ids before a
    /// check-out or check-in, printing "No book with that title exists" or
    /// "No User with that ID Exists"; this message is what direct callers
    /// of the catalog see.
    #[error("Book not found.")]
    BookNotFound(BookId),

    /// No user with the given id is registered. See `BookNotFound` for the
    /// front-desk wording.
    #[error("User not found.")]
    UserNotFound(UserId),

    /// A book with this id is in the catalog or was removed from it
    #[error("Book ID already used.")]
    DuplicateBook(BookId),

    /// A user with this id is registered or was removed
    #[error("User ID already used.")]
    DuplicateUser(UserId),

    /// The user type code is neither 1 (student) nor 2 (faculty)
    #[error("Only valid options are 1 or 2")]
    InvalidUserType(i64),

    /// The book is currently checked out
    #[error("Book is not available for borrowing.")]
    BookUnavailable(BookId),

    /// The user already holds as many books as their kind allows
    #[error("User has reached borrowing limit.")]
    BorrowLimitReached {
        /// The user at their limit
        user: UserId,
        /// Borrowing limit of the user's kind
        limit: usize,
    },

    /// The book is not in the user's borrowed list
    #[error("Book not borrowed by user.")]
    NotBorrowed {
        /// The user attempting the return
        user: UserId,
        /// The book being returned
        book: BookId,
    },
}

impl LibraryError {
    /// Whether this error reports a missing book or user
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BookNotFound(_) | Self::UserNotFound(_))
    }
}
