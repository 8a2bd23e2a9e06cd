use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{book::BookId, user::UserId};

/// Events that move a book between available and checked out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CirculationEvent {
    /// A user checked a book out
    Borrowed {
        /// The borrowing user
        user: UserId,
        /// The book now checked out
        book: BookId,
    },
    /// A user brought a book back
    Returned {
        /// The returning user
        user: UserId,
        /// The book now available again
        book: BookId,
    },
}

impl CirculationEvent {
    /// The user on the other side of the desk
    #[must_use]
    pub fn user(&self) -> UserId {
        match self {
            Self::Borrowed { user, .. } | Self::Returned { user, .. } => *user,
        }
    }

    /// The book that changed hands
    #[must_use]
    pub fn book(&self) -> BookId {
        match self {
            Self::Borrowed { book, .. } | Self::Returned { book, .. } => *book,
        }
    }
}

impl fmt::Display for CirculationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrowed { user, book } => write!(f, "Book {book} checked out by User {user}"),
            Self::Returned { user, book } => write!(f, "Book {book} checked in by User {user}"),
        }
    }
}
