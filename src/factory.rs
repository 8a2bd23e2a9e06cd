//! Construction of catalog entities.
//!
//! Numeric user type codes are interpreted here and nowhere else.

use crate::{
    book::Book,
    error::Result,
    user::{User, UserKind},
};

/// Create a new, available book with a fresh id
#[must_use]
pub fn create_book(title: &str, author: &str, isbn: &str) -> Book {
    Book::new(title, author, isbn)
}

/// Create a user from a front-desk type code (1 = student, 2 = faculty)
///
/// # Errors
///
/// Returns `LibraryError::InvalidUserType` for any other code. No id is
/// consumed in that case.
pub fn create_user(code: i64, name: &str) -> Result<User> {
    let kind = UserKind::from_code(code)?;
    Ok(User::new(kind, name))
}
