use std::{
    collections::{HashSet, VecDeque},
    fmt,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    book::{Book, BookId},
    error::{LibraryError, Result},
    events::CirculationEvent,
    factory,
    listing::{BookRecord, UserRecord},
    observers::CirculationObserver,
    user::{User, UserId},
};

/// Default number of circulation transactions kept in the history
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Registry-side settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Maximum number of history entries to keep
    pub history_size: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { history_size: DEFAULT_HISTORY_SIZE }
    }
}

/// A circulation event that was applied to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transaction {
    /// Position of this transaction among all transactions of the library
    pub sequence: u64,
    /// What happened
    pub event: CirculationEvent,
}

/// The catalog: every book, every user, and the rules for moving books
/// between them.
///
/// Books and users are kept in insertion order, which is the order they
/// are listed in.
pub struct Library {
    /// Catalogued books by id
    books: IndexMap<BookId, Book>,
    /// Registered users by id
    users: IndexMap<UserId, User>,
    /// Ids of removed books, which may never be added again
    retired_books: HashSet<BookId>,
    /// Ids of removed users, which may never be registered again
    retired_users: HashSet<UserId>,
    /// Record of applied borrows and returns, oldest first
    history: VecDeque<Transaction>,
    /// Maximum number of history entries to keep
    max_history_size: usize,
    /// Sequence number for the next transaction
    next_sequence: u64,
    /// Registered circulation observers
    observers: Vec<Box<dyn CirculationObserver>>,
}

// Manual implementation of Debug for Library
impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("books", &self.books)
            .field("users", &self.users)
            .field("retired_books", &self.retired_books.len())
            .field("retired_users", &self.retired_users.len())
            .field("history", &self.history)
            .field("max_history_size", &self.max_history_size)
            .field("next_sequence", &self.next_sequence)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// Create an empty library with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LibraryConfig::default())
    }

    /// Create an empty library
    #[must_use]
    pub fn with_config(config: LibraryConfig) -> Self {
        Self {
            books: IndexMap::new(),
            users: IndexMap::new(),
            retired_books: HashSet::new(),
            retired_users: HashSet::new(),
            history: VecDeque::new(),
            max_history_size: config.history_size,
            next_sequence: 0,
            observers: Vec::new(),
        }
    }

    /// Register an observer to be notified of borrows and returns
    pub fn register_observer(&mut self, observer: Box<dyn CirculationObserver>) {
        self.observers.push(observer);
    }

    /// Add a book built by the factory
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::DuplicateBook` if a book with the same id is
    /// in the catalog or was removed from it
    pub fn add_book(&mut self, book: Book) -> Result<BookId> {
        let id = book.id();
        if self.books.contains_key(&id) || self.retired_books.contains(&id) {
            return Err(LibraryError::DuplicateBook(id));
        }
        Ok(self.insert_book(book))
    }

    /// Create a book and add it in one step
    pub fn add_new_book(&mut self, title: &str, author: &str, isbn: &str) -> BookId {
        // Factory ids are fresh, so no duplicate check is needed
        self.insert_book(factory::create_book(title, author, isbn))
    }

    /// Insert a book whose id is known to be unused
    fn insert_book(&mut self, book: Book) -> BookId {
        let id = book.id();
        debug!(target: "circulation::library", book = %id, title = book.title(), "Book added");
        self.books.insert(id, book);
        id
    }

    /// Look up a catalogued book
    #[must_use]
    pub fn get_book(&self, book_id: BookId) -> Option<&Book> {
        self.books.get(&book_id)
    }

    /// First book whose title matches exactly, in insertion order
    #[must_use]
    pub fn find_book_by_title(&self, title: &str) -> Option<&Book> {
        self.books.values().find(|book| book.title() == title)
    }

    /// Overwrite a book's title, author and ISBN
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if no such book exists
    pub fn edit_book(
        &mut self,
        book_id: BookId,
        title: &str,
        author: &str,
        isbn: &str,
    ) -> Result<()> {
        let book = self.books.get_mut(&book_id).ok_or(LibraryError::BookNotFound(book_id))?;
        book.edit(title, author, isbn);
        debug!(target: "circulation::library", book = %book_id, "Book edited");
        Ok(())
    }

    /// Remove a book from the catalog and return it.
    ///
    /// A checked-out book is also taken off its borrower's list, and the
    /// returned book is available. The id is retired and cannot be added
    /// again.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if no such book exists
    pub fn remove_book(&mut self, book_id: BookId) -> Result<Book> {
        let mut book =
            self.books.shift_remove(&book_id).ok_or(LibraryError::BookNotFound(book_id))?;
        self.retired_books.insert(book_id);

        if !book.is_available() {
            book.set_available(true);
            for user in self.users.values_mut().filter(|user| user.has_borrowed(book_id)) {
                user.forget_book(book_id);
                info!(
                    target: "circulation::library",
                    book = %book_id,
                    user = %user.id(),
                    "Removed book taken off borrower's list"
                );
            }
        }

        debug!(target: "circulation::library", book = %book_id, "Book removed");
        Ok(book)
    }

    /// Register a user built by the factory
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::DuplicateUser` if a user with the same id is
    /// registered or was removed
    pub fn register_user(&mut self, user: User) -> Result<UserId> {
        let id = user.id();
        if self.users.contains_key(&id) || self.retired_users.contains(&id) {
            return Err(LibraryError::DuplicateUser(id));
        }
        Ok(self.insert_user(user))
    }

    /// Create a user from a type code and register it in one step
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::InvalidUserType` if `code` is not 1 or 2
    pub fn add_new_user(&mut self, code: i64, name: &str) -> Result<UserId> {
        let user = factory::create_user(code, name)?;
        Ok(self.insert_user(user))
    }

    /// Insert a user whose id is known to be unused
    fn insert_user(&mut self, user: User) -> UserId {
        let id = user.id();
        debug!(target: "circulation::library", user = %id, kind = %user.kind(), "User registered");
        self.users.insert(id, user);
        id
    }

    /// Look up a registered user
    #[must_use]
    pub fn get_user(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    /// Rename a user
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UserNotFound` if no such user exists
    pub fn edit_user(&mut self, user_id: UserId, name: &str) -> Result<()> {
        let user = self.users.get_mut(&user_id).ok_or(LibraryError::UserNotFound(user_id))?;
        user.edit_user(name);
        debug!(target: "circulation::library", user = %user_id, "User edited");
        Ok(())
    }

    /// Remove a user and return it.
    ///
    /// Books the user still holds become available again, and the returned
    /// user holds nothing. The id is retired and cannot be registered again.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UserNotFound` if no such user exists
    pub fn remove_user(&mut self, user_id: UserId) -> Result<User> {
        let mut user =
            self.users.shift_remove(&user_id).ok_or(LibraryError::UserNotFound(user_id))?;
        self.retired_users.insert(user_id);

        for book_id in user.release_all() {
            if let Some(book) = self.books.get_mut(&book_id) {
                book.set_available(true);
                info!(
                    target: "circulation::library",
                    book = %book_id,
                    user = %user_id,
                    "Book released by removed user"
                );
            }
        }

        debug!(target: "circulation::library", user = %user_id, "User removed");
        Ok(user)
    }

    /// Check a book out to a user.
    ///
    /// Checks run in order and the first failure wins; nothing changes
    /// unless every check passes.
    ///
    /// # Errors
    ///
    /// - `LibraryError::UserNotFound` if the user does not exist
    /// - `LibraryError::BookNotFound` if the book does not exist
    /// - `LibraryError::BookUnavailable` if the book is checked out
    /// - `LibraryError::BorrowLimitReached` if the user holds their limit
    pub fn borrow_book(&mut self, user_id: UserId, book_id: BookId) -> Result<()> {
        let user = self.users.get_mut(&user_id).ok_or(LibraryError::UserNotFound(user_id))?;
        let book = self.books.get_mut(&book_id).ok_or(LibraryError::BookNotFound(book_id))?;

        if !book.is_available() {
            return Err(LibraryError::BookUnavailable(book_id));
        }
        if !user.can_borrow() {
            return Err(LibraryError::BorrowLimitReached { user: user_id, limit: user.max_books() });
        }

        book.set_available(false);
        user.borrow_book(book_id);

        self.record(CirculationEvent::Borrowed { user: user_id, book: book_id });
        Ok(())
    }

    /// Check a book back in from a user
    ///
    /// # Errors
    ///
    /// - `LibraryError::UserNotFound` if the user does not exist
    /// - `LibraryError::BookNotFound` if the book does not exist
    /// - `LibraryError::NotBorrowed` if the user does not hold the book
    pub fn return_book(&mut self, user_id: UserId, book_id: BookId) -> Result<()> {
        let user = self.users.get_mut(&user_id).ok_or(LibraryError::UserNotFound(user_id))?;
        let book = self.books.get_mut(&book_id).ok_or(LibraryError::BookNotFound(book_id))?;

        user.return_book(book_id)?;
        book.set_available(true);

        self.record(CirculationEvent::Returned { user: user_id, book: book_id });
        Ok(())
    }

    /// Append to the history and notify observers
    fn record(&mut self, event: CirculationEvent) {
        debug!(target: "circulation::library", %event, "Circulation");

        self.history.push_back(Transaction { sequence: self.next_sequence, event });
        self.next_sequence = self.next_sequence.saturating_add(1);

        // Maintain history size limit
        while self.history.len() > self.max_history_size {
            self.history.pop_front();
        }

        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// Snapshots of every book, in insertion order
    pub fn list_all_books(&self) -> impl Iterator<Item = BookRecord> {
        self.books.values().map(BookRecord::from)
    }

    /// Snapshots of every user with the books they hold, in insertion order
    pub fn list_all_users(&self) -> impl Iterator<Item = UserRecord> {
        self.users.values().map(move |user| {
            let books = user
                .borrowed_books()
                .iter()
                .filter_map(|book_id| self.get_book(*book_id))
                .map(BookRecord::from);
            UserRecord::new(user, books)
        })
    }

    /// The user currently holding a book, if any
    #[must_use]
    pub fn borrower_of(&self, book_id: BookId) -> Option<&User> {
        self.users.values().find(|user| user.has_borrowed(book_id))
    }

    /// Number of catalogued books
    #[must_use]
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Number of registered users
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Applied borrows and returns, oldest first
    #[must_use]
    pub fn history(&self) -> &VecDeque<Transaction> {
        &self.history
    }
}

// Include tests module
#[cfg(test)]
mod tests;
