use std::{cell::RefCell, rc::Rc};

use crate::{
    book::BookId,
    error::LibraryError,
    events::CirculationEvent,
    library::{Library, LibraryConfig},
    observers::CirculationObserver,
    user::UserId,
};

/// Observer that keeps every event it sees
#[derive(Debug, Default)]
struct RecordingObserver {
    /// Events received so far, shared with the test body
    seen: Rc<RefCell<Vec<CirculationEvent>>>,
}

impl CirculationObserver for RecordingObserver {
    fn on_event(&self, event: &CirculationEvent) {
        self.seen.borrow_mut().push(*event);
    }
}

/// Helper to build a library with one student, one faculty member and four books
#[allow(clippy::expect_used)]
fn setup_test_library() -> (Library, UserId, UserId, Vec<BookId>) {
    let mut library = Library::new();
    let student = library.add_new_user(1, "Alice").expect("student code is valid");
    let faculty = library.add_new_user(2, "Bob").expect("faculty code is valid");
    let books = ["A", "B", "C", "D"]
        .iter()
        .map(|title| library.add_new_book(title, "Author", "ISBN"))
        .collect();
    (library, student, faculty, books)
}

/// Whether the given book is marked available
fn is_available(library: &Library, book: BookId) -> bool {
    library.get_book(book).is_some_and(|b| b.is_available())
}

#[test]
fn test_borrow_marks_book_unavailable() {
    let (mut library, student, _, books) = setup_test_library();
    let book = books[0];

    assert_eq!(library.borrow_book(student, book), Ok(()));

    assert!(!is_available(&library, book));
    assert_eq!(library.get_user(student).map(|u| u.borrowed_books().to_vec()), Some(vec![book]));
    assert_eq!(library.borrower_of(book).map(|u| u.id()), Some(student));
}

#[test]
fn test_return_marks_book_available() {
    let (mut library, student, _, books) = setup_test_library();
    let book = books[1];
    assert!(library.borrow_book(student, book).is_ok());

    assert_eq!(library.return_book(student, book), Ok(()));

    assert!(is_available(&library, book));
    assert!(library.borrower_of(book).is_none());
}

#[test]
fn test_borrow_check_order() {
    let (mut library, student, faculty, books) = setup_test_library();
    let missing_user = UserId::new(u64::MAX);
    let missing_book = BookId::new(u64::MAX);

    // Missing user wins over missing book
    assert_eq!(
        library.borrow_book(missing_user, missing_book),
        Err(LibraryError::UserNotFound(missing_user))
    );
    assert_eq!(
        library.borrow_book(student, missing_book),
        Err(LibraryError::BookNotFound(missing_book))
    );

    // Fill the student up, then make the fourth book unavailable via the other user
    for book in &books[..3] {
        assert!(library.borrow_book(student, *book).is_ok());
    }
    assert!(library.borrow_book(faculty, books[3]).is_ok());

    // Unavailable wins over the borrowing limit
    assert_eq!(
        library.borrow_book(student, books[3]),
        Err(LibraryError::BookUnavailable(books[3]))
    );
}

#[test]
fn test_borrow_unavailable_book_leaves_state_unchanged() {
    let (mut library, student, faculty, books) = setup_test_library();
    assert!(library.borrow_book(student, books[0]).is_ok());
    let before = format!("{library:?}");

    assert_eq!(
        library.borrow_book(faculty, books[0]),
        Err(LibraryError::BookUnavailable(books[0]))
    );

    assert_eq!(format!("{library:?}"), before);
    assert_eq!(library.borrower_of(books[0]).map(|u| u.id()), Some(student));
}

#[test]
fn test_borrow_limit_for_student() {
    let (mut library, student, _, books) = setup_test_library();
    for book in &books[..3] {
        assert_eq!(library.borrow_book(student, *book), Ok(()));
    }

    assert_eq!(
        library.borrow_book(student, books[3]),
        Err(LibraryError::BorrowLimitReached { user: student, limit: 3 })
    );
    assert!(is_available(&library, books[3]));
    assert_eq!(library.get_user(student).map(|u| u.borrowed_books().len()), Some(3));
}

#[test]
fn test_borrow_limit_for_faculty() {
    let (mut library, _, faculty, _) = setup_test_library();
    let books: Vec<BookId> =
        (0..6).map(|i| library.add_new_book(&format!("F{i}"), "Author", "ISBN")).collect();

    for book in &books[..5] {
        assert_eq!(library.borrow_book(faculty, *book), Ok(()));
    }
    assert_eq!(
        library.borrow_book(faculty, books[5]),
        Err(LibraryError::BorrowLimitReached { user: faculty, limit: 5 })
    );
}

#[test]
fn test_return_check_order() {
    let (mut library, student, _, books) = setup_test_library();
    let missing_user = UserId::new(u64::MAX);
    let missing_book = BookId::new(u64::MAX);

    assert_eq!(
        library.return_book(missing_user, books[0]),
        Err(LibraryError::UserNotFound(missing_user))
    );
    assert_eq!(
        library.return_book(student, missing_book),
        Err(LibraryError::BookNotFound(missing_book))
    );
    assert_eq!(
        library.return_book(student, books[0]),
        Err(LibraryError::NotBorrowed { user: student, book: books[0] })
    );
}

#[test]
fn test_return_by_wrong_user_leaves_state_unchanged() {
    let (mut library, student, faculty, books) = setup_test_library();
    assert!(library.borrow_book(student, books[2]).is_ok());
    let before = format!("{library:?}");

    assert_eq!(
        library.return_book(faculty, books[2]),
        Err(LibraryError::NotBorrowed { user: faculty, book: books[2] })
    );
    assert_eq!(format!("{library:?}"), before);
}

#[test]
fn test_edit_book_and_user() {
    let (mut library, student, _, books) = setup_test_library();

    assert_eq!(library.edit_book(books[0], "New Title", "New Author", "New ISBN"), Ok(()));
    assert_eq!(library.edit_user(student, "Alicia"), Ok(()));

    let book = library.get_book(books[0]);
    assert_eq!(book.map(|b| b.title()), Some("New Title"));
    assert_eq!(book.map(|b| b.author()), Some("New Author"));
    assert_eq!(book.map(|b| b.isbn()), Some("New ISBN"));
    assert_eq!(library.get_user(student).map(|u| u.name()), Some("Alicia"));
}

#[test]
fn test_edit_missing_entities() {
    let mut library = Library::new();
    let book = BookId::new(u64::MAX);
    let user = UserId::new(u64::MAX);

    assert_eq!(library.edit_book(book, "T", "A", "I"), Err(LibraryError::BookNotFound(book)));
    assert_eq!(library.edit_user(user, "N"), Err(LibraryError::UserNotFound(user)));
    assert_eq!(library.remove_book(book).err(), Some(LibraryError::BookNotFound(book)));
    assert_eq!(library.remove_user(user).err(), Some(LibraryError::UserNotFound(user)));
}

#[test]
fn test_find_book_by_title() {
    let mut library = Library::new();
    let first = library.add_new_book("Same", "One", "1");
    let second = library.add_new_book("Same", "Two", "2");

    assert_eq!(library.find_book_by_title("Same").map(|b| b.id()), Some(first));
    assert!(library.find_book_by_title("same").is_none());

    assert!(library.remove_book(first).is_ok());
    assert_eq!(library.find_book_by_title("Same").map(|b| b.id()), Some(second));
}

#[test]
fn test_remove_borrowed_book_clears_borrower_list() {
    let (mut library, student, _, books) = setup_test_library();
    assert!(library.borrow_book(student, books[0]).is_ok());
    assert!(library.borrow_book(student, books[1]).is_ok());

    let removed = library.remove_book(books[0]);

    assert_eq!(removed.map(|b| b.id()), Ok(books[0]));
    assert!(library.get_book(books[0]).is_none());
    assert_eq!(
        library.get_user(student).map(|u| u.borrowed_books().to_vec()),
        Some(vec![books[1]])
    );
}

#[test]
fn test_remove_user_releases_books() {
    let (mut library, student, _, books) = setup_test_library();
    assert!(library.borrow_book(student, books[0]).is_ok());
    assert!(library.borrow_book(student, books[1]).is_ok());

    let removed = library.remove_user(student);

    assert_eq!(removed.map(|u| u.id()), Ok(student));
    assert!(library.get_user(student).is_none());
    assert!(is_available(&library, books[0]));
    assert!(is_available(&library, books[1]));
}

#[test]
#[allow(clippy::expect_used)]
fn test_removed_user_cannot_be_registered_again() {
    let (mut library, student, faculty, books) = setup_test_library();
    assert!(library.borrow_book(student, books[0]).is_ok());

    let removed = library.remove_user(student).expect("student is registered");
    assert!(removed.borrowed_books().is_empty());

    assert_eq!(library.register_user(removed), Err(LibraryError::DuplicateUser(student)));
    assert!(library.get_user(student).is_none());

    // The released book goes to exactly one new holder
    assert_eq!(library.borrow_book(faculty, books[0]), Ok(()));
    let holders: Vec<UserId> = library
        .list_all_users()
        .filter(|user| user.books.iter().any(|book| book.id == books[0]))
        .map(|user| user.id)
        .collect();
    assert_eq!(holders, [faculty]);
}

#[test]
#[allow(clippy::expect_used)]
fn test_removed_book_cannot_be_added_again() {
    let (mut library, student, _, books) = setup_test_library();
    assert!(library.borrow_book(student, books[0]).is_ok());

    let removed = library.remove_book(books[0]).expect("book is catalogued");
    assert!(removed.is_available());

    assert_eq!(library.add_book(removed), Err(LibraryError::DuplicateBook(books[0])));
    assert!(library.get_book(books[0]).is_none());
    assert_eq!(library.book_count(), 3);
}

#[test]
fn test_removed_entities_move_to_another_library() {
    let (mut library, student, _, books) = setup_test_library();
    assert!(library.borrow_book(student, books[0]).is_ok());
    assert!(library.borrow_book(student, books[1]).is_ok());

    let mut branch = Library::new();
    let book = library.remove_book(books[0]).map(|book| branch.add_book(book));
    let user = library.remove_user(student).map(|user| branch.register_user(user));

    assert_eq!(book, Ok(Ok(books[0])));
    assert_eq!(user, Ok(Ok(student)));
    assert!(branch.get_book(books[0]).is_some_and(|b| b.is_available()));
    assert!(branch.get_user(student).is_some_and(|u| u.borrowed_books().is_empty()));
    assert!(is_available(&library, books[1]));
}

#[test]
fn test_listing_order_and_borrowed_books() {
    let (mut library, student, faculty, books) = setup_test_library();
    assert!(library.borrow_book(faculty, books[3]).is_ok());
    assert!(library.borrow_book(faculty, books[1]).is_ok());

    let titles: Vec<String> = library.list_all_books().map(|b| b.title).collect();
    assert_eq!(titles, ["A", "B", "C", "D"]);

    let users: Vec<_> = library.list_all_users().collect();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, student);
    assert!(users[0].books.is_empty());
    assert_eq!(users[1].id, faculty);
    let held: Vec<BookId> = users[1].books.iter().map(|b| b.id).collect();
    assert_eq!(held, [books[3], books[1]]);
}

#[test]
fn test_history_and_observers() {
    let (mut library, student, _, books) = setup_test_library();
    let seen = Rc::new(RefCell::new(Vec::new()));
    library.register_observer(Box::new(RecordingObserver { seen: Rc::clone(&seen) }));

    assert!(library.borrow_book(student, books[0]).is_ok());
    assert_eq!(
        library.borrow_book(student, books[0]),
        Err(LibraryError::BookUnavailable(books[0]))
    );
    assert!(library.return_book(student, books[0]).is_ok());

    let expected = vec![
        CirculationEvent::Borrowed { user: student, book: books[0] },
        CirculationEvent::Returned { user: student, book: books[0] },
    ];
    assert_eq!(*seen.borrow(), expected);

    let history: Vec<_> = library.history().iter().map(|t| (t.sequence, t.event)).collect();
    assert_eq!(history, [(0, expected[0]), (1, expected[1])]);
}

#[test]
fn test_history_is_bounded() {
    let mut library = Library::with_config(LibraryConfig { history_size: 2 });
    let user = library.add_new_user(2, "Bounded").unwrap_or(UserId::new(u64::MAX));
    let book = library.add_new_book("Loop", "Author", "ISBN");

    for _ in 0..3 {
        assert!(library.borrow_book(user, book).is_ok());
        assert!(library.return_book(user, book).is_ok());
    }

    let sequences: Vec<u64> = library.history().iter().map(|t| t.sequence).collect();
    assert_eq!(sequences, [4, 5]);
}

#[test]
fn test_invalid_user_type_registers_nothing() {
    let mut library = Library::new();
    assert_eq!(library.add_new_user(3, "X"), Err(LibraryError::InvalidUserType(3)));
    assert_eq!(library.user_count(), 0);
    assert_eq!(library.list_all_users().count(), 0);
}
