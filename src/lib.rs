//! In-memory library catalog and circulation tracker.
//!
//! This crate keeps book and patron records, and enforces the rules for
//! checking books out and back in: a book is held by at most one patron,
//! and each patron is bound by the borrowing limit of their user kind.

/// Books and their ids
pub mod book;
pub mod error;
/// Circulation events
pub mod events;
pub mod factory;
/// The catalog and its circulation rules
pub mod library;
pub mod listing;
pub mod menu;
/// Reactions to circulation events
pub mod observers;
/// Patrons, their kinds and their ids
pub mod user;

pub use book::{Book, BookId};
pub use error::{LibraryError, Result};
pub use events::CirculationEvent;
pub use factory::{create_book, create_user};
pub use library::{Library, LibraryConfig, Transaction};
pub use listing::{BookRecord, ListingFormat, UserRecord};
pub use user::{User, UserId, UserKind};
