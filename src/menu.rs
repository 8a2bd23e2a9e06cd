//! Text-mode front desk.
//!
//! Drives a [`Library`] from numbered menus. Input is read line by line
//! from any `BufRead` and all output goes to any `Write`, so the same code
//! serves the terminal and the tests. Reaching end of input leaves the
//! menus as if "Exit" had been chosen.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::{
    book::{Book, BookId},
    library::Library,
    listing::{BookRecord, ListingFormat, UserRecord},
    user::{UserId, UserKind},
};

/// Whether the session goes on after a menu action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Keep showing the current menu
    Continue,
    /// Leave the current menu
    Back,
    /// Input is exhausted or the user chose to exit
    Quit,
}

/// Outcome of prompting for a record id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdInput<T> {
    /// A well-formed id
    Id(T),
    /// The cancel sentinel was entered
    Cancel,
    /// The line was not a number
    Invalid,
}

/// Interactive session over a library
#[derive(Debug)]
pub struct Menu<R, W> {
    /// The catalog being managed
    library: Library,
    /// Line source
    input: R,
    /// Output sink
    output: W,
    /// Name shown in the welcome banner
    name: String,
    /// How listings are rendered
    format: ListingFormat,
    /// Whether headings and errors are colorized
    color: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Create a session without color and with text listings
    #[must_use]
    pub fn new(library: Library, input: R, output: W) -> Self {
        Self {
            library,
            input,
            output,
            name: "Norco Library".to_string(),
            format: ListingFormat::Text,
            color: false,
        }
    }

    /// Set the name shown in the welcome banner
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Choose how listings are rendered
    #[must_use]
    pub fn with_format(mut self, format: ListingFormat) -> Self {
        self.format = format;
        self
    }

    /// Colorize headings and errors
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// The catalog as it stands
    #[must_use]
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// End the session, handing back the catalog and the output sink
    #[must_use]
    pub fn into_parts(self) -> (Library, W) {
        (self.library, self.output)
    }

    /// Run the main menu until the user exits or input runs out
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading input or writing output fails
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let banner = format!("Welcome to the {}:", self.name);
            self.heading(&banner)?;
            writeln!(self.output, "1. Manage Books")?;
            writeln!(self.output, "2. Manage Users")?;
            writeln!(self.output, "3. Manage Transactions")?;
            writeln!(self.output, "4. Exit")?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                return Ok(());
            };

            let flow = match choice.trim() {
                "1" => self.books_menu()?,
                "2" => self.users_menu()?,
                "3" => self.transactions_menu()?,
                "4" => {
                    writeln!(self.output, "Thank you for using the Library System!")?;
                    Flow::Quit
                }
                _ => {
                    self.error("ERROR: Invalid choice, please try again")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Manage Books submenu
    fn books_menu(&mut self) -> io::Result<Flow> {
        loop {
            writeln!(self.output)?;
            self.heading("Manage Books:")?;
            writeln!(self.output, "1. Add a Book")?;
            writeln!(self.output, "2. Edit a Book")?;
            writeln!(self.output, "3. Remove a Book")?;
            writeln!(self.output, "4. Go Back")?;
            let Some(choice) = self.prompt("\nEnter your choice: ")? else {
                return Ok(Flow::Quit);
            };

            let flow = match choice.trim() {
                "1" => self.add_book()?,
                "2" => self.edit_book()?,
                "3" => self.remove_book()?,
                "4" => Flow::Back,
                _ => self.invalid_choice()?,
            };

            match flow {
                Flow::Continue => {}
                Flow::Back => return Ok(Flow::Continue),
                Flow::Quit => return Ok(Flow::Quit),
            }
        }
    }

    /// Prompt for title, author and ISBN, then catalog the book
    fn add_book(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\nAdd a Book:")?;
        let mut fields = Vec::with_capacity(3);
        for label in ["Title", "Author", "ISBN"] {
            match self.prompt(&format!("Enter the {label} (0 to cancel): "))? {
                None => return Ok(Flow::Quit),
                Some(value) if value == "0" => return Ok(Flow::Continue),
                Some(value) => fields.push(value),
            }
        }

        if let [title, author, isbn] = fields.as_slice() {
            let id = self.library.add_new_book(title, author, isbn);
            writeln!(self.output, "Book Added with ID {id}")?;
        }
        Ok(Flow::Continue)
    }

    /// Prompt for a book id and its new fields
    fn edit_book(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\nEdit a Book:")?;
        let book_id =
            match self.prompt_id::<BookId>("Enter Book ID to edit (or -1 to cancel): ", "-1")? {
                None => return Ok(Flow::Quit),
                Some(IdInput::Cancel) => return Ok(Flow::Continue),
                Some(IdInput::Invalid) => {
                    self.error("ERROR: Invalid Book ID")?;
                    return Ok(Flow::Continue);
                }
                Some(IdInput::Id(id)) => id,
            };
        if self.library.get_book(book_id).is_none() {
            self.error("ERROR: Book not found")?;
            return Ok(Flow::Continue);
        }

        let Some(title) = self.prompt("Enter new Title: ")? else { return Ok(Flow::Quit) };
        let Some(author) = self.prompt("Enter new Author: ")? else { return Ok(Flow::Quit) };
        let Some(isbn) = self.prompt("Enter new ISBN: ")? else { return Ok(Flow::Quit) };

        match self.library.edit_book(book_id, &title, &author, &isbn) {
            Ok(()) => writeln!(self.output, "Book Edited")?,
            Err(e) => self.error(&format!("ERROR: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    /// Prompt for a book id and remove that book
    fn remove_book(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\nRemove a Book:")?;
        let book_id =
            match self.prompt_id::<BookId>("Enter Book ID to remove (or -1 to cancel): ", "-1")? {
                None => return Ok(Flow::Quit),
                Some(IdInput::Cancel) => return Ok(Flow::Continue),
                Some(IdInput::Invalid) => {
                    self.error("ERROR: Invalid Book ID")?;
                    return Ok(Flow::Continue);
                }
                Some(IdInput::Id(id)) => id,
            };

        match self.library.remove_book(book_id) {
            Ok(_) => writeln!(self.output, "Book Removed")?,
            Err(e) => self.error(&format!("ERROR: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    /// Manage Users submenu
    fn users_menu(&mut self) -> io::Result<Flow> {
        loop {
            writeln!(self.output)?;
            self.heading("Manage Users:")?;
            writeln!(self.output, "1. Add a User")?;
            writeln!(self.output, "2. Edit a User")?;
            writeln!(self.output, "3. Remove a User")?;
            writeln!(self.output, "4. Go Back")?;
            let Some(choice) = self.prompt("\nEnter your choice: ")? else {
                return Ok(Flow::Quit);
            };

            let flow = match choice.trim() {
                "1" => self.add_user()?,
                "2" => self.edit_user()?,
                "3" => self.remove_user()?,
                "4" => Flow::Back,
                _ => self.invalid_choice()?,
            };

            match flow {
                Flow::Continue => {}
                Flow::Back => return Ok(Flow::Continue),
                Flow::Quit => return Ok(Flow::Quit),
            }
        }
    }

    /// Prompt for a type code and name, then register the user
    fn add_user(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "Add a User:")?;
        loop {
            let Some(code) = self.prompt("Enter 1 for student or 2 for faculty (0 to cancel): ")?
            else {
                return Ok(Flow::Quit);
            };
            let code = code.trim().parse::<i64>().unwrap_or(-1);
            if code == 0 {
                return Ok(Flow::Continue);
            }
            // Reject a bad code before asking for the name
            if let Err(e) = UserKind::from_code(code) {
                self.error(&format!("ERROR: {e}"))?;
                continue;
            }

            let Some(name) = self.prompt("Enter name (0 to cancel): ")? else {
                return Ok(Flow::Quit);
            };
            if name == "0" {
                return Ok(Flow::Continue);
            }
            match self.library.add_new_user(code, &name) {
                Ok(id) => writeln!(self.output, "User Added with ID {id}")?,
                Err(e) => self.error(&format!("ERROR: {e}"))?,
            }
            return Ok(Flow::Continue);
        }
    }

    /// Prompt for a user id and a new name
    fn edit_user(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "Edit a User:")?;
        let user_id =
            match self.prompt_id::<UserId>("Enter User ID to edit (or -1 to cancel): ", "-1")? {
                None => return Ok(Flow::Quit),
                Some(IdInput::Cancel) => return Ok(Flow::Continue),
                Some(IdInput::Invalid) => {
                    self.error("ERROR: Invalid User ID")?;
                    return Ok(Flow::Continue);
                }
                Some(IdInput::Id(id)) => id,
            };
        if self.library.get_user(user_id).is_none() {
            self.error("ERROR: User not found")?;
            return Ok(Flow::Continue);
        }

        let Some(name) = self.prompt("Enter new name: ")? else { return Ok(Flow::Quit) };
        match self.library.edit_user(user_id, &name) {
            Ok(()) => writeln!(self.output, "User Edited")?,
            Err(e) => self.error(&format!("ERROR: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    /// Prompt for a user id and remove that user
    fn remove_user(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "Remove a User:")?;
        let user_id =
            match self.prompt_id::<UserId>("Enter User ID to remove (or -1 to cancel): ", "-1")? {
                None => return Ok(Flow::Quit),
                Some(IdInput::Cancel) => return Ok(Flow::Continue),
                Some(IdInput::Invalid) => {
                    self.error("ERROR: Invalid User ID")?;
                    return Ok(Flow::Continue);
                }
                Some(IdInput::Id(id)) => id,
            };

        match self.library.remove_user(user_id) {
            Ok(_) => writeln!(self.output, "User Removed")?,
            Err(e) => self.error(&format!("ERROR: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    /// Manage Transactions submenu
    fn transactions_menu(&mut self) -> io::Result<Flow> {
        loop {
            writeln!(self.output)?;
            self.heading("Manage Transactions:")?;
            writeln!(self.output, "1. Check Out A Book")?;
            writeln!(self.output, "2. Check In A Book")?;
            writeln!(self.output, "3. List All Books")?;
            writeln!(self.output, "4. List All Users")?;
            writeln!(self.output, "5. Go Back")?;
            let Some(choice) = self.prompt("\nEnter your choice: ")? else {
                return Ok(Flow::Quit);
            };

            let flow = match choice.trim() {
                "1" => self.circulate(Circulation::CheckOut)?,
                "2" => self.circulate(Circulation::CheckIn)?,
                "3" => self.list_books()?,
                "4" => self.list_users()?,
                "5" => Flow::Back,
                _ => self.invalid_choice()?,
            };

            match flow {
                Flow::Continue => {}
                Flow::Back => return Ok(Flow::Continue),
                Flow::Quit => return Ok(Flow::Quit),
            }
        }
    }

    /// Check a book out or in, picking the book by title and the user by id
    fn circulate(&mut self, direction: Circulation) -> io::Result<Flow> {
        writeln!(self.output, "\n{}:", direction.heading())?;

        let (book_id, title) = loop {
            let Some(title) = self.prompt("Book Title (or 0 to cancel): ")? else {
                return Ok(Flow::Quit);
            };
            if title == "0" {
                return Ok(Flow::Continue);
            }
            match self.library.find_book_by_title(&title).map(Book::id) {
                Some(book_id) => break (book_id, title),
                None => self.error("Error: No book with that title exists")?,
            }
        };

        loop {
            let user_id = match self.prompt_id::<UserId>("User ID (or x to cancel): ", "x")? {
                None => return Ok(Flow::Quit),
                Some(IdInput::Cancel) => return Ok(Flow::Continue),
                Some(IdInput::Invalid) => {
                    self.error("Error: Invalid User ID")?;
                    continue;
                }
                Some(IdInput::Id(id)) => id,
            };
            if self.library.get_user(user_id).is_none() {
                self.error("Error: No User with that ID Exists")?;
                continue;
            }

            let result = match direction {
                Circulation::CheckOut => self.library.borrow_book(user_id, book_id),
                Circulation::CheckIn => self.library.return_book(user_id, book_id),
            };
            match result {
                Ok(()) => writeln!(self.output, "{title} {} by User {user_id}", direction.verb())?,
                Err(e) => self.error(&format!("Error: {e}"))?,
            }
            return Ok(Flow::Continue);
        }
    }

    /// Print every book
    fn list_books(&mut self) -> io::Result<Flow> {
        let records: Vec<BookRecord> = self.library.list_all_books().collect();
        self.heading("List All Books")?;
        let rendered = self.format.render(&records)?;
        if !rendered.is_empty() {
            writeln!(self.output, "{rendered}")?;
        }
        Ok(Flow::Continue)
    }

    /// Print every user with the books they hold
    fn list_users(&mut self) -> io::Result<Flow> {
        let records: Vec<UserRecord> = self.library.list_all_users().collect();
        self.heading("List All Users")?;
        let rendered = self.format.render(&records)?;
        if !rendered.is_empty() {
            writeln!(self.output, "{rendered}")?;
        }
        Ok(Flow::Continue)
    }

    /// Report a menu choice that is not on offer
    fn invalid_choice(&mut self) -> io::Result<Flow> {
        self.error("ERROR: Invalid choice")?;
        Ok(Flow::Continue)
    }

    /// Write a prompt and read one line, without its line ending.
    /// Returns `None` at end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prompt for an id, recognising `cancel` (case-insensitively)
    fn prompt_id<T: std::str::FromStr>(
        &mut self,
        text: &str,
        cancel: &str,
    ) -> io::Result<Option<IdInput<T>>> {
        let Some(line) = self.prompt(text)? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case(cancel) {
            return Ok(Some(IdInput::Cancel));
        }
        Ok(Some(line.parse().map_or(IdInput::Invalid, IdInput::Id)))
    }

    /// Write a heading line, green when colorized
    fn heading(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}", text.green().bold())
        } else {
            writeln!(self.output, "{text}")
        }
    }

    /// Write an error line, red when colorized
    fn error(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}", text.red())
        } else {
            writeln!(self.output, "{text}")
        }
    }
}

/// Direction of a front-desk transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Circulation {
    /// Lend a book to a user
    CheckOut,
    /// Take a book back from a user
    CheckIn,
}

impl Circulation {
    /// Title of the transaction screen
    fn heading(self) -> &'static str {
        match self {
            Self::CheckOut => "Check Out A Book",
            Self::CheckIn => "Check In A Book",
        }
    }

    /// Past participle used in the confirmation line
    fn verb(self) -> &'static str {
        match self {
            Self::CheckOut => "checked out",
            Self::CheckIn => "checked in",
        }
    }
}
