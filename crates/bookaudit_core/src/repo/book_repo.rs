//! Book repository contract and its audited SQLite implementation.
//!
//! Books are addressed through their owning author: a book id paired with
//! the wrong author id behaves like a missing book.

use super::error::{RepoError, RepoResult, StorageContext};
use super::traced;
use crate::audit::writer::record_event;
use crate::auth::AuditSession;
use crate::model::author::AuthorId;
use crate::model::book::{Book, BookId};
use crate::model::event::{Operation, OBJECT_BOOKS};
use crate::tx::run_in_transaction;
use rusqlite::{params, Connection, OptionalExtension, Row};

const BOOK_SELECT_SQL: &str = "SELECT id, author_id, title, published FROM books";

/// Audited CRUD over books.
pub trait BookRepository {
    /// Inserts `book` under `book.author_id` and returns the new id.
    ///
    /// A missing author violates the foreign key and fails as a storage
    /// error.
    fn create_book(&self, book: &Book) -> RepoResult<BookId>;
    fn get_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<Book>;
    /// Overwrites title and publication date of `book.id` owned by
    /// `book.author_id`.
    fn update_book(&self, book: &Book) -> RepoResult<()>;
    /// Lists every book regardless of author.
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    fn delete_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<()>;
}

impl<R: BookRepository + ?Sized> BookRepository for &R {
    fn create_book(&self, book: &Book) -> RepoResult<BookId> {
        (**self).create_book(book)
    }

    fn get_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<Book> {
        (**self).get_book(author_id, book_id)
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        (**self).update_book(book)
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        (**self).list_books()
    }

    fn delete_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<()> {
        (**self).delete_book(author_id, book_id)
    }
}

impl BookRepository for AuditSession<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<BookId> {
        book.validate()?;
        let user = self.user();

        let result = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<BookId> {
            let id: BookId = tx
                .query_row(
                    "INSERT INTO books (author_id, title, published)
                     VALUES (?1, ?2, ?3)
                     RETURNING id;",
                    params![book.author_id, book.title, book.published],
                    |row| row.get(0),
                )
                .context("insert book")?;
            record_event(tx, user, Operation::Create, OBJECT_BOOKS, Some(id))?;
            Ok(id)
        });
        traced("book_create", user, result)
    }

    fn get_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<Book> {
        let user = self.user();

        let found = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<Option<Book>> {
            record_event(tx, user, Operation::Read, OBJECT_BOOKS, Some(book_id))?;
            tx.query_row(
                &format!("{BOOK_SELECT_SQL} WHERE id = ?1 AND author_id = ?2;"),
                [book_id, author_id],
                parse_book_row,
            )
            .optional()
            .context("select book")
        });
        let result = found.and_then(|book| book.ok_or_else(|| not_found(book_id)));
        traced("book_get", user, result)
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        book.validate()?;
        let user = self.user();

        let changed = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<usize> {
            record_event(tx, user, Operation::Update, OBJECT_BOOKS, Some(book.id))?;
            tx.execute(
                "UPDATE books
                 SET title = ?3, published = ?4
                 WHERE id = ?1 AND author_id = ?2;",
                params![book.id, book.author_id, book.title, book.published],
            )
            .context("update book")
        });
        traced("book_update", user, require_row(changed, book.id))
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        let user = self.user();

        let result = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<Vec<Book>> {
            record_event(tx, user, Operation::Read, OBJECT_BOOKS, None)?;
            let mut stmt = tx
                .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))
                .context("select books")?;
            let books = stmt
                .query_map([], parse_book_row)
                .context("select books")?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("scan book row")?;
            Ok(books)
        });
        traced("book_list", user, result)
    }

    fn delete_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<()> {
        let user = self.user();

        let changed = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<usize> {
            record_event(tx, user, Operation::Delete, OBJECT_BOOKS, Some(book_id))?;
            tx.execute(
                "DELETE FROM books WHERE id = ?1 AND author_id = ?2;",
                [book_id, author_id],
            )
            .context("delete book")
        });
        traced("book_delete", user, require_row(changed, book_id))
    }
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("id")?,
        author_id: row.get("author_id")?,
        title: row.get("title")?,
        published: row.get("published")?,
    })
}

fn not_found(id: BookId) -> RepoError {
    RepoError::NotFound {
        object_type: OBJECT_BOOKS,
        id,
    }
}

fn require_row(changed: RepoResult<usize>, id: BookId) -> RepoResult<()> {
    match changed? {
        0 => Err(not_found(id)),
        _ => Ok(()),
    }
}
