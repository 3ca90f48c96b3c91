//! Author repository contract and its audited SQLite implementation.
//!
//! # Invariants
//! - Every call writes exactly one event with object type `authors`.
//! - Single-record calls record the target id; `list_authors` records none.

use super::error::{RepoError, RepoResult, StorageContext};
use super::traced;
use crate::audit::writer::record_event;
use crate::auth::AuditSession;
use crate::model::author::{Author, AuthorId};
use crate::model::event::{Operation, OBJECT_AUTHORS};
use crate::tx::run_in_transaction;
use rusqlite::{params, Connection, OptionalExtension, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT id, name, date_of_birth FROM authors";

/// Audited CRUD over authors.
pub trait AuthorRepository {
    /// Inserts `author` and returns the storage-assigned id.
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Author>;
    /// Overwrites every column of the row identified by `author.id`.
    fn update_author(&self, author: &Author) -> RepoResult<()>;
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
}

impl<R: AuthorRepository + ?Sized> AuthorRepository for &R {
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId> {
        (**self).create_author(author)
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Author> {
        (**self).get_author(id)
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        (**self).update_author(author)
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        (**self).list_authors()
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        (**self).delete_author(id)
    }
}

impl AuthorRepository for AuditSession<'_> {
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId> {
        author.validate()?;
        let user = self.user();

        let result = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<AuthorId> {
            let id: AuthorId = tx
                .query_row(
                    "INSERT INTO authors (name, date_of_birth)
                     VALUES (?1, ?2)
                     RETURNING id;",
                    params![author.name, author.date_of_birth],
                    |row| row.get(0),
                )
                .context("insert author")?;
            record_event(tx, user, Operation::Create, OBJECT_AUTHORS, Some(id))?;
            Ok(id)
        });
        traced("author_create", user, result)
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Author> {
        let user = self.user();

        let found = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<Option<Author>> {
            record_event(tx, user, Operation::Read, OBJECT_AUTHORS, Some(id))?;
            tx.query_row(
                &format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_author_row,
            )
            .optional()
            .context("select author")
        });
        let result = found.and_then(|author| author.ok_or_else(|| not_found(id)));
        traced("author_get", user, result)
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        author.validate()?;
        let user = self.user();

        let changed = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<usize> {
            record_event(tx, user, Operation::Update, OBJECT_AUTHORS, Some(author.id))?;
            tx.execute(
                "UPDATE authors
                 SET name = ?2, date_of_birth = ?3
                 WHERE id = ?1;",
                params![author.id, author.name, author.date_of_birth],
            )
            .context("update author")
        });
        traced("author_update", user, require_row(changed, author.id))
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let user = self.user();

        let result = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<Vec<Author>> {
            record_event(tx, user, Operation::Read, OBJECT_AUTHORS, None)?;
            let mut stmt = tx
                .prepare(&format!("{AUTHOR_SELECT_SQL} ORDER BY id ASC;"))
                .context("select authors")?;
            let authors = stmt
                .query_map([], parse_author_row)
                .context("select authors")?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("scan author row")?;
            Ok(authors)
        });
        traced("author_list", user, result)
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let user = self.user();

        let changed = run_in_transaction(self.conn(), |tx: &Connection| -> RepoResult<usize> {
            record_event(tx, user, Operation::Delete, OBJECT_AUTHORS, Some(id))?;
            tx.execute("DELETE FROM authors WHERE id = ?1;", [id])
                .context("delete author")
        });
        traced("author_delete", user, require_row(changed, id))
    }
}

fn parse_author_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get("id")?,
        name: row.get("name")?,
        date_of_birth: row.get("date_of_birth")?,
    })
}

fn not_found(id: AuthorId) -> RepoError {
    RepoError::NotFound {
        object_type: OBJECT_AUTHORS,
        id,
    }
}

/// Maps a committed zero rows-affected count to NotFound.
fn require_row(changed: RepoResult<usize>, id: AuthorId) -> RepoResult<()> {
    match changed? {
        0 => Err(not_found(id)),
        _ => Ok(()),
    }
}
