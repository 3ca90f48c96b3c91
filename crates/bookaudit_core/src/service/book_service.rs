//! Book use-case service.

use crate::model::author::AuthorId;
use crate::model::book::{Book, BookId, BookPatch};
use crate::repo::book_repo::BookRepository;
use crate::repo::error::{RepoError, RepoResult};

/// Use-case wrapper for book operations.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_book(&self, book: &Book) -> RepoResult<BookId> {
        self.repo.create_book(book)
    }

    pub fn get_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<Book> {
        self.repo.get_book(author_id, book_id)
    }

    pub fn list_books(&self) -> RepoResult<Vec<Book>> {
        self.repo.list_books()
    }

    pub fn delete_book(&self, author_id: AuthorId, book_id: BookId) -> RepoResult<()> {
        self.repo.delete_book(author_id, book_id)
    }

    /// Partial book updates are not offered at the use-case boundary.
    ///
    /// Always returns [`RepoError::NotImplemented`] without touching storage
    /// or the audit log. [`BookRepository::update_book`] remains available
    /// for whole-record overwrites.
    pub fn patch_book(
        &self,
        _author_id: AuthorId,
        _book_id: BookId,
        _patch: &BookPatch,
    ) -> RepoResult<Book> {
        Err(RepoError::NotImplemented("book update"))
    }
}
