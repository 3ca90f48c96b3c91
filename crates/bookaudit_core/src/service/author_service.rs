//! Author use-case service.

use crate::model::author::{Author, AuthorId, AuthorPatch};
use crate::repo::author_repo::AuthorRepository;
use crate::repo::error::RepoResult;

/// Use-case wrapper for author operations.
pub struct AuthorService<R: AuthorRepository> {
    repo: R,
}

impl<R: AuthorRepository> AuthorService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_author(&self, author: &Author) -> RepoResult<AuthorId> {
        self.repo.create_author(author)
    }

    pub fn get_author(&self, id: AuthorId) -> RepoResult<Author> {
        self.repo.get_author(id)
    }

    pub fn list_authors(&self) -> RepoResult<Vec<Author>> {
        self.repo.list_authors()
    }

    pub fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        self.repo.delete_author(id)
    }

    /// Applies `patch` to the stored author and writes the merged record.
    ///
    /// # Contract
    /// - Reads the current record first; a missing author is NotFound.
    /// - Validates the merged record, so an invalid stored value blocks the
    ///   update even when the patch does not touch it.
    /// - Produces two audit events: the read and the update.
    pub fn patch_author(&self, id: AuthorId, patch: &AuthorPatch) -> RepoResult<Author> {
        let mut author = self.repo.get_author(id)?;
        author.apply(patch);
        author.validate()?;
        self.repo.update_author(&author)?;
        Ok(author)
    }
}
