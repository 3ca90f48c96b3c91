//! Use-case services over the audited repositories.
//!
//! # Responsibility
//! - Provide the entry points a boundary layer (CLI, HTTP) calls.
//! - Emulate partial updates on top of the whole-row overwrite contract.

pub mod author_service;
pub mod book_service;
