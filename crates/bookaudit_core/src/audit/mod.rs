//! Append-only audit stream.
//!
//! # Responsibility
//! - Write one event row per audited operation, inside the caller's
//!   transaction.
//! - Build parametrized WHERE clauses from composable filters.
//! - Read events back without producing new ones.

pub mod filter;
pub(crate) mod query;
pub(crate) mod writer;

pub use filter::{after, before, Filter, Predicate, WhereClause};
