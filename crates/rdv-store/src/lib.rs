//! JSON-backed storage for the retail data viewer.
//!
//! A single seed document holds every store, shelf, product, and inventory
//! item. This crate loads it into typed caches, validates it as a whole, and
//! applies create/update/delete operations by rewriting the whole file.
//!
//! # Components
//!
//! - [`SeedDocument`] -- raw document I/O (two-space JSON, trailing newline)
//! - [`collect_issues`] -- the validation engine producing a [`ValidationReport`]
//! - [`next_id`] -- sequential `urn:ngsi-ld` id allocation
//! - [`DataRepository`] -- typed reads, enriched views, and mutations
//! - [`RepositoryCache`] -- reloads the repository when the file's mtime changes
//!
//! # Mutation Rules
//!
//! 1. Every mutation starts from the file on disk, never from the cache.
//! 2. The edited document is validated in full before anything is written.
//! 3. Any blocking issue rejects the mutation and the file stays byte-identical.
//! 4. Soft issues (too few shelves per store, too few items per shelf) never block.
//! 5. Deleting a store, shelf, or product also deletes what references it.
//! 6. There is no locking; concurrent writers lose updates.

pub mod cache;
pub mod document;
pub mod error;
pub mod ids;
pub mod input;
pub mod repository;
pub mod validation;
pub mod views;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

// Re-export primary types at crate root for ergonomic imports.
pub use cache::RepositoryCache;
pub use document::SeedDocument;
pub use error::{RepositoryError, RepositoryResult, ValidationFailure};
pub use ids::next_id;
pub use input::{InventoryItemInput, ProductInput, ShelfInput, StockInput, StoreInput};
pub use repository::DataRepository;
pub use validation::{collect_issues, Issue, IssueKind, Severity, ValidationReport};
pub use views::{InventoryRow, ShelfView, NOT_AVAILABLE};
