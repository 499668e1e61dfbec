//! Typed document store for the Riftline aggregation service.
//!
//! `PostgreSQL` holds every cached upstream record as a JSONB document
//! addressed by a canonical JSONB natural key. This crate provides the
//! typed access layer on top: per-collection schemas with decode
//! validation, insert-or-replace writes, bulk set reconciliation, and
//! the boot-time migration runner.
//!
//! # Architecture
//!
//! ```text
//! Domain services (riftline-cache)
//!     |
//!     +-- Collection<S>   typed find/upsert/delete/bulk per schema
//!     +-- reconcile       delete-list + upsert-list as one batch
//!     +-- MigrationRunner ordered, recorded, at-most-once steps
//!         |
//!         +-- PostgresPool (sqlx), connect-with-retry at boot
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration, boot retry policy
//! - [`schema`] -- the [`CollectionSchema`] contract and index specs
//! - [`collection`] -- typed collection handle and write counts
//! - [`reconcile`] -- set synchronization for multi-valued collections
//! - [`migrate`] -- append-only schema-evolution runner
//! - [`error`] -- shared error types
//!
//! [`CollectionSchema`]: schema::CollectionSchema

pub mod collection;
pub mod error;
pub mod migrate;
pub mod postgres;
pub mod reconcile;
pub mod schema;

pub use collection::{Collection, WriteCounts};
pub use error::StoreError;
pub use migrate::{Migration, MigrationRunner};
pub use postgres::{PostgresConfig, PostgresPool};
pub use reconcile::reconcile;
pub use schema::{CollectionSchema, IndexSpec};
