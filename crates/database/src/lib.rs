//! # Atlas Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! SQLite store. It is the system's "permanent archive."
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic. It
//!   provides a clean, abstract API to the rest of the application, hiding
//!   the underlying SQL and storage implementation details.
//! - **Case-insensitive identity:** Country names are the identifying key;
//!   all lookups and the uniqueness guarantee compare names under `lower()`.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses
//!   a connection pool for concurrent access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the connection pool.
//! - `run_migrations`: A utility to apply schema migrations at startup.
//! - `CountryRepository`: The main struct that holds the connection pool and
//!   provides all the high-level data access methods, including the
//!   transactional refresh applier (`apply_refresh`).
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{CountryRepository, RefreshOutcome, WATERMARK_KEY};
