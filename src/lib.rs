//! # Cigar API
//!
//! A small HTTP API for reading and batch-upserting cigar product lines,
//! backed by a SQLite table used as a document collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │  HTTP (axum) │──▶│  Store trait     │──▶│  SQLite      │
//! │  / import    │   │  (cigar-api-core)│   │  cigar_lines │
//! └──────────────┘   └──────────────────┘   └──────────────┘
//! ```
//!
//! The store is constructed once at startup and injected into the router, so
//! tests can run the same router against
//! [`InMemoryStore`](cigar_api_core::store::memory::InMemoryStore).
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and the `CIGAR_API_DB_URL` override |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Idempotent table bootstrap |
//! | [`sqlite_store`] | SQLite implementation of the `Store` trait |
//! | [`server`] | Axum HTTP server |
//! | [`import`] | Batch upsert from a JSON file |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod sqlite_store;

pub use cigar_api_core::{batch, cast, models, store};
