//! # Cigar API Core
//!
//! Storage-agnostic logic for the Cigar API: the cigar-line data model,
//! document-style field casting, the [`store::Store`] trait with in-memory
//! and unavailable backends, and the batch upsert engine shared by the HTTP
//! server and the `import` command.
//!
//! This crate contains no sqlx, axum, or filesystem I/O.

pub mod batch;
pub mod cast;
pub mod models;
pub mod store;
