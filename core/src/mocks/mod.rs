//! Mock implementations for testing.
//!
//! These are in-memory implementations of the repository traits, useful for
//! unit tests, service-level property tests and local development without a
//! database.

mod store;

pub use store::InMemoryStore;
