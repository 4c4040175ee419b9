//! Tests for the translation layer.
//!
//! - `translate_unit`: unit tests for order-by resolution and the keyset
//!   predicate (no database)
//! - `projector`: expansion-stack and next-link unit tests
//! - `support`: shared `SQLite` fixtures
//! - `SQLite` integration tests for resource-set reads and relation
//!   resolution

mod support;
