//! Observability subsystem for docmap
//!
//! Structured JSON logging for schema compilation diagnostics,
//! configuration problems, and operation lifecycle events.
//!
//! # Principles
//!
//! 1. Logging is read-only: it never changes the outcome of an operation
//! 2. Synchronous, no buffering, no background threads
//! 3. Deterministic output (alphabetical field ordering)
//! 4. One log line = one event
//!
//! Event names are SCREAMING_SNAKE identifiers, e.g. `SCHEMA_UNKNOWN_RULE`
//! or `POPULATE_UNKNOWN_MODEL`. The full catalogue lives in ERRORS.md.

mod logger;

pub use logger::{Logger, Severity};
