//! docmap - a strict, schema-driven document mapper for NoSQL stores
//!
//! Models compile a nested field declaration once (see SCHEMA.md);
//! writes are validated and pruned against the compiled tree, reads go
//! through layered blacklist/whitelist resolution (see VISIBILITY.md)
//! and optional relation population. Persistence stays behind the
//! narrow `driver::DocumentStore` contract.

pub mod driver;
pub mod hooks;
pub mod model;
pub mod observability;
pub mod ops;
pub mod paths;
pub mod populate;
pub mod rules;
pub mod schema;
pub mod validation;
pub mod visibility;
