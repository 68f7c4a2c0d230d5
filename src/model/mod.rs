//! Model subsystem for docmap
//!
//! A model is a compiled field tree plus per-operation blacklists,
//! custom messages, and hooks, built once at definition time and
//! registered under its name. Models may reference models that are not
//! defined yet; references resolve by name, lazily, at first use.
//!
//! # Design principles
//!
//! - One instance per name: lookups return the same `Arc<Model>`
//! - Models are immutable after definition except the blacklists,
//!   which are read fresh on every call
//! - The registry is explicit and injectable, not a process global

mod definition;
mod model;
mod registry;

pub use definition::{ModelConfig, ModelDefinition};
pub use model::Model;
pub use registry::ModelRegistry;
