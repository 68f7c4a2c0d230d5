//! Schema compiler subsystem for docmap
//!
//! Consumes a user-supplied nested field declaration (see SCHEMA.md) and
//! produces a compiled field tree with every rule name resolved to a
//! direct descriptor reference.
//!
//! # Design principles
//!
//! - Compilation never fails: bad declarations are logged, auto-corrected
//!   diagnostics (a misconfigured field must not crash the process)
//! - Every leaf carries exactly one synthesized `is<Type>` rule
//! - Unknown rules and unknown types are a compile-time concern, never a
//!   silent pass at validation time
//! - Declaration order is preserved throughout the tree

mod compiler;
mod errors;
mod node;

pub use compiler::{CompiledSchema, SchemaCompiler};
pub use errors::{CompileCode, CompileDiagnostic};
pub use node::{CompiledRule, DefaultValue, FieldKind, FieldNode, FieldType, IndexSpec};
