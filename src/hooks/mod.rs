//! Hook pipeline for docmap
//!
//! Ordered before/after callbacks run around insert, update, remove,
//! find, and validate. Callbacks execute strictly in series: each
//! receives the in-progress data and the pipeline suspends until its
//! future resolves. The first callback that fails aborts the remaining
//! callbacks in that phase and surfaces its error verbatim; already-run
//! hooks are not rolled back (compensating actions are the hook
//! author's responsibility).
//!
//! There is no timeout or cancellation here: a hook that never resolves
//! stalls the operation indefinitely. That is a documented property of
//! the pipeline, not something it masks.

mod errors;
mod pipeline;

pub use errors::{HookError, HookResult};
pub use pipeline::{hook_fn, Hook, HookContext, HookFuture, HookPipeline, HookPoint, HookSet};
