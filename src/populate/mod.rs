//! Population planner for docmap
//!
//! Expands requested relation paths into join-stage descriptors for the
//! driver and merges the referenced models' visibility into the read's
//! directives. After the driver returns, `apply` unwraps the join
//! results: a to-one relation collapses its one-element array to an
//! object, and a miss leaves the stored foreign key in place rather
//! than an empty array.
//!
//! Bad populate entries (unknown path, non-reference field, unknown
//! model) are logged and skipped; the rest of the read proceeds.

mod join;
mod planner;

pub use join::{JoinSpec, JoinStage, JoinTarget, PopulateItem};
pub use planner::{apply, PopulationPlan, PopulationPlanner};

pub(crate) use planner::lookup;
