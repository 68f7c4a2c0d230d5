//! Hook pipeline
//!
//! Sequential callback chain in the same shape as an execution
//! middleware pipeline: trait objects with boxed-future signatures,
//! data threaded from one callback to the next. Context is an explicit
//! parameter; hooks never rely on ambient state.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::model::Model;
use crate::ops::CallOptions;

use super::errors::HookResult;

/// Boxed future returned by a hook.
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = HookResult<Value>> + Send + 'a>>;

/// The points a hook can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeRemove,
    AfterRemove,
    BeforeFind,
    AfterFind,
    BeforeValidate,
    AfterValidate,
}

impl HookPoint {
    /// Returns the hook point name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeforeInsert => "beforeInsert",
            Self::AfterInsert => "afterInsert",
            Self::BeforeUpdate => "beforeUpdate",
            Self::AfterUpdate => "afterUpdate",
            Self::BeforeRemove => "beforeRemove",
            Self::AfterRemove => "afterRemove",
            Self::BeforeFind => "beforeFind",
            Self::AfterFind => "afterFind",
            Self::BeforeValidate => "beforeValidate",
            Self::AfterValidate => "afterValidate",
        }
    }
}

/// Call-site context handed to every hook.
///
/// `raw` is the data as the caller supplied it, before validation; for
/// reads and removes it is `Value::Null`.
pub struct HookContext<'a> {
    /// The model the operation runs against
    pub model: &'a Model,
    /// Operation name: `insert`, `update`, `remove`, or `find`
    pub action: &'static str,
    /// Pre-validation input data
    pub raw: &'a Value,
    /// The call's options
    pub options: &'a CallOptions,
}

/// A single hook callback.
pub trait Hook: Send + Sync {
    /// Run the callback. The returned future resolves with the data to
    /// hand to the next callback, or an error that aborts the phase.
    fn run<'a>(&'a self, ctx: &'a HookContext<'a>, data: Value) -> HookFuture<'a>;
}

struct FnHook<F>(F);

impl<F> Hook for FnHook<F>
where
    F: Fn(&HookContext<'_>, Value) -> HookFuture<'static> + Send + Sync,
{
    fn run<'a>(&'a self, ctx: &'a HookContext<'a>, data: Value) -> HookFuture<'a> {
        (self.0)(ctx, data)
    }
}

/// Wrap a closure as a hook. The closure may read the context while it
/// runs, but the future it returns must own everything it needs;
/// implement `Hook` directly for callbacks that have to borrow the
/// context across an await.
pub fn hook_fn<F>(f: F) -> Arc<dyn Hook>
where
    F: Fn(&HookContext<'_>, Value) -> HookFuture<'static> + Send + Sync + 'static,
{
    Arc::new(FnHook(f))
}

/// Ordered callbacks per hook point, fixed at model-definition time.
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: HashMap<HookPoint, Vec<Arc<dyn Hook>>>,
}

impl HookSet {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook at the given point (builder style).
    pub fn on(mut self, point: HookPoint, hook: Arc<dyn Hook>) -> Self {
        self.add(point, hook);
        self
    }

    /// Append a hook at the given point.
    pub fn add(&mut self, point: HookPoint, hook: Arc<dyn Hook>) {
        self.hooks.entry(point).or_default().push(hook);
    }

    /// Hooks registered at a point, in registration order.
    pub fn get(&self, point: HookPoint) -> &[Arc<dyn Hook>] {
        self.hooks.get(&point).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of hooks at a point.
    pub fn count(&self, point: HookPoint) -> usize {
        self.get(point).len()
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&'static str, usize)> = self
            .hooks
            .iter()
            .map(|(point, hooks)| (point.name(), hooks.len()))
            .collect();
        counts.sort();
        f.debug_struct("HookSet").field("hooks", &counts).finish()
    }
}

/// Runs the callbacks of one phase strictly in series.
pub struct HookPipeline;

impl HookPipeline {
    /// Thread `data` through every hook at `point`. The first failure
    /// aborts the phase and is returned unchanged.
    pub async fn run(
        set: &HookSet,
        point: HookPoint,
        ctx: &HookContext<'_>,
        data: Value,
    ) -> HookResult<Value> {
        let mut current = data;
        for hook in set.get(point) {
            current = hook.run(ctx, current).await?;
        }
        Ok(current)
    }
}
