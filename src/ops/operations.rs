//! CRUD operations
//!
//! Phase order per operation:
//!
//! - writes: before-hook → beforeValidate → validate → afterValidate →
//!   driver call → after-hook
//! - reads: beforeFind → resolve projection + plan population → driver
//!   call → unwrap population → afterFind
//!
//! The driver is awaited exactly once per operation, and never
//! concurrently with this operation's hooks.

use serde_json::Value;

use crate::driver::{DocumentStore, ReadQuery};
use crate::hooks::{HookContext, HookPipeline, HookPoint};
use crate::model::{Model, ModelRegistry};
use crate::populate::{self, PopulationPlanner};
use crate::validation::{Action, ValidationContext, ValidationEngine};
use crate::visibility::VisibilityResolver;

use super::errors::{OpError, OpResult};
use super::options::CallOptions;

/// CRUD entry points for one model against one driver.
pub struct Operations<'a> {
    model: &'a Model,
    registry: &'a ModelRegistry,
    store: &'a dyn DocumentStore,
}

impl<'a> Operations<'a> {
    /// Create an operations handle.
    pub fn new(model: &'a Model, registry: &'a ModelRegistry, store: &'a dyn DocumentStore) -> Self {
        Self {
            model,
            registry,
            store,
        }
    }

    /// Insert a document, or an array of documents. Returns the stored
    /// result in the input's shape.
    pub async fn insert(&self, data: Value, options: &CallOptions) -> OpResult<Value> {
        let raw = data.clone();
        let ctx = self.hook_context("insert", &raw, options);
        let many = data.is_array();

        let data = HookPipeline::run(self.model.hooks(), HookPoint::BeforeInsert, &ctx, data).await?;
        let pruned = self.validated(data, Action::Insert, &ctx, options).await?;

        let documents = match pruned {
            Value::Array(items) => items,
            single => vec![single],
        };
        let mut stored = self.store.insert(self.model.collection(), documents).await?;

        let result = if many {
            Value::Array(stored)
        } else {
            stored.pop().unwrap_or(Value::Null)
        };
        let result =
            HookPipeline::run(self.model.hooks(), HookPoint::AfterInsert, &ctx, result).await?;
        Ok(result)
    }

    /// Update documents matching `filter` with the validated changes.
    /// Returns the matched count.
    pub async fn update(
        &self,
        filter: Value,
        changes: Value,
        options: &CallOptions,
    ) -> OpResult<u64> {
        let raw = changes.clone();
        let ctx = self.hook_context("update", &raw, options);

        let changes =
            HookPipeline::run(self.model.hooks(), HookPoint::BeforeUpdate, &ctx, changes).await?;
        let pruned = self.validated(changes, Action::Update, &ctx, options).await?;

        let matched = self
            .store
            .update(self.model.collection(), filter, pruned.clone())
            .await?;

        HookPipeline::run(self.model.hooks(), HookPoint::AfterUpdate, &ctx, pruned).await?;
        Ok(matched)
    }

    /// Remove documents matching `filter`. Returns the removed count.
    pub async fn remove(&self, filter: Value, options: &CallOptions) -> OpResult<u64> {
        let raw = Value::Null;
        let ctx = self.hook_context("remove", &raw, options);

        let filter =
            HookPipeline::run(self.model.hooks(), HookPoint::BeforeRemove, &ctx, filter).await?;
        let removed = self.store.remove(self.model.collection(), filter).await?;
        HookPipeline::run(
            self.model.hooks(),
            HookPoint::AfterRemove,
            &ctx,
            Value::from(removed),
        )
        .await?;
        Ok(removed)
    }

    /// Read documents matching `filter`, applying the resolved
    /// projection and any requested population.
    pub async fn find(&self, filter: Value, options: &CallOptions) -> OpResult<Vec<Value>> {
        let raw = Value::Null;
        let ctx = self.hook_context("find", &raw, options);

        let filter =
            HookPipeline::run(self.model.hooks(), HookPoint::BeforeFind, &ctx, filter).await?;

        let plan = PopulationPlanner::new(self.registry).plan(self.model, &options.populate);
        let projection = VisibilityResolver::new(self.registry).resolve_with(
            self.model,
            &plan.directives,
            &options.blacklist,
        );

        let query = ReadQuery {
            filter,
            projection: projection.to_exclusion_map(),
            joins: plan.stages.clone(),
            limit: options.limit,
        };
        let documents = self.store.find(self.model.collection(), query).await?;
        let documents = populate::apply(documents, &plan.stages);

        let result = HookPipeline::run(
            self.model.hooks(),
            HookPoint::AfterFind,
            &ctx,
            Value::Array(documents),
        )
        .await?;
        Ok(match result {
            Value::Array(items) => items,
            other => vec![other],
        })
    }

    /// Read the first document matching `filter`.
    pub async fn find_one(&self, filter: Value, options: &CallOptions) -> OpResult<Option<Value>> {
        let mut limited = options.clone();
        limited.limit = Some(1);
        let mut documents = self.find(filter, &limited).await?;
        Ok(if documents.is_empty() {
            None
        } else {
            Some(documents.remove(0))
        })
    }

    /// Run the validate phase (wrapped in its hooks) for a write.
    async fn validated(
        &self,
        data: Value,
        action: Action,
        ctx: &HookContext<'_>,
        options: &CallOptions,
    ) -> OpResult<Value> {
        let data =
            HookPipeline::run(self.model.hooks(), HookPoint::BeforeValidate, ctx, data).await?;

        let mut validation_ctx = ValidationContext::for_model(self.model, action);
        if let Some(timestamps) = options.timestamps {
            validation_ctx = validation_ctx.with_timestamps(timestamps);
        }

        let engine = ValidationEngine::new(self.model);
        let (errors, pruned) = engine.validate(&data, &validation_ctx);
        if !errors.is_empty() {
            return Err(OpError::Validation(errors));
        }

        let pruned =
            HookPipeline::run(self.model.hooks(), HookPoint::AfterValidate, ctx, pruned).await?;
        Ok(pruned)
    }

    fn hook_context<'c>(
        &'c self,
        action: &'static str,
        raw: &'c Value,
        options: &'c CallOptions,
    ) -> HookContext<'c> {
        HookContext {
            model: self.model,
            action,
            raw,
            options,
        }
    }
}
