//! Compiled models
//!
//! Built once by `ModelRegistry::define`, immutable afterwards except
//! the blacklists, which callers may swap between calls and which are
//! re-read on every operation.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::hooks::HookSet;
use crate::paths;
use crate::schema::{CompileDiagnostic, FieldKind, FieldNode, IndexSpec};

/// A defined model.
#[derive(Debug)]
pub struct Model {
    name: String,
    collection: String,
    tree: FieldNode,
    insert_blacklist: RwLock<Vec<String>>,
    update_blacklist: RwLock<Vec<String>>,
    find_blacklist: RwLock<Vec<String>>,
    messages: HashMap<String, HashMap<String, String>>,
    hooks: HookSet,
    indexes: Vec<IndexSpec>,
    diagnostics: Vec<CompileDiagnostic>,
    timestamps: bool,
}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        name: String,
        collection: String,
        tree: FieldNode,
        insert_blacklist: Vec<String>,
        update_blacklist: Vec<String>,
        find_blacklist: Vec<String>,
        messages: HashMap<String, HashMap<String, String>>,
        hooks: HookSet,
        indexes: Vec<IndexSpec>,
        diagnostics: Vec<CompileDiagnostic>,
        timestamps: bool,
    ) -> Self {
        Self {
            name,
            collection,
            tree,
            insert_blacklist: RwLock::new(insert_blacklist),
            update_blacklist: RwLock::new(update_blacklist),
            find_blacklist: RwLock::new(find_blacklist),
            messages,
            hooks,
            indexes,
            diagnostics,
            timestamps,
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection the model persists to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The compiled field tree.
    pub fn tree(&self) -> &FieldNode {
        &self.tree
    }

    /// Hooks registered at definition time.
    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Index specs collected from the declaration.
    pub fn indexes(&self) -> &[IndexSpec] {
        &self.indexes
    }

    /// Compile diagnostics recorded at definition time.
    pub fn diagnostics(&self) -> &[CompileDiagnostic] {
        &self.diagnostics
    }

    /// Whether timestamp fields are injected.
    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    /// Custom message for a `(path, rule)` pair, if configured.
    pub fn message_for(&self, path: &str, rule: &str) -> Option<&str> {
        self.messages
            .get(path)
            .and_then(|rules| rules.get(rule))
            .map(String::as_str)
    }

    /// Current insert blacklist (fresh copy).
    pub fn insert_blacklist(&self) -> Vec<String> {
        read_list(&self.insert_blacklist)
    }

    /// Current update blacklist (fresh copy).
    pub fn update_blacklist(&self) -> Vec<String> {
        read_list(&self.update_blacklist)
    }

    /// Current find blacklist (fresh copy).
    pub fn find_blacklist(&self) -> Vec<String> {
        read_list(&self.find_blacklist)
    }

    /// Replace the insert blacklist.
    pub fn set_insert_blacklist(&self, paths: Vec<String>) {
        write_list(&self.insert_blacklist, paths);
    }

    /// Replace the update blacklist.
    pub fn set_update_blacklist(&self, paths: Vec<String>) {
        write_list(&self.update_blacklist, paths);
    }

    /// Replace the find blacklist.
    pub fn set_find_blacklist(&self, paths: Vec<String>) {
        write_list(&self.find_blacklist, paths);
    }

    /// Every declared field path, in tree order.
    pub fn field_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(&self.tree, &mut out);
        out
    }

    /// Readable field paths: all field paths minus the find blacklist
    /// (and everything under it). Recomputed on every call because the
    /// blacklist may have changed.
    pub fn find_whitelist(&self) -> Vec<String> {
        let blacklist: Vec<String> = self
            .find_blacklist()
            .iter()
            .filter(|entry| !entry.starts_with('-'))
            .map(|entry| paths::strip_indices(entry))
            .collect();
        self.field_paths()
            .into_iter()
            .filter(|path| {
                !blacklist
                    .iter()
                    .any(|b| paths::is_self_or_descendant(path, b))
            })
            .collect()
    }
}

fn read_list(lock: &RwLock<Vec<String>>) -> Vec<String> {
    match lock.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_list(lock: &RwLock<Vec<String>>, paths: Vec<String>) {
    match lock.write() {
        Ok(mut guard) => *guard = paths,
        Err(poisoned) => *poisoned.into_inner() = paths,
    }
}

fn collect_paths(node: &FieldNode, out: &mut Vec<String>) {
    match &node.kind {
        FieldKind::Object { children } => {
            for child in children {
                out.push(child.path.clone());
                collect_paths(child, out);
            }
        }
        // The element template shares the array's path; only its
        // children add new paths.
        FieldKind::Array { element } => collect_paths(element, out),
        FieldKind::Leaf => {}
    }
}
