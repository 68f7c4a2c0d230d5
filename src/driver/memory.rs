//! In-memory document store
//!
//! A `DocumentStore` for tests and examples: collections are vectors
//! behind one lock, filters are exact-equality matches on (possibly
//! dotted) keys, joins are equality lookups against sibling
//! collections. Pipeline joins are not evaluated; they produce an
//! empty match set.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::populate::lookup;

use super::{DocumentStore, DriverFuture, ReadQuery};

/// Lock-guarded in-memory collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.read(|data| data.get(collection).map_or(0, Vec::len))
    }

    /// Whether a collection is empty or missing.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<String, Vec<Value>>) -> T) -> T {
        match self.collections.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut HashMap<String, Vec<Value>>) -> T) -> T {
        match self.collections.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn insert<'a>(
        &'a self,
        collection: &'a str,
        documents: Vec<Value>,
    ) -> DriverFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let stored = self.write(|data| {
                let slot = data.entry(collection.to_string()).or_default();
                let mut stored = Vec::with_capacity(documents.len());
                for mut document in documents {
                    if let Some(map) = document.as_object_mut() {
                        if !map.contains_key("_id") {
                            map.insert(
                                "_id".to_string(),
                                Value::from(Uuid::new_v4().to_string()),
                            );
                        }
                    }
                    slot.push(document.clone());
                    stored.push(document);
                }
                stored
            });
            Ok(stored)
        })
    }

    fn find<'a>(&'a self, collection: &'a str, query: ReadQuery) -> DriverFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let results = self.read(|data| {
                let docs = data.get(collection).cloned().unwrap_or_default();
                let mut out: Vec<Value> = docs
                    .into_iter()
                    .filter(|doc| matches_filter(doc, &query.filter))
                    .collect();
                if let Some(limit) = query.limit {
                    out.truncate(limit);
                }

                for doc in &mut out {
                    for path in query.projection.keys() {
                        let segments: Vec<&str> = path.split('.').collect();
                        remove_path(doc, &segments);
                    }
                    for stage in &query.joins {
                        run_join(doc, stage, &query.projection, data);
                    }
                }
                out
            });
            Ok(results)
        })
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        filter: Value,
        changes: Value,
    ) -> DriverFuture<'a, u64> {
        Box::pin(async move {
            let matched = self.write(|data| {
                let Some(docs) = data.get_mut(collection) else {
                    return 0;
                };
                let mut matched = 0;
                for doc in docs.iter_mut() {
                    if !matches_filter(doc, &filter) {
                        continue;
                    }
                    matched += 1;
                    if let Some(change_map) = changes.as_object() {
                        for (path, value) in change_map {
                            let segments: Vec<&str> = path.split('.').collect();
                            set_path(doc, &segments, value.clone());
                        }
                    }
                }
                matched
            });
            Ok(matched)
        })
    }

    fn remove<'a>(&'a self, collection: &'a str, filter: Value) -> DriverFuture<'a, u64> {
        Box::pin(async move {
            let removed = self.write(|data| {
                let Some(docs) = data.get_mut(collection) else {
                    return 0;
                };
                let before = docs.len();
                docs.retain(|doc| !matches_filter(doc, &filter));
                (before - docs.len()) as u64
            });
            Ok(removed)
        })
    }
}

/// Every filter key must equal the document value at that (dotted)
/// path. A missing field never matches.
fn matches_filter(doc: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        None => true,
        Some(map) => map.iter().all(|(path, expected)| {
            lookup(doc, path).map_or(false, |actual| actual == expected)
        }),
    }
}

fn run_join(
    doc: &mut Value,
    stage: &crate::populate::JoinStage,
    projection: &Map<String, Value>,
    data: &HashMap<String, Vec<Value>>,
) {
    let (Some(local_field), Some(foreign_field)) =
        (&stage.spec.local_field, &stage.spec.foreign_field)
    else {
        // Pipeline joins are not evaluated here.
        if let Some(map) = doc.as_object_mut() {
            map.insert(stage.spec.as_field.clone(), Value::Array(Vec::new()));
        }
        return;
    };

    let local = lookup(doc, local_field).cloned();
    let foreign_docs = data.get(&stage.spec.from).cloned().unwrap_or_default();

    let mut matches: Vec<Value> = match &local {
        None => Vec::new(),
        Some(local) => foreign_docs
            .into_iter()
            .filter(|candidate| {
                lookup(candidate, foreign_field)
                    .map_or(false, |key| matches_key(local, key))
            })
            .collect(),
    };

    // Foreign-path exclusions apply to the joined documents.
    if let Some(target) = &stage.target {
        let prefix = format!("{}.", target.path);
        for path in projection.keys() {
            if let Some(inner) = path.strip_prefix(&prefix) {
                let segments: Vec<&str> = inner.split('.').collect();
                for candidate in &mut matches {
                    remove_path(candidate, &segments);
                }
            }
        }
    }

    if let Some(map) = doc.as_object_mut() {
        map.insert(stage.spec.as_field.clone(), Value::Array(matches));
    }
}

fn matches_key(local: &Value, foreign: &Value) -> bool {
    local == foreign || local.as_array().map_or(false, |keys| keys.contains(foreign))
}

/// Remove a dotted path, descending through array elements.
fn remove_path(value: &mut Value, segments: &[&str]) {
    match value {
        Value::Array(items) => {
            for item in items {
                remove_path(item, segments);
            }
        }
        Value::Object(map) => match segments {
            [] => {}
            [leaf] => {
                map.remove(*leaf);
            }
            [head, rest @ ..] => {
                if let Some(child) = map.get_mut(*head) {
                    remove_path(child, rest);
                }
            }
        },
        _ => {}
    }
}

/// Set a dotted path, creating intermediate objects.
fn set_path(value: &mut Value, segments: &[&str], new_value: Value) {
    match segments {
        [] => {}
        [leaf] => {
            if let Some(map) = value.as_object_mut() {
                map.insert(leaf.to_string(), new_value);
            }
        }
        [head, rest @ ..] => {
            let Some(map) = value.as_object_mut() else {
                return;
            };
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_path(child, rest, new_value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = MemoryStore::new();
        let stored = store
            .insert("users", vec![json!({ "name": "Ada" })])
            .await
            .unwrap();
        assert!(stored[0]["_id"].is_string());
        assert_eq!(store.len("users"), 1);
    }

    #[tokio::test]
    async fn test_find_filters_and_projects() {
        let store = MemoryStore::new();
        store
            .insert(
                "users",
                vec![
                    json!({ "_id": "u1", "name": "Ada", "password": "x" }),
                    json!({ "_id": "u2", "name": "Bob", "password": "y" }),
                ],
            )
            .await
            .unwrap();

        let mut projection = Map::new();
        projection.insert("password".to_string(), Value::from(0));
        let query = ReadQuery {
            filter: json!({ "name": "Ada" }),
            projection,
            joins: Vec::new(),
            limit: None,
        };
        let found = store.find("users", query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["_id"], "u1");
        assert!(found[0].get("password").is_none());
    }

    #[tokio::test]
    async fn test_projection_descends_into_arrays() {
        let store = MemoryStore::new();
        store
            .insert(
                "users",
                vec![json!({ "_id": "u1", "pets": [{ "name": "Pluto", "age": 5 }] })],
            )
            .await
            .unwrap();

        let mut projection = Map::new();
        projection.insert("pets.age".to_string(), Value::from(0));
        let query = ReadQuery {
            filter: json!({}),
            projection,
            joins: Vec::new(),
            limit: None,
        };
        let found = store.find("users", query).await.unwrap();
        assert_eq!(found[0]["pets"], json!([{ "name": "Pluto" }]));
    }

    #[tokio::test]
    async fn test_equality_join_stages_matches() {
        use crate::populate::{JoinSpec, JoinStage, JoinTarget};

        let store = MemoryStore::new();
        store
            .insert("user", vec![json!({ "_id": "u1", "name": "Ada" })])
            .await
            .unwrap();
        store
            .insert("post", vec![json!({ "_id": "p1", "author": "u1" })])
            .await
            .unwrap();

        let query = ReadQuery {
            filter: json!({}),
            projection: Map::new(),
            joins: vec![JoinStage {
                spec: JoinSpec {
                    from: "user".into(),
                    as_field: "_populated_author".into(),
                    local_field: Some("author".into()),
                    foreign_field: Some("_id".into()),
                    let_vars: None,
                    pipeline: None,
                },
                target: Some(JoinTarget {
                    path: "author".into(),
                    to_one: true,
                }),
            }],
            limit: None,
        };
        let found = store.find("post", query).await.unwrap();
        assert_eq!(found[0]["_populated_author"][0]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_update_merges_dotted_paths() {
        let store = MemoryStore::new();
        store
            .insert("users", vec![json!({ "_id": "u1", "profile": { "bio": "a" } })])
            .await
            .unwrap();

        let matched = store
            .update(
                "users",
                json!({ "_id": "u1" }),
                json!({ "profile.bio": "b", "name": "Ada" }),
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let found = store
            .find("users", ReadQuery { filter: json!({ "_id": "u1" }), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(found[0]["profile"]["bio"], "b");
        assert_eq!(found[0]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_remove_counts() {
        let store = MemoryStore::new();
        store
            .insert(
                "users",
                vec![json!({ "_id": "u1", "role": "admin" }), json!({ "_id": "u2", "role": "user" })],
            )
            .await
            .unwrap();

        let removed = store.remove("users", json!({ "role": "admin" })).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len("users"), 1);
    }
}
