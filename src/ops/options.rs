//! Per-call options
//!
//! Constructed per operation and discarded afterwards; hooks receive a
//! reference to the options of the call that triggered them.

use crate::populate::PopulateItem;

/// Options for one operation.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Visibility override directives for reads (`-path` whitelists)
    pub blacklist: Vec<String>,
    /// Relations to populate on reads
    pub populate: Vec<PopulateItem>,
    /// `Some(false)` suppresses timestamp recomputation for this call
    pub timestamps: Option<bool>,
    /// Read limit
    pub limit: Option<usize>,
}

impl CallOptions {
    /// Override directives for this call.
    pub fn blacklist(mut self, directives: &[&str]) -> Self {
        self.blacklist = directives.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Populate the given relation paths.
    pub fn populate(mut self, items: Vec<PopulateItem>) -> Self {
        self.populate = items;
        self
    }

    /// Suppress timestamp recomputation.
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = Some(false);
        self
    }

    /// Limit the number of documents read.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
