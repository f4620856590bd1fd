//! Label remapping (account splitting)
//!
//! When a transfer would close a cycle, the destination account is split
//! into a fresh chronological self: the old label becomes a permanent alias
//! for a newly minted label. The resolver owns the remapping table — a
//! forest of chains — and is passed explicitly to whatever needs resolution;
//! there is no module-level state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur remapping labels
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolverError {
    #[error("redundant split of '{label}': minted terminus '{terminus}' already exists")]
    RedundantSplit { label: String, terminus: String },
}

/// Remapping table from account labels to their current selves
///
/// # Example
/// ```
/// use fund_tracer_core_rs::LabelResolver;
///
/// let mut resolver = LabelResolver::new();
/// assert_eq!(resolver.resolve("A"), "A");
///
/// resolver.split("A").unwrap();
/// assert_eq!(resolver.resolve("A"), "A--1");
/// assert_eq!(resolver.resolution_chain("A"), vec!["A", "A--1"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelResolver {
    /// alias -> the label that superseded it
    next: HashMap<String, String>,
    /// base label -> number of splits minted so far
    splits: HashMap<String, u32>,
}

impl LabelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the remapping chain to its currently-active terminus.
    ///
    /// Idempotent: resolving an already-resolved label is a no-op.
    pub fn resolve(&self, label: &str) -> String {
        let mut current = label;
        while let Some(next) = self.next.get(current) {
            current = next;
        }
        current.to_string()
    }

    /// Full chain from the original label to its terminus, oldest first.
    pub fn resolution_chain(&self, label: &str) -> Vec<String> {
        let mut chain = vec![label.to_string()];
        let mut current = label;
        while let Some(next) = self.next.get(current) {
            chain.push(next.clone());
            current = next;
        }
        chain
    }

    /// True when `label` is not an alias for anything newer.
    pub fn is_terminus(&self, label: &str) -> bool {
        !self.next.contains_key(label)
    }

    /// Mint a fresh terminus for `base` and remap the old terminus onto it.
    pub fn split(&mut self, base: &str) -> Result<String, ResolverError> {
        let terminus = self.resolve(base);
        let count = self.splits.get(base).copied().unwrap_or(0) + 1;
        let minted = format!("{base}--{count}");
        if !self.is_terminus(&minted) || minted == terminus {
            return Err(ResolverError::RedundantSplit {
                label: base.to_string(),
                terminus: minted,
            });
        }
        self.next.insert(terminus, minted.clone());
        self.splits.insert(base.to_string(), count);
        Ok(minted)
    }
}
