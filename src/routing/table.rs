//! Registered routes.
//!
//! # Design Decisions
//! - Append-only while building, read-only once handed to the dispatcher
//! - Registration order is preserved and observable through `walk`

use crate::routing::handler::{HandlerChain, HandlerFunc};

/// One registered (methods, path, handler chain) binding.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    methods: Vec<String>,
    path: String,
    handlers: HandlerChain,
}

impl RouteEntry {
    pub fn new(methods: Vec<String>, path: String, handlers: HandlerChain) -> Self {
        Self {
            methods,
            path,
            handlers,
        }
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handlers(&self) -> &HandlerChain {
        &self.handlers
    }

    /// Exact string comparison; method casing is the caller's business.
    pub fn allows(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }
}

/// The full set of registered routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RouteEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, other: RouteTable) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visit every entry in registration order, stopping at the first error.
    pub fn walk<F, E>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&[String], &str, &[HandlerFunc]) -> Result<(), E>,
    {
        for entry in &self.entries {
            visitor(entry.methods(), entry.path(), entry.handlers().handlers())?;
        }
        Ok(())
    }
}

impl IntoIterator for RouteTable {
    type Item = RouteEntry;
    type IntoIter = std::vec::IntoIter<RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
