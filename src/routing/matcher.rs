//! Route matching logic.
//!
//! # Responsibilities
//! - Compile the route table into a path lookup structure (once, at startup)
//! - Resolve a request path to its candidate routes and path variables
//! - Pick the route whose method set contains the request method
//!
//! # Design Decisions
//! - Pattern compilation and variable extraction are delegated to `matchit`
//!   (`{name}` segments, `{*rest}` catch-alls)
//! - Routes sharing a path are grouped; the first registered one wins
//! - Method mismatch is reported separately from "no such path"
//! - Path variables are percent-decoded; matching runs on the raw path

use std::collections::HashMap;
use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::routing::table::{RouteEntry, RouteTable};

/// Error raised when the table cannot be compiled.
#[derive(Debug, thiserror::Error)]
#[error("invalid route `{path}`: {source}")]
pub struct RouteError {
    pub path: String,
    #[source]
    pub source: matchit::InsertError,
}

/// Outcome of resolving a request.
#[derive(Debug)]
pub enum Resolution {
    /// A route accepts this method and path.
    Matched {
        entry: Arc<RouteEntry>,
        params: HashMap<String, String>,
    },
    /// The path exists but no route lists the method.
    MethodNotAllowed { allowed: Vec<String> },
    /// Nothing is registered for the path.
    NotFound,
    /// A path variable does not decode to UTF-8.
    InvalidParam { name: String },
}

/// Compiled, immutable path lookup.
pub struct PathMatcher {
    inner: matchit::Router<Vec<Arc<RouteEntry>>>,
    routes: usize,
}

impl PathMatcher {
    pub fn new(table: RouteTable) -> Result<Self, RouteError> {
        let mut by_path: Vec<(String, Vec<Arc<RouteEntry>>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut routes = 0;

        for entry in table {
            routes += 1;
            let path = entry.path().to_string();
            match index.get(&path) {
                Some(&i) => by_path[i].1.push(Arc::new(entry)),
                None => {
                    index.insert(path.clone(), by_path.len());
                    by_path.push((path, vec![Arc::new(entry)]));
                }
            }
        }

        let mut inner = matchit::Router::new();
        for (path, entries) in by_path {
            inner
                .insert(path.clone(), entries)
                .map_err(|source| RouteError { path, source })?;
        }

        Ok(Self { inner, routes })
    }

    /// Number of compiled route entries.
    pub fn len(&self) -> usize {
        self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }

    pub fn resolve(&self, method: &str, path: &str) -> Resolution {
        let matched = match self.inner.at(path) {
            Ok(m) => m,
            Err(_) => return Resolution::NotFound,
        };

        match matched.value.iter().find(|e| e.allows(method)) {
            Some(entry) => {
                let mut params = HashMap::new();
                for (name, raw) in matched.params.iter() {
                    match percent_decode_str(raw).decode_utf8() {
                        Ok(value) => {
                            params.insert(name.to_string(), value.into_owned());
                        }
                        Err(_) => {
                            return Resolution::InvalidParam {
                                name: name.to_string(),
                            }
                        }
                    }
                }
                Resolution::Matched {
                    entry: Arc::clone(entry),
                    params,
                }
            }
            None => {
                let mut allowed: Vec<String> = Vec::new();
                for m in matched.value.iter().flat_map(|e| e.methods().iter()) {
                    if !allowed.contains(m) {
                        allowed.push(m.clone());
                    }
                }
                Resolution::MethodNotAllowed { allowed }
            }
        }
    }
}

impl std::fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathMatcher").field("routes", &self.routes).finish()
    }
}
