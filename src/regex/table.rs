//! The method table and the dispatcher.
//!
//! Routes are grouped by method and kept in registration order. Dispatch walks
//! that order and stops at the first pattern that matches, so an earlier route
//! always shadows a later one that would match the same path.

use std::collections::HashMap;
use std::sync::OnceLock;

use http::Method;

use crate::error::RouteError;
use crate::handler::{BoxedHandler, Chain};
use crate::params::Params;
use crate::regex::pattern::Pattern;

/// One registered regex route.
pub(crate) struct Entry {
    pattern: Pattern,
    handlers: Vec<BoxedHandler>,
    composed: OnceLock<Chain>,
}

impl Entry {
    /// The full chain for this route: engine middleware, then router
    /// middleware, then the route's own handlers.
    ///
    /// Built on first use and reused afterwards. Concurrent first uses
    /// publish exactly one chain.
    pub(crate) fn compose(&self, global: &[BoxedHandler], shared: &[BoxedHandler]) -> &Chain {
        self.composed.get_or_init(|| {
            global.iter()
                .chain(shared)
                .chain(&self.handlers)
                .cloned()
                .collect()
        })
    }
}

/// Result of a successful dispatch.
pub struct Match<'a> {
    params: Params,
    entry: &'a Entry,
}

impl<'a> Match<'a> {
    pub fn params(&self) -> &Params { &self.params }

    /// The pattern source as it was registered.
    pub fn pattern(&self) -> &'a str { self.entry.pattern.source() }

    pub(crate) fn entry(&self) -> &'a Entry { self.entry }

    pub fn into_params(self) -> Params { self.params }
}

#[derive(Default)]
pub(crate) struct MethodTable {
    routes: HashMap<Method, Vec<Entry>>,
}

impl MethodTable {
    pub(crate) fn register(
        &mut self,
        method: Method,
        source: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<(), RouteError> {
        if handlers.is_empty() {
            return Err(RouteError::NoHandlers { method, pattern: source.to_owned() });
        }
        let entries = self.routes.entry(method.clone()).or_default();
        if entries.iter().any(|e| e.pattern.source() == source) {
            return Err(RouteError::Duplicate { method, pattern: source.to_owned() });
        }
        let pattern = Pattern::new(source)?;
        entries.push(Entry { pattern, handlers, composed: OnceLock::new() });
        Ok(())
    }

    pub(crate) fn dispatch(&self, method: &Method, path: &str) -> Option<Match<'_>> {
        self.routes.get(method)?
            .iter()
            .find_map(|entry| {
                let params = entry.pattern.captures(path)?;
                Some(Match { params, entry })
            })
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }
}
