//! Route group builder.
//!
//! # Responsibilities
//! - Accumulate a path prefix and inherited handlers down a tree of groups
//! - Bake the accumulated prefix and handlers into every registered route
//! - Offer verb shorthands and the five-route `crud` pattern
//!
//! # Design Decisions
//! - Building is synchronous and single-threaded; nothing is visible to the
//!   dispatcher until the tree is frozen with `into_table`
//! - A child copies its parent's handler list, it never aliases it
//! - No validation here; the path matcher owns malformed or duplicate paths

use axum::http::Method;

use crate::routing::handler::{HandlerChain, HandlerFunc};
use crate::routing::table::{RouteEntry, RouteTable};

/// A node of the route tree: prefix, inherited handlers, collected routes.
#[derive(Debug, Clone, Default)]
pub struct RouterGroup {
    prefix: String,
    handlers: Vec<HandlerFunc>,
    routes: RouteTable,
}

impl RouterGroup {
    /// Root group: empty prefix, no inherited handlers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Create a child group and populate it through `build`.
    ///
    /// The child's routes are appended to this group, in order, once `build`
    /// returns.
    pub fn group<F>(&mut self, prefix: &str, handlers: Vec<HandlerFunc>, build: F)
    where
        F: FnOnce(&mut RouterGroup),
    {
        let mut child = RouterGroup {
            prefix: format!("{}{}", self.prefix, prefix),
            handlers: self.combine(handlers),
            routes: RouteTable::new(),
        };
        build(&mut child);
        self.routes.extend(child.routes);
    }

    /// Register `handlers` for `path` under every method in `methods`.
    pub fn handle<M, S>(&mut self, methods: M, path: &str, handlers: Vec<HandlerFunc>)
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = RouteEntry::new(
            methods.into_iter().map(Into::into).collect(),
            format!("{}{}", self.prefix, path),
            HandlerChain::new(self.combine(handlers)),
        );
        tracing::trace!(methods = ?entry.methods(), path = entry.path(), handlers = entry.handlers().len(), "Route registered");
        self.routes.push(entry);
    }

    pub fn get(&mut self, path: &str, handlers: Vec<HandlerFunc>) {
        self.handle([Method::GET.as_str()], path, handlers);
    }

    pub fn post(&mut self, path: &str, handlers: Vec<HandlerFunc>) {
        self.handle([Method::POST.as_str()], path, handlers);
    }

    pub fn put(&mut self, path: &str, handlers: Vec<HandlerFunc>) {
        self.handle([Method::PUT.as_str()], path, handlers);
    }

    pub fn patch(&mut self, path: &str, handlers: Vec<HandlerFunc>) {
        self.handle([Method::PATCH.as_str()], path, handlers);
    }

    pub fn delete(&mut self, path: &str, handlers: Vec<HandlerFunc>) {
        self.handle([Method::DELETE.as_str()], path, handlers);
    }

    /// Register the five resource routes for `path`.
    ///
    /// Update is registered as `POST {path}/{id}`, not PUT or PATCH.
    pub fn crud(
        &mut self,
        path: &str,
        list: Vec<HandlerFunc>,
        create: Vec<HandlerFunc>,
        read: Vec<HandlerFunc>,
        update: Vec<HandlerFunc>,
        delete: Vec<HandlerFunc>,
    ) {
        let member = format!("{}/{{id}}", path);
        self.get(path, list);
        self.post(path, create);
        self.get(&member, read);
        self.post(&member, update);
        self.delete(&member, delete);
    }

    /// Visit every route registered so far, in registration order.
    pub fn walk<F, E>(&self, visitor: F) -> Result<(), E>
    where
        F: FnMut(&[String], &str, &[HandlerFunc]) -> Result<(), E>,
    {
        self.routes.walk(visitor)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Freeze the tree into its route table.
    pub fn into_table(self) -> RouteTable {
        self.routes
    }

    fn combine(&self, handlers: Vec<HandlerFunc>) -> Vec<HandlerFunc> {
        let mut all = Vec::with_capacity(self.handlers.len() + handlers.len());
        all.extend(self.handlers.iter().cloned());
        all.extend(handlers);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::HandlerFunc;

    fn noop(name: &'static str) -> HandlerFunc {
        HandlerFunc::named(name, |_ctx| Box::pin(async { Ok(()) }))
    }

    fn names(handlers: &[HandlerFunc]) -> Vec<String> {
        handlers.iter().map(|h| h.name().to_string()).collect()
    }

    fn collect(router: &RouterGroup) -> Vec<(Vec<String>, String, Vec<String>)> {
        let mut out = Vec::new();
        router
            .walk(|methods, path, handlers| {
                out.push((methods.to_vec(), path.to_string(), names(handlers)));
                Ok::<_, ()>(())
            })
            .unwrap();
        out
    }

    #[test]
    fn root_routes_have_no_prefix() {
        let mut router = RouterGroup::new();
        router.get("/ping", vec![noop("ping")]);

        let routes = collect(&router);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].0, vec!["GET"]);
        assert_eq!(routes[0].1, "/ping");
        assert_eq!(routes[0].2, vec!["ping"]);
    }

    #[test]
    fn nested_groups_concatenate_prefix_and_handlers() {
        let mut router = RouterGroup::new();
        router.group("/api", vec![noop("log")], |api| {
            api.group("/v1", vec![noop("auth"), noop("quota")], |v1| {
                v1.post("/users", vec![noop("create")]);
            });
            api.get("/health", vec![]);
        });

        let routes = collect(&router);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].1, "/api/v1/users");
        assert_eq!(routes[0].2, vec!["log", "auth", "quota", "create"]);
        assert_eq!(routes[1].1, "/api/health");
        assert_eq!(routes[1].2, vec!["log"]);
    }

    #[test]
    fn sibling_groups_do_not_share_handlers() {
        let mut router = RouterGroup::new();
        router.group("/a", vec![noop("a")], |a| {
            a.get("/x", vec![]);
        });
        router.group("/b", vec![noop("b")], |b| {
            b.get("/x", vec![]);
        });
        router.get("/root", vec![]);

        let routes = collect(&router);
        assert_eq!(routes[0].2, vec!["a"]);
        assert_eq!(routes[1].2, vec!["b"]);
        assert!(routes[2].2.is_empty());
    }

    #[test]
    fn child_routes_land_after_build_returns() {
        let mut router = RouterGroup::new();
        router.get("/first", vec![]);
        router.group("/g", vec![], |g| {
            g.get("/one", vec![]);
            g.get("/two", vec![]);
        });
        router.get("/last", vec![]);

        let paths: Vec<_> = collect(&router).into_iter().map(|r| r.1).collect();
        assert_eq!(paths, vec!["/first", "/g/one", "/g/two", "/last"]);
    }

    #[test]
    fn handle_keeps_methods_verbatim() {
        let mut router = RouterGroup::new();
        router.handle(["GET", "head"], "/both", vec![]);

        let routes = collect(&router);
        assert_eq!(routes[0].0, vec!["GET", "head"]);
        assert!(router.routes().entries()[0].allows("head"));
        assert!(!router.routes().entries()[0].allows("HEAD"));
    }

    #[test]
    fn crud_registers_five_routes() {
        let mut router = RouterGroup::new();
        router.crud(
            "/items",
            vec![noop("list")],
            vec![noop("create")],
            vec![noop("read")],
            vec![noop("update")],
            vec![noop("delete")],
        );

        let routes = collect(&router);
        let expected = [
            ("GET", "/items", "list"),
            ("POST", "/items", "create"),
            ("GET", "/items/{id}", "read"),
            ("POST", "/items/{id}", "update"),
            ("DELETE", "/items/{id}", "delete"),
        ];
        assert_eq!(routes.len(), expected.len());
        for (route, (method, path, name)) in routes.iter().zip(expected) {
            assert_eq!(route.0, vec![method]);
            assert_eq!(route.1, path);
            assert_eq!(route.2, vec![name]);
        }
    }

    #[test]
    fn crud_inside_group_inherits() {
        let mut router = RouterGroup::new();
        router.group("/admin", vec![noop("auth")], |admin| {
            admin.crud("/users", vec![], vec![], vec![], vec![], vec![noop("remove")]);
        });

        let routes = collect(&router);
        assert_eq!(routes[4].1, "/admin/users/{id}");
        assert_eq!(routes[4].2, vec!["auth", "remove"]);
    }

    #[test]
    fn walk_stops_at_first_error() {
        let mut router = RouterGroup::new();
        router.get("/a", vec![]);
        router.get("/b", vec![]);
        router.get("/c", vec![]);

        let mut visited = Vec::new();
        let result = router.walk(|_, path, _| {
            visited.push(path.to_string());
            if path == "/b" {
                Err("stop")
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("stop"));
        assert_eq!(visited, vec!["/a", "/b"]);
    }
}
