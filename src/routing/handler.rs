//! Handler functions and the chains they form.
//!
//! # Responsibilities
//! - Wrap async closures into cheaply clonable `HandlerFunc`s
//! - Run a route's handlers in order against one request context
//! - Stop at the first failure
//!
//! # Design Decisions
//! - Handlers borrow the context mutably; state flows through its scratch map
//! - Chains are immutable once built and shared via `Arc`
//! - Optional labels replace runtime name lookup for diagnostics

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::BoxFuture;

use crate::http::context::Context;
use crate::http::error::HandlerResult;

type DynHandler = dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync;

/// A single step of a handler chain.
#[derive(Clone)]
pub struct HandlerFunc {
    name: Option<Arc<str>>,
    inner: Arc<DynHandler>,
}

impl HandlerFunc {
    /// Wrap a closure returning a boxed future.
    ///
    /// ```ignore
    /// let h = HandlerFunc::new(|ctx| Box::pin(async move {
    ///     ctx.text(StatusCode::OK, "pong");
    ///     Ok(())
    /// }));
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        Self {
            name: None,
            inner: Arc::new(f),
        }
    }

    /// Same as [`HandlerFunc::new`], with a label used in debug logs.
    pub fn named<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            inner: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }

    /// Run this handler against the context.
    pub fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        (self.inner)(ctx)
    }
}

impl fmt::Debug for HandlerFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerFunc").field(&self.name()).finish()
    }
}

/// Shorthand for [`HandlerFunc::new`].
pub fn handler<F>(f: F) -> HandlerFunc
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    HandlerFunc::new(f)
}

/// Ordered, immutable handlers bound to one route.
#[derive(Clone, Debug, Default)]
pub struct HandlerChain {
    handlers: Arc<[HandlerFunc]>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<HandlerFunc>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }

    pub fn handlers(&self) -> &[HandlerFunc] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute handlers in order, returning the first failure.
    ///
    /// Handlers after a failing one never run. An empty chain succeeds.
    pub async fn call(&self, ctx: &mut Context) -> HandlerResult {
        let begin = Instant::now();
        for h in self.handlers.iter() {
            tracing::debug!(handler = h.name(), elapsed = ?begin.elapsed(), "Calling handler");
            if let Err(err) = h.call(ctx).await {
                tracing::debug!(
                    handler = h.name(),
                    elapsed = ?begin.elapsed(),
                    error = %err,
                    "Handler failed; chain stopped"
                );
                return Err(err);
            }
        }
        tracing::debug!(elapsed = ?begin.elapsed(), "Handler chain finished");
        Ok(())
    }
}
