//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve each request to a route entry and its path variables
//! - Build the per-request context and run the entry's handler chain
//! - Turn a chain failure into exactly one error response
//! - Record request duration
//!
//! # Design Decisions
//! - Holds only immutable state; one instance serves any number of requests
//! - No retries: a failing handler produces one error response

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::response::Response;

use crate::http::context::Context;
use crate::http::response::{bad_request, error_response, method_not_allowed, not_found};
use crate::http::Collaborators;
use crate::net::connection::InFlightTracker;
use crate::observability::metrics;
use crate::routing::{PathMatcher, Resolution, RouteError, RouteTable};

/// Binds a frozen route table to the path matcher and runs matched chains.
#[derive(Debug)]
pub struct Dispatcher {
    matcher: PathMatcher,
    collaborators: Arc<Collaborators>,
    in_flight: InFlightTracker,
}

impl Dispatcher {
    pub fn new(table: RouteTable, collaborators: Collaborators) -> Result<Self, RouteError> {
        let matcher = PathMatcher::new(table)?;
        tracing::debug!(routes = matcher.len(), "Route table compiled");
        Ok(Self {
            matcher,
            collaborators: Arc::new(collaborators),
            in_flight: InFlightTracker::new(),
        })
    }

    /// Tracker of requests currently inside `dispatch`.
    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }

    /// Serve one request. `remote_addr` is the transport peer, if known.
    pub async fn dispatch(&self, request: Request<Body>, remote_addr: Option<SocketAddr>) -> Response {
        let begin = Instant::now();
        let guard = self.in_flight.track();

        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let (entry, params) = match self.matcher.resolve(method.as_str(), &path) {
            Resolution::Matched { entry, params } => (entry, params),
            Resolution::MethodNotAllowed { allowed } => {
                tracing::debug!(method = %method, path = %path, "Method not allowed");
                let response = method_not_allowed(&allowed);
                metrics::record_request(method.as_str(), response.status().as_u16(), begin);
                return response;
            }
            Resolution::InvalidParam { name } => {
                tracing::debug!(method = %method, path = %path, param = %name, "Undecodable path variable");
                let response = bad_request(&format!("invalid path variable `{}`", name));
                metrics::record_request(method.as_str(), response.status().as_u16(), begin);
                return response;
            }
            Resolution::NotFound => {
                tracing::debug!(method = %method, path = %path, "No route matched");
                let response = not_found();
                metrics::record_request(method.as_str(), response.status().as_u16(), begin);
                return response;
            }
        };

        let version = request.version();
        let uri = request.uri().to_string();
        let mut ctx = Context::new(
            request,
            params,
            remote_addr.map(|a| a.to_string()),
            Arc::clone(&self.collaborators),
        );
        tracing::info!(seq = guard.seq().as_u64(), "{:?} {} {} {}", version, method, uri, ctx.client_ip());

        let response = match entry.handlers().call(&mut ctx).await {
            Ok(()) => {
                let writer = ctx.into_writer();
                if !writer.is_written() {
                    tracing::debug!(path = %path, "Chain staged nothing; answering empty 200");
                }
                writer.into_response()
            }
            Err(err) => {
                tracing::error!(
                    request_id = ctx.request_id().unwrap_or("unknown"),
                    status = err.status().as_u16(),
                    error = %err,
                    "Handler failed"
                );
                error_response(&err)
            }
        };

        tracing::info!(
            seq = guard.seq().as_u64(),
            status = response.status().as_u16(),
            elapsed = ?begin.elapsed(),
            "done"
        );
        metrics::record_request(method.as_str(), response.status().as_u16(), begin);
        response
    }
}

/// Axum fallback service entry point.
pub(crate) async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    dispatcher.dispatch(request, remote_addr).await
}
