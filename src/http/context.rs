//! Per-request context handed to every handler of a chain.
//!
//! # Responsibilities
//! - Read handle: request parts and (not yet consumed) body
//! - Write handle: the staged response
//! - Resolved path variables and a scratch map for handler-to-handler values
//!
//! # Design Decisions
//! - Owned by the single task serving the request; no interior locking
//! - Collaborator settings are shared read-only through `Arc`

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::http::bind::{self, FormValues};
use crate::http::error::HandlerError;
use crate::http::render::{self, RenderError};
use crate::http::request::{self, X_REQUEST_ID};
use crate::http::response::ResponseWriter;
use crate::http::Collaborators;

type Value = Box<dyn Any + Send + Sync>;

pub struct Context {
    parts: Parts,
    body: Option<Body>,
    params: HashMap<String, String>,
    remote_addr: Option<String>,
    values: HashMap<String, Value>,
    form: Option<FormValues>,
    writer: ResponseWriter,
    collaborators: Arc<Collaborators>,
}

impl Context {
    pub fn new(
        request: Request<Body>,
        params: HashMap<String, String>,
        remote_addr: Option<String>,
        collaborators: Arc<Collaborators>,
    ) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body: Some(body),
            params,
            remote_addr,
            values: HashMap::new(),
            form: None,
            writer: ResponseWriter::new(),
            collaborators,
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn request(&self) -> &Parts {
        &self.parts
    }

    /// Value of a request header, empty when absent or not valid text.
    pub fn header(&self, name: &str) -> &str {
        self.parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// Value of a path variable, empty when the route has no such variable.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    pub fn client_ip(&self) -> String {
        request::client_ip(&self.parts.headers, self.remote_addr.as_deref())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.parts
            .headers
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }

    /// Store a value for later handlers of the same request.
    pub fn set<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Fetch a stored value; `None` if missing or of another type.
    pub fn get<T>(&self, key: &str) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Take the request body. Returns `None` once consumed.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut ResponseWriter {
        &mut self.writer
    }

    pub fn json<T>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError>
    where
        T: Serialize + ?Sized,
    {
        render::json(&mut self.writer, status, value, &self.collaborators.render)
    }

    pub fn xml<T>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError>
    where
        T: Serialize,
    {
        render::xml(&mut self.writer, status, value, &self.collaborators.render)
    }

    pub fn text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.writer
            .write(status, "text/plain; charset=utf-8", body.into());
    }

    /// Stage a redirect to `location`.
    pub fn redirect(&mut self, status: StatusCode, location: &str) -> Result<(), HandlerError> {
        let value = HeaderValue::from_str(location).map_err(HandlerError::other)?;
        self.writer.insert_header(header::LOCATION, value);
        self.writer.set_status(status);
        Ok(())
    }

    /// Parse, decode and validate the request form into `T`.
    ///
    /// The form is parsed once per request; later calls reuse it.
    pub async fn bind<T>(&mut self) -> Result<T, HandlerError>
    where
        T: DeserializeOwned + Validate,
    {
        if self.form.is_none() {
            let body = self.body.take();
            let limit = self.collaborators.bind.max_body_bytes;
            self.form = Some(bind::parse_form(&self.parts, body, limit).await?);
        }
        let values = self.form.as_deref().unwrap_or_default();
        let target: T = bind::decode(values)?;
        bind::validate_struct(&target)?;
        Ok(target)
    }

    pub(crate) fn into_writer(self) -> ResponseWriter {
        self.writer
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        Self::new(
            Request::new(Body::empty()),
            HashMap::new(),
            None,
            Arc::new(Collaborators::default()),
        )
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("params", &self.params)
            .field("remote_addr", &self.remote_addr)
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn context(request: Request<Body>) -> Context {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        Context::new(
            request,
            params,
            Some("10.0.0.5:4321".to_string()),
            Arc::new(Collaborators::default()),
        )
    }

    #[test]
    fn scratch_values_are_typed() {
        let mut ctx = Context::for_test();
        ctx.set("user", String::from("ann"));
        ctx.set("attempts", 3u32);

        assert_eq!(ctx.get::<String>("user").map(String::as_str), Some("ann"));
        assert_eq!(ctx.get::<u32>("attempts"), Some(&3));
        assert!(ctx.get::<u64>("attempts").is_none());
        assert!(ctx.get::<String>("missing").is_none());
        assert!(ctx.remove("user"));
        assert!(ctx.get::<String>("user").is_none());
    }

    #[test]
    fn params_and_headers_default_to_empty() {
        let ctx = context(
            Request::get("/items/42")
                .header("x-trace", "abc")
                .body(Body::empty())
                .unwrap(),
        );

        assert_eq!(ctx.param("id"), "42");
        assert_eq!(ctx.param("nope"), "");
        assert_eq!(ctx.header("X-Trace"), "abc");
        assert_eq!(ctx.header("x-missing"), "");
        assert_eq!(ctx.client_ip(), "10.0.0.5");
    }

    #[test]
    fn redirect_sets_location() {
        let mut ctx = Context::for_test();
        ctx.redirect(StatusCode::FOUND, "/login").unwrap();

        assert_eq!(ctx.writer().status(), StatusCode::FOUND);
        assert_eq!(ctx.writer().headers()[header::LOCATION], "/login");
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Search {
        #[validate(length(min = 1))]
        q: String,
        page: Option<u32>,
    }

    #[tokio::test]
    async fn bind_reads_query_and_body_once() {
        let mut ctx = context(
            Request::post("/search?page=2")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("q=rust"))
                .unwrap(),
        );

        let first: Search = ctx.bind().await.unwrap();
        assert_eq!(first.q, "rust");
        assert_eq!(first.page, Some(2));
        assert!(ctx.take_body().is_none());

        let again: Search = ctx.bind().await.unwrap();
        assert_eq!(again.q, "rust");
    }

    #[tokio::test]
    async fn bind_failure_is_internal_error() {
        let mut ctx = context(Request::get("/search?q=").body(Body::empty()).unwrap());

        let err = ctx.bind::<Search>().await.unwrap_err();
        assert!(matches!(err, HandlerError::Bind(bind::BindError::Validation(_))));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
