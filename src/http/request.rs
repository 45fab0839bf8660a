//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Resolve the client IP from proxy headers or the peer address
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Client IP priority: X-Real-Ip, first X-Forwarded-For hop, peer host

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Request ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Resolve the originating client address.
///
/// `remote_addr` is the transport peer in `host:port` form. Returns an
/// empty string when nothing usable is found.
pub fn client_ip(headers: &HeaderMap, remote_addr: Option<&str>) -> String {
    let header = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    };

    let ip = header(&X_REAL_IP).trim();
    if !ip.is_empty() {
        return ip.to_string();
    }

    let forwarded = header(&X_FORWARDED_FOR);
    let ip = forwarded.split(',').next().unwrap_or_default().trim();
    if !ip.is_empty() {
        return ip.to_string();
    }

    remote_addr
        .and_then(|addr| split_host_port(addr.trim()))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Host part of `host:port` or `[v6]:port`; `None` when malformed.
fn split_host_port(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        tail.strip_prefix(':')?;
        return Some(host);
    }
    let (host, _port) = addr.rsplit_once(':')?;
    if host.contains(':') {
        return None;
    }
    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert((*k).clone(), HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn real_ip_is_trimmed() {
        let h = headers(&[(&X_REAL_IP, " 9.9.9.9 "), (&X_FORWARDED_FOR, "1.1.1.1")]);
        assert_eq!(client_ip(&h, Some("10.0.0.5:4321")), "9.9.9.9");
    }

    #[test]
    fn forwarded_for_uses_first_hop() {
        let h = headers(&[(&X_FORWARDED_FOR, "1.1.1.1, 2.2.2.2")]);
        assert_eq!(client_ip(&h, Some("10.0.0.5:4321")), "1.1.1.1");
    }

    #[test]
    fn blank_real_ip_falls_through() {
        let h = headers(&[(&X_REAL_IP, "   "), (&X_FORWARDED_FOR, " 3.3.3.3 ")]);
        assert_eq!(client_ip(&h, None), "3.3.3.3");
    }

    #[test]
    fn falls_back_to_remote_host() {
        let h = HeaderMap::new();
        assert_eq!(client_ip(&h, Some("10.0.0.5:4321")), "10.0.0.5");
        assert_eq!(client_ip(&h, Some("[::1]:8080")), "::1");
    }

    #[test]
    fn malformed_remote_is_empty() {
        let h = HeaderMap::new();
        assert_eq!(client_ip(&h, Some("not-an-address")), "");
        assert_eq!(client_ip(&h, Some("::1")), "");
        assert_eq!(client_ip(&h, Some("[::1]")), "");
        assert_eq!(client_ip(&h, None), "");
    }

    #[test]
    fn request_ids_are_unique() {
        let req = Request::new(());
        let mut make = UuidRequestId;
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
