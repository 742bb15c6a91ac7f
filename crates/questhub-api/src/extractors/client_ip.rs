//! Client address resolution for rate limiting and request context.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::request::Parts;

/// Resolve the client IP.
///
/// With `trust_forwarded_for` the first `X-Forwarded-For` entry wins;
/// otherwise, or when the header is absent, the peer address is used.
pub fn client_ip(parts: &Parts, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(forwarded: Option<&str>, peer: Option<&str>) -> Parts {
        let mut builder = Request::builder();
        if let Some(f) = forwarded {
            builder = builder.header("x-forwarded-for", f);
        }
        let mut request = builder.body(()).unwrap();
        if let Some(p) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(p.parse::<SocketAddr>().unwrap()));
        }
        request.into_parts().0
    }

    #[test]
    fn test_forwarded_first_hop_when_trusted() {
        let p = parts(Some("203.0.113.7, 10.0.0.1"), Some("10.0.0.2:5000"));
        assert_eq!(client_ip(&p, true), "203.0.113.7");
        assert_eq!(client_ip(&p, false), "10.0.0.2");
    }

    #[test]
    fn test_unknown_without_any_source() {
        assert_eq!(client_ip(&parts(None, None), true), "unknown");
    }
}
