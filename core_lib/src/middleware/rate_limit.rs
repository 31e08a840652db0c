//! Per-client sliding window limit for form posts

use crate::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use serde_json::json;
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
            trust_proxy_headers: config.trust_proxy_headers,
        }
    }

    /// Records a request from `ip` and returns how many remain in the window.
    pub fn check(&self, ip: IpAddr) -> Result<usize, RateLimitError> {
        let now = Instant::now();
        let mut requests = self.requests.lock();

        let entries = requests.entry(ip).or_default();
        entries.retain(|&instant| now.duration_since(instant) < self.window);

        if entries.len() >= self.max_requests {
            let oldest = entries.first().copied().unwrap_or(now);
            let reset_in = self.window.saturating_sub(now.duration_since(oldest));

            return Err(RateLimitError {
                retry_after_seconds: reset_in.as_secs().max(1),
                limit: self.max_requests,
            });
        }

        entries.push(now);

        Ok(self.max_requests - entries.len())
    }

    /// Drops clients with no requests inside the window.
    pub fn prune(&self) {
        let now = Instant::now();
        let mut requests = self.requests.lock();
        requests.retain(|_, entries| {
            entries.retain(|&instant| now.duration_since(instant) < self.window);
            !entries.is_empty()
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn limit(&self) -> usize {
        self.max_requests
    }
}

#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after_seconds: u64,
    pub limit: usize,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": format!("Too many submissions. Please try again in {} seconds.", self.retry_after_seconds),
        }));

        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", HeaderValue::from(self.limit));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
        headers.insert("Retry-After", HeaderValue::from(self.retry_after_seconds));

        response
    }
}

/// The peer address, unless proxy headers are trusted, in which case the
/// first `X-Forwarded-For` hop wins and the peer is the fallback.
fn client_ip(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
    trust_proxy_headers: bool,
) -> Option<IpAddr> {
    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());

    if !trust_proxy_headers {
        return peer;
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .or(peer)
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(ip) = client_ip(connect_info, request.headers(), limiter.trust_proxy_headers) else {
        tracing::debug!("No client address, skipping rate limit");
        return Ok(next.run(request).await);
    };

    let remaining = limiter.check(ip).map_err(|e| {
        tracing::warn!(client = %ip, retry_after = e.retry_after_seconds, "Rate limit exceeded");
        e
    })?;

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limiter.limit()));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enable: true,
            max_requests,
            window_seconds,
            trust_proxy_headers: false,
        })
    }

    #[test]
    fn test_limit_is_per_client() {
        let limiter = limiter(2, 60);
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert_eq!(limiter.check(first).unwrap(), 1);
        assert_eq!(limiter.check(first).unwrap(), 0);
        let error = limiter.check(first).unwrap_err();
        assert_eq!(error.limit, 2);
        assert!(error.retry_after_seconds >= 1);

        assert!(limiter.check(second).is_ok());
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_prune_forgets_idle_clients() {
        let limiter = limiter(5, 0);
        limiter.check("10.0.0.3".parse().unwrap()).unwrap();
        limiter.prune();
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_client_ip_from_trusted_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let proxy: SocketAddr = "10.0.0.1:5000".parse().unwrap();

        assert_eq!(
            client_ip(Some(ConnectInfo(proxy)), &headers, true),
            Some("203.0.113.7".parse().unwrap())
        );
        assert_eq!(client_ip(None, &headers, true), Some("203.0.113.7".parse().unwrap()));
        assert_eq!(client_ip(Some(ConnectInfo(proxy)), &HeaderMap::new(), true), Some(proxy.ip()));
        assert_eq!(client_ip(None, &HeaderMap::new(), true), None);
    }

    #[test]
    fn test_forwarded_header_ignored_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        let peer: SocketAddr = "192.0.2.4:5000".parse().unwrap();

        assert_eq!(client_ip(Some(ConnectInfo(peer)), &headers, false), Some(peer.ip()));
        assert_eq!(client_ip(None, &headers, false), None);
    }

    #[test]
    fn test_error_response() {
        let response = RateLimitError {
            retry_after_seconds: 30,
            limit: 10,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "30");
    }
}
