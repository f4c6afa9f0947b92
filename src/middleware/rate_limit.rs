use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::app::AppState;
use crate::error::ApiError;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP, please try again later.";

static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { limit: u32, remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window request counter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    limits: RwLock<HashMap<IpAddr, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            limits: RwLock::new(HashMap::new()),
        }
    }

    pub async fn check(&self, ip: IpAddr) -> RateDecision {
        self.check_at(ip, Instant::now()).await
    }

    /// Count one request from `ip` at `now`.
    pub async fn check_at(&self, ip: IpAddr, now: Instant) -> RateDecision {
        let mut limits = self.limits.write().await;

        if !limits.contains_key(&ip) {
            // Expired windows are dropped whenever a new client shows up
            let window = self.window;
            limits.retain(|_, entry| now.saturating_duration_since(entry.window_start) < window);
        }

        let entry = limits.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.saturating_duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count < self.max_requests {
            entry.count += 1;
            RateDecision::Allowed {
                limit: self.max_requests,
                remaining: self.max_requests - entry.count,
            }
        } else {
            let elapsed = now.saturating_duration_since(entry.window_start);
            RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            }
        }
    }

    pub async fn tracked_clients(&self) -> usize {
        self.limits.read().await.len()
    }
}

/// Resolve the client address. Proxy headers are only honoured when trusted.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy_headers: bool) -> IpAddr {
    if trust_proxy_headers {
        // X-Forwarded-For can contain "client, proxy1, proxy2"; the leftmost entry is the client
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse().ok());
        if let Some(ip) = forwarded {
            return ip;
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        if let Some(ip) = real_ip {
            return ip;
        }
    }

    peer.map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub fn is_limited_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

pub async fn rate_limit_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.api.enable_rate_limiting || !is_limited_path(request.uri().path()) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer, state.config.api.trust_proxy_headers);

    match state.rate_limiter.check(ip).await {
        RateDecision::Allowed { limit, remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(X_RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
            headers.insert(X_RATELIMIT_REMAINING.clone(), HeaderValue::from(remaining));
            response
        }
        RateDecision::Limited { retry_after } => {
            tracing::warn!("Rate limit exceeded for {}", ip);
            let mut response = ApiError::too_many_requests(RATE_LIMITED_MESSAGE).into_response();
            // Round up so clients never retry early
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, HeaderValue::from(secs));
            response
        }
    }
}
