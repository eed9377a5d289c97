//! Per-IP fixed-window rate limiting
//!
//! Client entries expire one window after their first request. Expired
//! entries are pruned by a periodic sweep and, when the tracker is full, on
//! demand before a new client is admitted.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    started: Instant,
}

/// In-memory per-IP rate limiter with bounded tracking
pub struct RateLimiter {
    clients: Mutex<HashMap<IpAddr, Window>>,
    max_requests: u64,
    window: Duration,
    max_tracked: usize,
}

impl RateLimiter {
    pub fn new(max_requests: u64, window: Duration, max_tracked: usize) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            max_requests,
            window,
            max_tracked: max_tracked.max(1),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.max_requests,
            config.window(),
            config.max_tracked_clients,
        )
    }

    /// Check if a request from the given IP is allowed.
    /// Returns Ok(()) if allowed, Err(retry_after_secs) if rate limited.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), u64> {
        let mut clients = self.clients.lock();

        if !clients.contains_key(&ip) && clients.len() >= self.max_tracked {
            Self::prune(&mut clients, self.window, now);
            if clients.len() >= self.max_tracked {
                // Still full: drop the client whose window started first
                if let Some(oldest) = clients
                    .iter()
                    .min_by_key(|(_, w)| w.started)
                    .map(|(ip, _)| *ip)
                {
                    clients.remove(&oldest);
                }
            }
        }

        let entry = clients.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });

        // Reset window if expired
        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.count = 0;
            entry.started = now;
        }

        entry.count += 1;
        if entry.count > self.max_requests {
            let remaining = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            Err(remaining.as_secs().max(1))
        } else {
            Ok(())
        }
    }

    /// Drop every client whose window has expired; returns how many were dropped
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock();
        Self::prune(&mut clients, self.window, now)
    }

    fn prune(clients: &mut HashMap<IpAddr, Window>, window: Duration, now: Instant) -> usize {
        let before = clients.len();
        clients.retain(|_, w| now.saturating_duration_since(w.started) < window);
        before - clients.len()
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }

    /// Sweep expired entries every `interval` until the task is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(
                        removed,
                        tracked = limiter.tracked_clients(),
                        "Pruned expired rate limit entries"
                    );
                }
            }
        })
    }
}

/// Peer address, falling back to the first `X-Forwarded-For` hop
fn client_ip(request: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rate limiting middleware. Checks per-IP request rate before routing.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    match state.rate_limiter.check(ip) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(%ip, retry_after, "Rate limit exceeded");
            ApiError::TooManyRequests { retry_after }.into_response()
        }
    }
}
