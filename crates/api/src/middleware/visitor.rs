//! Fire-and-forget visitor tracking.
//!
//! Runs on every request, records the visit in the background, and never
//! blocks or fails the request itself. Health probes and the analytics
//! endpoint are skipped so they don't inflate the counters.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::db::VisitorRepository;
use crate::state::AppState;

/// Paths that should not count as visits.
fn is_tracked(path: &str) -> bool {
    !(path.starts_with("/health") || path.starts_with("/api/analytics"))
}

/// Resolve the client IP from proxy headers, falling back to "unknown".
fn client_ip(request: &Request) -> String {
    for header in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = request.headers().get(header).and_then(|v| v.to_str().ok()) {
            // x-forwarded-for may hold a chain; the first hop is the client.
            if let Some(ip) = value.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return ip.to_owned();
                }
            }
        }
    }
    "unknown".to_owned()
}

/// Track the visitor, then continue the request.
pub async fn track(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_tracked(request.uri().path()) {
        let ip = client_ip(&request);
        let user_agent = request
            .headers()
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        // Record in the background; a lost visit is not worth a failed
        // request or even added latency.
        tokio::spawn(async move {
            if let Err(e) = VisitorRepository::new(state.pool())
                .track(&ip, user_agent.as_deref())
                .await
            {
                tracing::debug!("visitor tracking failed: {e}");
            }
        });
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_and_analytics_not_tracked() {
        assert!(!is_tracked("/health"));
        assert!(!is_tracked("/health/ready"));
        assert!(!is_tracked("/api/analytics/visitors"));
    }

    #[test]
    fn test_api_paths_tracked() {
        assert!(is_tracked("/api/products"));
        assert!(is_tracked("/api/cart"));
    }
}
