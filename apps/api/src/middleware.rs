use std::net::{IpAddr, SocketAddr};

use axum::Extension;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use clubgate_application::RateLimitRule;
use clubgate_domain::AttackType;

use crate::error::ApiResult;
use crate::state::AppState;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://fonts.googleapis.com; \
     style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://fonts.googleapis.com; \
     font-src 'self' https://cdnjs.cloudflare.com https://fonts.gstatic.com; \
     img-src 'self' data: https:; \
     connect-src 'self'; \
     frame-src 'self' https://calendar.google.com; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none';";

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=()",
    ),
];

/// Stamps the hardening header set onto every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );

    response
}

/// Rejects requests from addresses on the active block list.
pub async fn require_unblocked(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let source = resolve_client_ip(request.headers(), peer.ip());

    if state.threat_monitor.is_blocked(source).await? {
        return Err(clubgate_core::AppError::Forbidden("access denied".to_owned()).into());
    }

    Ok(next.run(request).await)
}

/// Screens the request line for attack patterns before routing.
///
/// The path and query string are the only attacker-controlled parts of a GET
/// request; form bodies are screened field by field in the membership service.
pub async fn inspect_request(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let source = resolve_client_ip(request.headers(), peer.ip());

    let path = request.uri().path();
    let query = request.uri().query().unwrap_or_default();

    for candidate in [path, query] {
        if let Some(hit) = state.inspector.classify(candidate) {
            state
                .threat_monitor
                .record_attempt(source, hit.attack_type, &hit.matched)
                .await?;
            return Err(
                clubgate_core::AppError::Validation("invalid request".to_owned()).into(),
            );
        }
    }

    if path.len() > clubgate_application::MAX_INPUT_LENGTH {
        state
            .threat_monitor
            .record_attempt(source, AttackType::OversizedInput, path)
            .await?;
        return Err(clubgate_core::AppError::Validation("invalid request".to_owned()).into());
    }

    Ok(next.run(request).await)
}

/// Enforces the per-route quota attached via [`Extension`].
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(rule): Extension<RateLimitRule>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let source = resolve_client_ip(request.headers(), peer.ip());

    state
        .rate_limit_service
        .check_rate_limit(&rule, &source.to_string())
        .await?;

    Ok(next.run(request).await)
}

/// Enforces the site-wide quota on every route.
pub async fn global_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let source = resolve_client_ip(request.headers(), peer.ip());

    state
        .rate_limit_service
        .check_rate_limit(&state.global_rate_rule, &source.to_string())
        .await?;

    Ok(next.run(request).await)
}

/// Resolves the client address, honoring the first `x-forwarded-for` hop.
pub fn resolve_client_ip(headers: &HeaderMap, peer: IpAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse::<IpAddr>().ok())
        .unwrap_or(peer)
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use axum::http::{HeaderMap, HeaderValue};

    use super::resolve_client_ip;

    fn peer() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10))
    }

    #[test]
    fn forwarded_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        assert_eq!(
            resolve_client_ip(&headers, peer()),
            IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))
        );
    }

    #[test]
    fn malformed_forwarded_header_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));

        assert_eq!(resolve_client_ip(&headers, peer()), peer());
    }

    #[test]
    fn missing_header_falls_back_to_peer() {
        assert_eq!(resolve_client_ip(&HeaderMap::new(), peer()), peer());
    }
}
