use axum::{
    extract::{Request, State},
    http::{header::HOST, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

/// Rejects requests whose `Host` is not in `TRUSTED_HOSTS`. A `*` entry
/// disables the check.
pub async fn enforce_trusted_hosts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if is_trusted_host(&state.config.trusted_hosts, &host) {
        return next.run(request).await;
    }

    tracing::warn!(host = %host, "Rejected request from untrusted host");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": "Invalid host header." })),
    )
        .into_response()
}

fn is_trusted_host(trusted_hosts: &[String], host_header: &str) -> bool {
    let host = host_header
        .rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map(|(name, _)| name)
        .unwrap_or(host_header)
        .trim()
        .to_ascii_lowercase();

    trusted_hosts.iter().any(|trusted| {
        let trusted = trusted.trim().to_ascii_lowercase();
        if trusted == "*" {
            return true;
        }
        match trusted.strip_prefix("*.") {
            Some(suffix) => host.ends_with(&format!(".{suffix}")),
            None => host == trusted,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::is_trusted_host;

    #[test]
    fn matches_hosts_with_ports_and_wildcards() {
        let trusted = vec!["localhost".to_string(), "*.casaora.co".to_string()];
        assert!(is_trusted_host(&trusted, "localhost:8000"));
        assert!(is_trusted_host(&trusted, "api.casaora.co"));
        assert!(!is_trusted_host(&trusted, "casaora.co.evil.com"));
        assert!(!is_trusted_host(&trusted, ""));
        assert!(is_trusted_host(&["*".to_string()], "anything"));
    }
}
