//! Structured audit trail for administrative actions.
//!
//! Admin endpoints carry no authentication, so the audit record is keyed on the
//! action and the affected resource, with the caller's address when known.
//!
//! # Example
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome};
//!
//! AuditEvent::new("event.publish", format!("event:{}", id), AuditOutcome::Success)
//!     .with_details(json!({"state": "PUBLISHED"}))
//!     .log();
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;

/// Outcome of an audited action.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    Rejected,
}

/// One audit record, emitted on the `audit` tracing target.
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// Acting user id for user-scoped endpoints
    pub actor: Option<String>,
    /// Dotted action name (e.g. "category.delete", "event.publish")
    pub action: String,
    /// Affected resource (e.g. "event:0190...")
    pub resource: String,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, resource: impl Into<String>, outcome: AuditOutcome) -> Self {
        Self {
            actor: None,
            action: action.into(),
            resource: resource.into(),
            outcome,
            ip_address: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_actor(mut self, actor: impl ToString) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    /// Attach arbitrary JSON-serializable context.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            actor = ?self.actor,
            action = %self.action,
            resource = %self.resource,
            outcome = ?self.outcome,
            ip = ?self.ip_address,
            timestamp = %self.timestamp,
            details = ?self.details,
            "{}",
            serde_json::to_string(&self).unwrap_or_else(|_| "Failed to serialize audit event".to_string())
        );
    }
}

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

/// Fallback when no proxy headers are present.
pub fn extract_ip_from_socket(socket: Option<SocketAddr>) -> Option<String> {
    socket.map(|addr| addr.ip().to_string())
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 172.16.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));

        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));

        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("192.168.1.1"));
        assert_eq!(extract_ip_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_socket_fallback() {
        let addr: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        assert_eq!(extract_ip_from_socket(Some(addr)).as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_audit_event_builder() {
        let event = AuditEvent::new("category.delete", "category:1", AuditOutcome::Success)
            .with_actor("admin")
            .with_details(serde_json::json!({"name": "Concerts"}));

        assert_eq!(event.actor.as_deref(), Some("admin"));
        assert_eq!(event.outcome, AuditOutcome::Success);
        assert!(event.details.is_some());
        event.log();
    }
}
