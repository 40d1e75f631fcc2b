//! # Session Context
//!
//! Analytics correlation ID for one checkout page session.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ?correlationId=...   ──► present? use it                               │
//! │         │ no                                                            │
//! │         ▼                                                               │
//! │  tglr_correlation_id cookie ──► present? use it                         │
//! │         │ no                                                            │
//! │         ▼                                                               │
//! │  new UUID v4                                                            │
//! │                                                                         │
//! │  Then: remove the old host-scoped cookie, and write the ID back on the │
//! │  parent domain with a fresh 30 minute expiry.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The result is a plain value passed down to whatever needs the ID. Cookie
//! writes are returned as instructions for the page to apply.

use checkout_core::tracking::{TrackingEvent, WebElement};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::error::{FlowError, FlowResult};

/// Where the correlation ID came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationSource {
    QueryParam,
    Cookie,
    Generated,
}

/// Cookie the page must set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieWrite {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: DateTime<Utc>,
}

/// Cookie the page must delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieRemoval {
    pub name: String,
    pub domain: String,
    pub path: String,
}

/// Correlation state for one page session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub correlation_id: String,
    pub source: CorrelationSource,
    pub cookie: CookieWrite,
    /// Cookies written before the domain was pinned landed on the exact host.
    pub stale_cookie: CookieRemoval,
}

impl SessionContext {
    /// Resolves the correlation ID for a page load.
    pub fn resolve(
        page_url: &Url,
        cookie_value: Option<&str>,
        settings: &SessionSettings,
        now: DateTime<Utc>,
    ) -> FlowResult<Self> {
        let hostname = page_url.host_str().ok_or_else(|| FlowError::InvalidUrl {
            setting: "page_url".to_string(),
            reason: format!("{} has no host", page_url),
        })?;

        let from_query = page_url
            .query_pairs()
            .find(|(key, _)| key == settings.query_param.as_str())
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());

        let (correlation_id, source) = match (from_query, cookie_value.filter(|v| !v.is_empty())) {
            (Some(id), _) => (id, CorrelationSource::QueryParam),
            (None, Some(id)) => (id.to_string(), CorrelationSource::Cookie),
            (None, None) => (Uuid::new_v4().to_string(), CorrelationSource::Generated),
        };

        let expires = Duration::try_minutes(settings.ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                FlowError::InvalidConfig(format!(
                    "session.ttl_minutes {} is out of range",
                    settings.ttl_minutes
                ))
            })?;

        Ok(SessionContext {
            cookie: CookieWrite {
                name: settings.cookie_name.clone(),
                value: correlation_id.clone(),
                domain: format!(".{}", cookie_domain(hostname)),
                path: "/".to_string(),
                expires,
            },
            stale_cookie: CookieRemoval {
                name: settings.cookie_name.clone(),
                domain: hostname.to_string(),
                path: "/".to_string(),
            },
            correlation_id,
            source,
        })
    }

    /// Analytics event for a click on a payment button.
    pub fn payment_button_click(&self, element: WebElement) -> TrackingEvent {
        TrackingEvent::payment_button_click(&self.correlation_id, element)
    }

    /// Analytics event for an element scrolled fully into view.
    pub fn element_viewed(&self, element: WebElement) -> TrackingEvent {
        TrackingEvent::element_viewed(&self.correlation_id, element)
    }
}

/// Registrable part of a hostname: its last two labels.
///
/// `checkout.example.org` → `example.org`; `localhost` stays as is.
pub fn cookie_domain(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() > 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        hostname.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_cookie_domain() {
        assert_eq!(cookie_domain("payment.checkout.example.org"), "example.org");
        assert_eq!(cookie_domain("example.org"), "example.org");
        assert_eq!(cookie_domain("localhost"), "localhost");
    }

    #[test]
    fn test_query_param_wins_over_cookie() {
        let session = SessionContext::resolve(
            &url("https://payment.example.org/checkout?correlationId=abc-123"),
            Some("from-cookie"),
            &SessionSettings::default(),
            now(),
        )
        .unwrap();

        assert_eq!(session.correlation_id, "abc-123");
        assert_eq!(session.source, CorrelationSource::QueryParam);
        assert_eq!(session.cookie.value, "abc-123");
        assert_eq!(session.cookie.domain, ".example.org");
        assert_eq!(session.stale_cookie.domain, "payment.example.org");
        assert_eq!(session.cookie.expires, now() + Duration::minutes(30));
    }

    #[test]
    fn test_cookie_used_when_no_query_param() {
        let session = SessionContext::resolve(
            &url("https://payment.example.org/checkout?correlationId="),
            Some("from-cookie"),
            &SessionSettings::default(),
            now(),
        )
        .unwrap();

        assert_eq!(session.correlation_id, "from-cookie");
        assert_eq!(session.source, CorrelationSource::Cookie);
    }

    #[test]
    fn test_generates_uuid_when_nothing_known() {
        let session = SessionContext::resolve(
            &url("http://localhost:1998/"),
            None,
            &SessionSettings::default(),
            now(),
        )
        .unwrap();

        assert_eq!(session.source, CorrelationSource::Generated);
        assert!(Uuid::parse_str(&session.correlation_id).is_ok());
        assert_eq!(session.cookie.domain, ".localhost");
    }

    #[test]
    fn test_events_carry_session_correlation_id() {
        use checkout_core::tracking::{EventName, EventPayload};

        let session = SessionContext::resolve(
            &url("https://payment.example.org/checkout?correlationId=abc-123"),
            None,
            &SessionSettings::default(),
            now(),
        )
        .unwrap();

        let click = session.payment_button_click(WebElement::paypal_button(Some("pp")));
        assert_eq!(click.name, EventName::ElementClicked);
        assert!(matches!(
            click.payload,
            EventPayload::Element { ref correlation_id, .. } if correlation_id == "abc-123"
        ));

        let viewed = session.element_viewed(WebElement::promotional_code_banner());
        assert_eq!(viewed.name, EventName::ElementViewed);
    }

    #[test]
    fn test_oversized_ttl_is_an_error() {
        let settings = SessionSettings {
            ttl_minutes: i64::MAX / 2,
            ..SessionSettings::default()
        };
        let result = SessionContext::resolve(
            &url("https://payment.example.org/checkout"),
            Some("from-cookie"),
            &settings,
            now(),
        );
        assert!(matches!(result, Err(FlowError::InvalidConfig(_))));
    }

    #[test]
    fn test_url_without_host_is_rejected() {
        let result = SessionContext::resolve(
            &url("data:text/plain,hello"),
            None,
            &SessionSettings::default(),
            now(),
        );
        assert!(result.is_err());
    }
}
