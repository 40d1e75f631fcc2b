//! # Feedback Messages
//!
//! Alert banners built from normalized errors.
//!
//! ## Severity Mapping
//! ```text
//! message type   alert variant
//! ────────────   ─────────────
//! debug      ──► warning
//! info       ──► info
//! success    ──► success
//! warning    ──► warning
//! error      ──► danger
//! (other)    ──► warning
//! ```
//!
//! Banner content is either literal text or a reference to a translated
//! message component plus the values it interpolates. The choice is made
//! once when the alert is built, never at render time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::translate::{ApiError, FieldError, NormalizedError};

/// Kind of message as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl MessageType {
    /// Parses a backend message type. Unknown strings give `None`.
    pub fn parse(s: &str) -> Option<MessageType> {
        match s {
            "debug" => Some(MessageType::Debug),
            "info" => Some(MessageType::Info),
            "success" => Some(MessageType::Success),
            "warning" => Some(MessageType::Warning),
            "error" => Some(MessageType::Error),
            _ => None,
        }
    }

    pub const fn alert_variant(&self) -> AlertVariant {
        match self {
            MessageType::Debug => AlertVariant::Warning,
            MessageType::Info => AlertVariant::Info,
            MessageType::Success => AlertVariant::Success,
            MessageType::Warning => AlertVariant::Warning,
            MessageType::Error => AlertVariant::Danger,
        }
    }
}

/// Visual style of an alert banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    Info,
    Success,
    #[default]
    Warning,
    Danger,
}

impl AlertVariant {
    /// Variant for an optional, possibly unknown message type.
    pub fn for_message_type(message_type: Option<&str>) -> AlertVariant {
        message_type
            .and_then(MessageType::parse)
            .map(|t| t.alert_variant())
            .unwrap_or_default()
    }
}

/// What an alert displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    /// Text shown as is.
    Literal { text: String },
    /// Translated message looked up by id, with interpolation values.
    Component {
        message_id: String,
        values: Map<String, Value>,
    },
}

impl MessageContent {
    pub fn literal(text: impl Into<String>) -> Self {
        MessageContent::Literal { text: text.into() }
    }

    pub fn component(message_id: impl Into<String>) -> Self {
        MessageContent::Component {
            message_id: message_id.into(),
            values: Map::new(),
        }
    }
}

/// One dismissible banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMessage {
    pub id: u32,
    pub variant: AlertVariant,
    pub content: MessageContent,
}

impl AlertMessage {
    /// Builds an alert.
    ///
    /// For component content, `data` is merged under the component's own
    /// values: keys the component already sets are kept.
    pub fn new(
        id: u32,
        message_type: Option<&str>,
        content: MessageContent,
        data: Option<&Value>,
    ) -> Self {
        let content = match content {
            MessageContent::Component { message_id, values } => {
                let mut merged = match data {
                    Some(Value::Object(data)) => data.clone(),
                    _ => Map::new(),
                };
                merged.extend(values);
                MessageContent::Component {
                    message_id,
                    values: merged,
                }
            }
            literal => literal,
        };

        AlertMessage {
            id,
            variant: AlertVariant::for_message_type(message_type),
            content,
        }
    }

    /// Alert for a general API error. Coded errors render the translated
    /// message for that code, uncoded ones their user message.
    pub fn from_api_error(id: u32, error: &ApiError) -> Self {
        let content = match (&error.code, &error.user_message) {
            (Some(code), _) => MessageContent::component(code.clone()),
            (None, Some(message)) => MessageContent::literal(message.clone()),
            (None, None) => MessageContent::literal(""),
        };
        AlertMessage::new(id, error.message_type.as_deref(), content, error.data.as_ref())
    }

    /// Alert for a backend field error.
    pub fn from_field_error(id: u32, error: &FieldError) -> Self {
        let data = serde_json::json!({ "fieldName": error.field_name });
        let content = match (&error.code, &error.user_message) {
            (_, Some(message)) => MessageContent::literal(message.clone()),
            (Some(code), None) => MessageContent::component(code.clone()),
            (None, None) => MessageContent::literal(""),
        };
        AlertMessage::new(id, Some("error"), content, Some(&data))
    }
}

impl NormalizedError {
    /// Banners for this error, numbered from `first_id`.
    ///
    /// Ids stop at `u32::MAX` rather than wrapping. A rethrown error has no
    /// banners: the caller shows its generic failure.
    pub fn alerts(&self, first_id: u32) -> Vec<AlertMessage> {
        let id_at = |index: usize| {
            first_id.saturating_add(u32::try_from(index).unwrap_or(u32::MAX))
        };

        match self {
            NormalizedError::FieldErrors(errors) => errors
                .iter()
                .enumerate()
                .map(|(i, error)| AlertMessage::from_field_error(id_at(i), error))
                .collect(),
            NormalizedError::ApiErrors(errors) => errors
                .iter()
                .enumerate()
                .map(|(i, error)| AlertMessage::from_api_error(id_at(i), error))
                .collect(),
            NormalizedError::Rethrow(_) => Vec::new(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{translate, RequestError, BASKET_CHANGED_ERROR_CODE};
    use serde_json::json;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(AlertVariant::for_message_type(Some("debug")), AlertVariant::Warning);
        assert_eq!(AlertVariant::for_message_type(Some("info")), AlertVariant::Info);
        assert_eq!(AlertVariant::for_message_type(Some("success")), AlertVariant::Success);
        assert_eq!(AlertVariant::for_message_type(Some("warning")), AlertVariant::Warning);
        assert_eq!(AlertVariant::for_message_type(Some("error")), AlertVariant::Danger);
        assert_eq!(AlertVariant::for_message_type(Some("fatal")), AlertVariant::Warning);
        assert_eq!(AlertVariant::for_message_type(None), AlertVariant::Warning);
    }

    #[test]
    fn test_component_values_win_over_data() {
        let content = MessageContent::Component {
            message_id: "coupon-applied".to_string(),
            values: json!({ "code": "SAVE10" }).as_object().unwrap().clone(),
        };
        let data = json!({ "code": "IGNORED", "percent": 10 });

        let alert = AlertMessage::new(1, Some("success"), content, Some(&data));

        assert_eq!(alert.variant, AlertVariant::Success);
        match alert.content {
            MessageContent::Component { values, .. } => {
                assert_eq!(values.get("code"), Some(&json!("SAVE10")));
                assert_eq!(values.get("percent"), Some(&json!(10)));
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_content_ignores_data() {
        let alert = AlertMessage::new(
            2,
            None,
            MessageContent::literal("Something went wrong"),
            Some(&json!({ "x": 1 })),
        );
        assert_eq!(alert.content, MessageContent::literal("Something went wrong"));
    }

    #[test]
    fn test_alerts_from_sku_error() {
        let normalized = translate(RequestError::http(409, json!({ "sku_error": "changed" })));
        let alerts = normalized.alerts(10);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, 10);
        assert_eq!(alerts[0].variant, AlertVariant::Warning);
        assert_eq!(
            alerts[0].content,
            MessageContent::component(BASKET_CHANGED_ERROR_CODE)
        );
    }

    #[test]
    fn test_alerts_from_messages_carry_data() {
        let normalized = translate(RequestError::http(
            200,
            json!({ "messages": [
                { "code": "code-redeemed", "message_type": "success", "data": { "voucher_code": "A1" } },
                { "user_message": "Plain text", "message_type": "error" }
            ]}),
        ));
        let alerts = normalized.alerts(0);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[1].id, 1);
        assert_eq!(alerts[1].variant, AlertVariant::Danger);
        assert_eq!(alerts[1].content, MessageContent::literal("Plain text"));
        match &alerts[0].content {
            MessageContent::Component { message_id, values } => {
                assert_eq!(message_id, "code-redeemed");
                assert_eq!(values.get("voucherCode"), Some(&json!("A1")));
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn test_rethrow_has_no_alerts() {
        let normalized = translate(RequestError::http(500, json!({})));
        assert!(normalized.alerts(0).is_empty());
    }

    #[test]
    fn test_alert_ids_stop_at_max() {
        let normalized = translate(RequestError::http(
            400,
            json!({ "errors": [{ "error_code": "a" }, { "error_code": "b" }, { "error_code": "c" }] }),
        ));

        let ids: Vec<u32> = normalized
            .alerts(u32::MAX - 1)
            .iter()
            .map(|alert| alert.id)
            .collect();
        assert_eq!(ids, vec![u32::MAX - 1, u32::MAX, u32::MAX]);
    }
}
