//! # Error Translation
//!
//! Turns a failed backend or payment-gateway call into one normalized error
//! the page can render.
//!
//! ## Decision Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   RequestError → NormalizedError                        │
//! │                                                                         │
//! │  1. response.data.field_errors   ──► FieldErrors                       │
//! │  2. response.data.errors         ──► ApiErrors (one per entry)         │
//! │  3. response.data.messages       ──► ApiErrors (keys camelCased)       │
//! │  4. response.data.error_code     ──► ApiErrors (single entry)          │
//! │  5. response.data.sku_error      ──► ApiErrors [basket changed]        │
//! │  6. type=invalid_request_error,                                        │
//! │     param=billing address field  ──► ApiErrors [country not compatible]│
//! │  7. type=invalid_request_error,                                        │
//! │     code=payment_intent_unexpected_state ──► ApiErrors [basket changed]│
//! │  8. anything else                ──► Rethrow (logged at error level)   │
//! │                                                                         │
//! │  First match wins. Every call logs the branch it took.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each rule looks for one known wire shape. A key whose container has the
//! wrong type (say `errors: "oops"`) does not match, and the next rule gets
//! its turn. Inside a matching container every entry is read on its own, so
//! one odd entry never costs the others: its unreadable parts come out empty.
//! Field errors keep the order the backend sent them in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{error, info};
use ts_rs::TS;

// =============================================================================
// Wire Constants
// =============================================================================

/// Code shown when the basket changed underneath the checkout page.
pub const BASKET_CHANGED_ERROR_CODE: &str = "basket-changed-error-message";

/// Code shown when the processor rejected the billing country/state/postal code.
pub const COUNTRY_NOT_COMPATIBLE_ERROR_CODE: &str =
    "dynamic-payment-methods-country-not-compatible";

/// User message attached to synthesized entries. The banner text comes from
/// the code, so this is only a marker.
pub const SYNTHESIZED_USER_MESSAGE: &str = "error";

/// Gateway error type for rejected request parameters.
pub const INVALID_REQUEST_ERROR: &str = "invalid_request_error";

/// Gateway error code for a payment intent that can no longer be confirmed.
pub const PAYMENT_INTENT_UNEXPECTED_STATE: &str = "payment_intent_unexpected_state";

/// Request parameters naming a billing address part.
pub const BILLING_ADDRESS_PARAMS: [&str; 6] = [
    "payment_method_data[billing_details][address][country]",
    "payment_method_data[billing_details][address][state]",
    "payment_method_data[billing_details][address][postal_code]",
    "billing_details[address][country]",
    "billing_details[address][state]",
    "billing_details[address][postal_code]",
];

// =============================================================================
// Request Error (input)
// =============================================================================

/// HTTP response attached to a failed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Decoded response body.
    #[serde(default)]
    pub data: Value,
}

/// A failed remote call, as handed over by the network client or the
/// payment SDK.
///
/// ## Wire Layout
/// ```json
/// {
///   "response": { "status": 400, "data": { "field_errors": { ... } } },
///   "type": "invalid_request_error",
///   "code": "payment_intent_unexpected_state",
///   "param": "billing_details[address][country]",
///   "message": "..."
/// }
/// ```
/// HTTP failures fill `response`, gateway failures fill the top-level keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ErrorResponse>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RequestError {
    /// An HTTP error response with a JSON body.
    pub fn http(status: u16, data: Value) -> Self {
        RequestError {
            response: Some(ErrorResponse {
                status: Some(status),
                data,
            }),
            ..Default::default()
        }
    }

    /// A payment-gateway client error.
    pub fn gateway(error_type: impl Into<String>) -> Self {
        RequestError {
            error_type: Some(error_type.into()),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Body of the HTTP response, if there was one.
    pub fn response_data(&self) -> Option<&Value> {
        self.response.as_ref().map(|r| &r.data)
    }

    /// Looks up a top-level key of the response body.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.response_data().and_then(|data| data.get(key))
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.response, &self.error_type) {
            (Some(response), _) => match response.status {
                Some(status) => write!(f, "request failed with status {}", status)?,
                None => write!(f, "request failed")?,
            },
            (None, Some(error_type)) => write!(f, "payment gateway error {}", error_type)?,
            (None, None) => write!(f, "request failed")?,
        }
        if let Some(code) = &self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RequestError {}

// =============================================================================
// Normalized Error (output)
// =============================================================================

/// Error attached to one form field by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Field name as the backend reports it.
    pub field_name: String,
    pub code: Option<String>,
    pub user_message: Option<String>,
}

/// General (non-field) error or message from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: Option<String>,
    pub user_message: Option<String>,
    pub message_type: Option<String>,

    /// Extra values for message templates (from the messages payload only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub data: Option<Value>,
}

impl ApiError {
    /// A single entry with a fixed code and the marker user message.
    pub fn synthesized(code: &str) -> Self {
        ApiError {
            code: Some(code.to_string()),
            user_message: Some(SYNTHESIZED_USER_MESSAGE.to_string()),
            message_type: None,
            data: None,
        }
    }
}

/// Outcome of translating one failed call. Exactly one case per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NormalizedError {
    FieldErrors(Vec<FieldError>),
    ApiErrors(Vec<ApiError>),
    /// Unrecognized failure, handed back untouched.
    Rethrow(RequestError),
}

impl NormalizedError {
    /// Splits recognized errors from the ones the caller must treat as fatal.
    pub fn into_result(self) -> Result<NormalizedError, RequestError> {
        match self {
            NormalizedError::Rethrow(original) => Err(original),
            recognized => Ok(recognized),
        }
    }

    pub fn is_rethrow(&self) -> bool {
        matches!(self, NormalizedError::Rethrow(_))
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            NormalizedError::FieldErrors(errors) => errors,
            _ => &[],
        }
    }

    pub fn api_errors(&self) -> &[ApiError] {
        match self {
            NormalizedError::ApiErrors(errors) => errors,
            _ => &[],
        }
    }
}

/// Which kind of failure a request error turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    FieldLevel,
    ApiLevel { multiple: bool },
    /// Basket or payment intent changed; the page must refetch.
    BasketStale,
    /// Processor refused the billing country/state/postal code.
    ProcessorCountryIncompatible,
    Unclassified,
}

// =============================================================================
// Wire Shapes
// =============================================================================

/// The first known shape a request error decoded as.
#[derive(Debug)]
enum WireShape {
    FieldErrors(Vec<FieldError>),
    Errors(Vec<ApiError>),
    Messages(Vec<ApiError>),
    SingleError {
        code: String,
        user_message: Option<String>,
    },
    SkuMismatch,
    BillingAddressRejected {
        param: String,
    },
    IntentUnexpectedState,
    Unknown,
}

impl WireShape {
    fn decode(error: &RequestError) -> WireShape {
        if let Some(errors) = error.data_field("field_errors").and_then(decode_field_errors) {
            return WireShape::FieldErrors(errors);
        }

        if let Some(errors) = error.data_field("errors").and_then(decode_api_errors) {
            return WireShape::Errors(errors);
        }

        if let Some(messages) = error.data_field("messages").and_then(decode_messages) {
            return WireShape::Messages(messages);
        }

        if let Some(code) = non_empty(decode_field(error.data_field("error_code"))) {
            return WireShape::SingleError {
                code,
                user_message: decode_field(error.data_field("user_message")),
            };
        }

        if error.data_field("sku_error").is_some_and(is_truthy) {
            return WireShape::SkuMismatch;
        }

        let invalid_request = error.error_type.as_deref() == Some(INVALID_REQUEST_ERROR);

        if let Some(param) = error
            .param
            .as_deref()
            .filter(|param| invalid_request && BILLING_ADDRESS_PARAMS.contains(param))
        {
            return WireShape::BillingAddressRejected {
                param: param.to_string(),
            };
        }

        if invalid_request && error.code.as_deref() == Some(PAYMENT_INTENT_UNEXPECTED_STATE) {
            return WireShape::IntentUnexpectedState;
        }

        WireShape::Unknown
    }

    fn branch(&self) -> &'static str {
        match self {
            WireShape::FieldErrors(_) => "field_errors",
            WireShape::Errors(_) => "api_errors",
            WireShape::Messages(_) => "api_messages",
            WireShape::SingleError { .. } => "api_error",
            WireShape::SkuMismatch => "sku_error",
            WireShape::BillingAddressRejected { .. } => "billing_address_rejected",
            WireShape::IntentUnexpectedState => "payment_intent_unexpected_state",
            WireShape::Unknown => "unclassified",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            WireShape::FieldErrors(_) => ErrorCategory::FieldLevel,
            WireShape::Errors(errors) => ErrorCategory::ApiLevel {
                multiple: errors.len() > 1,
            },
            WireShape::Messages(messages) => ErrorCategory::ApiLevel {
                multiple: messages.len() > 1,
            },
            WireShape::SingleError { .. } => ErrorCategory::ApiLevel { multiple: false },
            WireShape::SkuMismatch | WireShape::IntentUnexpectedState => {
                ErrorCategory::BasketStale
            }
            WireShape::BillingAddressRejected { .. } => {
                ErrorCategory::ProcessorCountryIncompatible
            }
            WireShape::Unknown => ErrorCategory::Unclassified,
        }
    }
}

fn decode_field<'a, T: Deserialize<'a>>(value: Option<&'a Value>) -> Option<T> {
    value
        .filter(|value| !value.is_null())
        .and_then(|value| T::deserialize(value).ok())
}

/// Entries of a `field_errors` object, in the order the backend sent them.
///
/// Each entry is read on its own: an entry that is not an object, or whose
/// values are not strings, still yields a field error with the missing parts
/// left empty.
fn decode_field_errors(value: &Value) -> Option<Vec<FieldError>> {
    let entries = value.as_object()?;
    Some(
        entries
            .iter()
            .map(|(field_name, entry)| FieldError {
                field_name: field_name.clone(),
                code: string_field(entry, "error_code"),
                user_message: entry
                    .get("user_message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
            .collect(),
    )
}

/// Entries of an `errors` list, read leniently like [`decode_field_errors`].
fn decode_api_errors(value: &Value) -> Option<Vec<ApiError>> {
    let entries = value.as_array()?;
    Some(
        entries
            .iter()
            .map(|entry| ApiError {
                code: string_field(entry, "error_code"),
                user_message: string_field(entry, "user_message"),
                message_type: string_field(entry, "message_type"),
                data: None,
            })
            .collect(),
    )
}

/// A non-empty string value under `key`, if `entry` is an object holding one.
fn string_field(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Entries of a `messages` payload (a list, or one bare object), with every
/// key camelCased first.
fn decode_messages(value: &Value) -> Option<Vec<ApiError>> {
    let message = |entry: &Value| ApiError {
        code: string_field(entry, "code"),
        user_message: string_field(entry, "userMessage"),
        message_type: string_field(entry, "messageType"),
        data: entry.get("data").filter(|data| !data.is_null()).cloned(),
    };

    match camel_case_keys(value.clone()) {
        Value::Array(entries) => Some(entries.iter().map(message).collect()),
        entry @ Value::Object(_) => Some(vec![message(&entry)]),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// JSON truthiness, as the backend's own clients evaluate flags.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// =============================================================================
// Key Normalization
// =============================================================================

/// Converts a key to camelCase (`user_message` → `userMessage`).
///
/// Words are split on any non-alphanumeric character, on lower-to-upper
/// case changes, before the last capital of an acronym (`HTTPStatus` →
/// `HTTP`, `Status`) and between letters and digits. The first word is
/// lowercased and every later word capitalized, so `HTTP_STATUS` and
/// `http-status` both become `httpStatus`.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, word) in split_words(key).iter().enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let next = chars.get(i + 1).copied();
            let boundary = prev.is_alphanumeric()
                && ((prev.is_lowercase() && c.is_uppercase())
                    || (prev.is_numeric() != c.is_numeric())
                    || (prev.is_uppercase()
                        && c.is_uppercase()
                        && next.is_some_and(char::is_lowercase)));
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Recursively rewrites every object key with [`to_camel_case`].
pub fn camel_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (to_camel_case(&key), camel_case_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camel_case_keys).collect()),
        other => other,
    }
}

// =============================================================================
// Translation
// =============================================================================

/// Classifies a request error without translating it.
pub fn categorize(error: &RequestError) -> ErrorCategory {
    WireShape::decode(error).category()
}

/// Translates a failed call into a [`NormalizedError`].
///
/// Never fails: recognized shapes become field/API errors, everything else
/// comes back as [`NormalizedError::Rethrow`] after being logged.
pub fn translate(error: RequestError) -> NormalizedError {
    let shape = WireShape::decode(&error);
    let branch = shape.branch();

    match shape {
        WireShape::FieldErrors(errors) => {
            info!(branch, count = errors.len(), "Field Errors");
            NormalizedError::FieldErrors(errors)
        }
        WireShape::Errors(errors) => {
            info!(branch, count = errors.len(), "API Errors");
            NormalizedError::ApiErrors(errors)
        }
        WireShape::Messages(messages) => {
            info!(branch, count = messages.len(), "API Messages");
            NormalizedError::ApiErrors(messages)
        }
        WireShape::SingleError { code, user_message } => {
            info!(branch, code = %code, "API Error");
            NormalizedError::ApiErrors(vec![ApiError {
                code: Some(code),
                user_message: non_empty(user_message),
                message_type: None,
                data: None,
            }])
        }
        WireShape::SkuMismatch => {
            info!(branch, "SKU Error");
            NormalizedError::ApiErrors(vec![ApiError::synthesized(BASKET_CHANGED_ERROR_CODE)])
        }
        WireShape::BillingAddressRejected { param } => {
            info!(branch, param = %param, "Dynamic Payment Method Country Error");
            NormalizedError::ApiErrors(vec![ApiError::synthesized(
                COUNTRY_NOT_COMPATIBLE_ERROR_CODE,
            )])
        }
        WireShape::IntentUnexpectedState => {
            info!(branch, "Basket Changed Error");
            NormalizedError::ApiErrors(vec![ApiError::synthesized(BASKET_CHANGED_ERROR_CODE)])
        }
        WireShape::Unknown => {
            error!(branch, error = %error, details = ?error, "Unclassified request error");
            NormalizedError::Rethrow(error)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
