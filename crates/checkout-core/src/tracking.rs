//! # Analytics Events
//!
//! Payloads for the page's analytics beacon. This module only builds them;
//! sending is the host page's job.
//!
//! ## Event Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Button click                                                           │
//! │    name == "paypal" ──► ElementClicked                                 │
//! │                          { correlationId, webElement }                 │
//! │    any other button ──► ConversionTracked                              │
//! │                          { correlation: { id }, metadata }             │
//! │                                                                         │
//! │  Element scrolled into view ──► ElementViewed                          │
//! │                          { correlationId, webElement }                 │
//! │                                                                         │
//! │  Beacon body = { "@type": <schema>, ...payload }                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! `ConversionTracked` has no registered schema, so its body goes out
//! without an `@type`.

use serde::Serialize;

// =============================================================================
// Event Names
// =============================================================================

/// Events the page can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventName {
    ProductClicked,
    ProductLoaded,
    ProductViewed,
    ElementClicked,
    ElementViewed,
    FieldSelected,
    FormSubmitted,
    FormViewed,
    ConversionTracked,
}

impl EventName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventName::ProductClicked => "ProductClicked",
            EventName::ProductLoaded => "ProductLoaded",
            EventName::ProductViewed => "ProductViewed",
            EventName::ElementClicked => "ElementClicked",
            EventName::ElementViewed => "ElementViewed",
            EventName::FieldSelected => "FieldSelected",
            EventName::FormSubmitted => "FormSubmitted",
            EventName::FormViewed => "FormViewed",
            EventName::ConversionTracked => "ConversionTracked",
        }
    }

    /// Fully qualified schema sent as `@type`.
    pub const fn schema(&self) -> Option<&'static str> {
        match self {
            EventName::ProductClicked => Some("redventures.ecommerce.v1.ProductClicked"),
            EventName::ProductLoaded => Some("redventures.ecommerce.v1.ProductLoaded"),
            EventName::ProductViewed => Some("redventures.ecommerce.v1.ProductViewed"),
            EventName::ElementClicked => Some("redventures.usertracking.v3.ElementClicked"),
            EventName::ElementViewed => Some("redventures.usertracking.v3.ElementViewed"),
            EventName::FieldSelected => Some("redventures.usertracking.v3.FieldSelected"),
            EventName::FormSubmitted => Some("redventures.usertracking.v3.FormSubmitted"),
            EventName::FormViewed => Some("redventures.usertracking.v3.FormViewed"),
            EventName::ConversionTracked => None,
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Web Elements
// =============================================================================

/// Element name that marks the PayPal button.
pub const PAYPAL_ELEMENT_NAME: &str = "paypal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Button,
}

/// Description of the element an event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl WebElement {
    pub fn button(name: impl Into<String>, text: impl Into<String>) -> Self {
        WebElement {
            element_type: Some(ElementType::Button),
            name: name.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// The PayPal button. `element_id` is the rendered button's DOM id.
    pub fn paypal_button(element_id: Option<&str>) -> Self {
        WebElement::button(PAYPAL_ELEMENT_NAME, "PayPal").with_position(element_id.unwrap_or(""))
    }

    /// The place-order button on the checkout page.
    pub fn place_order_button(title: impl Into<String>, url: impl Into<String>) -> Self {
        WebElement {
            title: Some(title.into()),
            url: Some(url.into()),
            page_type: Some("checkout".to_string()),
            ..WebElement::button("stripe", "Stripe").with_position("placeOrderButton")
        }
    }

    /// The "added to basket" coupon banner, reported as its Apply button.
    pub fn promotional_code_banner() -> Self {
        WebElement::button("promotional-code", "Apply")
    }

    pub fn is_paypal(&self) -> bool {
        self.name == PAYPAL_ELEMENT_NAME
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correlation {
    pub id: String,
}

/// Event body, without the `@type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Element {
        #[serde(rename = "correlationId")]
        correlation_id: String,
        #[serde(rename = "webElement")]
        web_element: WebElement,
    },
    Conversion {
        correlation: Correlation,
        metadata: WebElement,
    },
}

/// One analytics event, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEvent {
    pub name: EventName,
    pub payload: EventPayload,
}

/// Serialized form of a [`TrackingEvent`]: `{"@type": ..., ...payload}`.
#[derive(Debug, Serialize)]
pub struct BeaconBody<'a> {
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    schema: Option<&'static str>,
    #[serde(flatten)]
    payload: &'a EventPayload,
}

impl TrackingEvent {
    /// Click on a payment button.
    ///
    /// PayPal reports an element click, every other button a conversion.
    pub fn payment_button_click(correlation_id: &str, element: WebElement) -> Self {
        if element.is_paypal() {
            TrackingEvent {
                name: EventName::ElementClicked,
                payload: EventPayload::Element {
                    correlation_id: correlation_id.to_string(),
                    web_element: element,
                },
            }
        } else {
            TrackingEvent {
                name: EventName::ConversionTracked,
                payload: EventPayload::Conversion {
                    correlation: Correlation {
                        id: correlation_id.to_string(),
                    },
                    metadata: element,
                },
            }
        }
    }

    /// An element became fully visible.
    pub fn element_viewed(correlation_id: &str, element: WebElement) -> Self {
        TrackingEvent {
            name: EventName::ElementViewed,
            payload: EventPayload::Element {
                correlation_id: correlation_id.to_string(),
                web_element: element,
            },
        }
    }

    pub fn beacon_body(&self) -> BeaconBody<'_> {
        BeaconBody {
            schema: self.name.schema(),
            payload: &self.payload,
        }
    }
}

// =============================================================================
// Slugs and Variants
// =============================================================================

/// Turns display text into a near-slug for event properties.
///
/// Trims, lowercases, then replaces everything except ASCII letters, digits,
/// `_` and `&` with `-`: `"Humanities & Arts"` → `"humanities-&-arts"`.
pub fn hyphenate_for_tagular(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '&' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Product line reported with ecommerce events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagularVariant {
    #[serde(rename = "courses")]
    Courses,
    #[serde(rename = "certificates-xseries")]
    XSeries,
    #[serde(rename = "certificates-prof-cert")]
    ProfessionalCertificate,
    #[serde(rename = "certificates-exec-ed")]
    ExecEd,
    #[serde(rename = "certificates-micro-bachelors")]
    MicroBachelors,
    #[serde(rename = "certificates-micro-masters")]
    MicroMasters,
    #[serde(rename = "degrees-bachelors")]
    Bachelors,
    #[serde(rename = "degrees-masters")]
    Masters,
    #[serde(rename = "degrees-doctorate")]
    Doctorate,
    #[serde(rename = "bootcamps")]
    Bootcamps,
    #[serde(rename = "degrees-certificates")]
    Certificates,
    #[serde(rename = "degrees-licenses")]
    Licenses,
    #[serde(rename = "all-products/mixed")]
    All,
}

impl TagularVariant {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TagularVariant::Courses => "courses",
            TagularVariant::XSeries => "certificates-xseries",
            TagularVariant::ProfessionalCertificate => "certificates-prof-cert",
            TagularVariant::ExecEd => "certificates-exec-ed",
            TagularVariant::MicroBachelors => "certificates-micro-bachelors",
            TagularVariant::MicroMasters => "certificates-micro-masters",
            TagularVariant::Bachelors => "degrees-bachelors",
            TagularVariant::Masters => "degrees-masters",
            TagularVariant::Doctorate => "degrees-doctorate",
            TagularVariant::Bootcamps => "bootcamps",
            TagularVariant::Certificates => "degrees-certificates",
            TagularVariant::Licenses => "degrees-licenses",
            TagularVariant::All => "all-products/mixed",
        }
    }

    /// Variant for a program type or course type, by slug or display name.
    ///
    /// Anything unrecognized counts as a course.
    pub fn for_product_type(product_type: &str) -> TagularVariant {
        match product_type {
            "bachelors" | "Bachelors" => TagularVariant::Bachelors,
            "masters" | "Masters" => TagularVariant::Masters,
            "microbachelors" | "MicroBachelors" => TagularVariant::MicroBachelors,
            "micromasters" | "MicroMasters" => TagularVariant::MicroMasters,
            "professional-certificate" | "Professional Certificate" => {
                TagularVariant::ProfessionalCertificate
            }
            "xseries" | "XSeries" => TagularVariant::XSeries,
            "doctorate" | "Doctorate" => TagularVariant::Doctorate,
            "license" | "License" => TagularVariant::Licenses,
            "certificate" | "Certificate" => TagularVariant::Certificates,
            "executive-education-2u" | "Executive Education" => TagularVariant::ExecEd,
            "bootcamp-2u" | "Boot Camp" => TagularVariant::Bootcamps,
            _ => TagularVariant::Courses,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
