//! # Domain Types
//!
//! Form-level types shared by the validator, the translator and the UI.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Form Types                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌───────────────────┐   ┌─────────────────┐     │
//! │  │   FieldName     │   │    FormValues     │   │ ValidationCtx   │     │
//! │  │  ─────────────  │   │  ───────────────  │   │  ─────────────  │     │
//! │  │  firstName      │   │  one String per   │   │  country        │     │
//! │  │  lastName       │──►│  FieldName, ""    │   │  payment method │     │
//! │  │  ...            │   │  = not provided   │   │  modern flag    │     │
//! │  │  cardNumber     │   │                   │   │  bulk order     │     │
//! │  └─────────────────┘   └───────────────────┘   └─────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names travel as camelCase strings because that is what the form
//! library on the page uses as input names.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Field Name
// =============================================================================

/// Every input on the billing/payment form.
///
/// The declaration order is the order fields appear on the form, which is
/// also the iteration order of every map keyed by `FieldName`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FirstName,
    LastName,
    Address,
    Unit,
    City,
    Country,
    State,
    PostalCode,
    Organization,
    PurchasedForOrganization,
    CardNumber,
    SecurityCode,
    CardExpirationMonth,
    CardExpirationYear,
}

impl FieldName {
    /// All fields in form order.
    pub const ALL: [FieldName; 14] = [
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Address,
        FieldName::Unit,
        FieldName::City,
        FieldName::Country,
        FieldName::State,
        FieldName::PostalCode,
        FieldName::Organization,
        FieldName::PurchasedForOrganization,
        FieldName::CardNumber,
        FieldName::SecurityCode,
        FieldName::CardExpirationMonth,
        FieldName::CardExpirationYear,
    ];

    /// The input name used by the form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldName::FirstName => "firstName",
            FieldName::LastName => "lastName",
            FieldName::Address => "address",
            FieldName::Unit => "unit",
            FieldName::City => "city",
            FieldName::Country => "country",
            FieldName::State => "state",
            FieldName::PostalCode => "postalCode",
            FieldName::Organization => "organization",
            FieldName::PurchasedForOrganization => "purchasedForOrganization",
            FieldName::CardNumber => "cardNumber",
            FieldName::SecurityCode => "securityCode",
            FieldName::CardExpirationMonth => "cardExpirationMonth",
            FieldName::CardExpirationYear => "cardExpirationYear",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

// =============================================================================
// Form Values
// =============================================================================

/// Current values of the checkout form.
///
/// ## Empty Means Missing
/// A key missing from the submitted JSON decodes as `""`, and every rule
/// treats `""` as "not provided". There is no separate `None` state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub unit: String,
    pub city: String,
    pub country: String,
    pub state: String,
    pub postal_code: String,
    pub organization: String,
    pub purchased_for_organization: String,
    pub card_number: String,
    pub security_code: String,
    pub card_expiration_month: String,
    pub card_expiration_year: String,
}

impl FormValues {
    /// Returns the value of a field.
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::FirstName => &self.first_name,
            FieldName::LastName => &self.last_name,
            FieldName::Address => &self.address,
            FieldName::Unit => &self.unit,
            FieldName::City => &self.city,
            FieldName::Country => &self.country,
            FieldName::State => &self.state,
            FieldName::PostalCode => &self.postal_code,
            FieldName::Organization => &self.organization,
            FieldName::PurchasedForOrganization => &self.purchased_for_organization,
            FieldName::CardNumber => &self.card_number,
            FieldName::SecurityCode => &self.security_code,
            FieldName::CardExpirationMonth => &self.card_expiration_month,
            FieldName::CardExpirationYear => &self.card_expiration_year,
        }
    }

    /// Sets the value of a field.
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        let slot = match field {
            FieldName::FirstName => &mut self.first_name,
            FieldName::LastName => &mut self.last_name,
            FieldName::Address => &mut self.address,
            FieldName::Unit => &mut self.unit,
            FieldName::City => &mut self.city,
            FieldName::Country => &mut self.country,
            FieldName::State => &mut self.state,
            FieldName::PostalCode => &mut self.postal_code,
            FieldName::Organization => &mut self.organization,
            FieldName::PurchasedForOrganization => &mut self.purchased_for_organization,
            FieldName::CardNumber => &mut self.card_number,
            FieldName::SecurityCode => &mut self.security_code,
            FieldName::CardExpirationMonth => &mut self.card_expiration_month,
            FieldName::CardExpirationYear => &mut self.card_expiration_year,
        };
        *slot = value.into();
    }

    /// Builder-style variant of [`FormValues::set`].
    pub fn with(mut self, field: FieldName, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Alternate payment method identifiers as reported by the processor SDK.
pub mod payment_method {
    /// Buy-now-pay-later method with strict country eligibility checked on the form.
    pub const AFFIRM: &str = "affirm";
    /// Requires a shipping address on the payment intent.
    pub const AFTERPAY_CLEARPAY: &str = "afterpay_clearpay";
    pub const KLARNA: &str = "klarna";
}

// =============================================================================
// Validation Context
// =============================================================================

/// Flags that change which rules apply to the form.
///
/// Built once per validation call and never mutated by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationContext {
    /// ISO 3166-1 alpha-2 code of the billing country.
    #[serde(default)]
    pub selected_country: String,

    /// Alternate payment method picked in the processor widget, if any.
    #[serde(default)]
    pub alternate_payment_method: Option<String>,

    /// Modern processor integration (dynamic payment methods) is enabled.
    #[serde(default)]
    pub modern_processor_enabled: bool,

    /// Purchase is made on behalf of an organization.
    #[serde(default)]
    pub is_bulk_order: bool,
}

impl ValidationContext {
    /// Creates a context for the given country with every flag off.
    pub fn new(selected_country: impl Into<String>) -> Self {
        ValidationContext {
            selected_country: selected_country.into(),
            ..Default::default()
        }
    }

    pub fn with_modern_processor(mut self, enabled: bool) -> Self {
        self.modern_processor_enabled = enabled;
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.alternate_payment_method = Some(method.into());
        self
    }

    pub fn with_bulk_order(mut self, is_bulk_order: bool) -> Self {
        self.is_bulk_order = is_bulk_order;
        self
    }

    /// Returns the selected payment method, if any.
    pub fn payment_method(&self) -> Option<&str> {
        self.alternate_payment_method.as_deref()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_round_trips_through_str() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
        assert!("cardHolder".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_field_name_serializes_as_input_name() {
        let json = serde_json::to_string(&FieldName::CardExpirationMonth).unwrap();
        assert_eq!(json, "\"cardExpirationMonth\"");
    }

    #[test]
    fn test_missing_form_keys_decode_as_empty() {
        let values: FormValues =
            serde_json::from_str(r#"{"firstName":"Ada","postalCode":"02139"}"#).unwrap();
        assert_eq!(values.get(FieldName::FirstName), "Ada");
        assert_eq!(values.get(FieldName::PostalCode), "02139");
        assert_eq!(values.get(FieldName::LastName), "");
    }

    #[test]
    fn test_set_and_get_cover_every_field() {
        let mut values = FormValues::default();
        for field in FieldName::ALL {
            values.set(field, field.as_str());
        }
        for field in FieldName::ALL {
            assert_eq!(values.get(field), field.as_str());
        }
    }

    #[test]
    fn test_context_builders() {
        let ctx = ValidationContext::new("US")
            .with_modern_processor(true)
            .with_payment_method(payment_method::AFFIRM)
            .with_bulk_order(true);
        assert_eq!(ctx.selected_country, "US");
        assert_eq!(ctx.payment_method(), Some("affirm"));
        assert!(ctx.modern_processor_enabled);
        assert!(ctx.is_bulk_order);
    }
}
