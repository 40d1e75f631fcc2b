//! # Error Types
//!
//! Domain-specific error types for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                      │
//! │  ├── CoreError        - Misuse of the core API (bad field, bad data)   │
//! │  ├── FieldErrorCode   - Why one form field is invalid                  │
//! │  └── FieldErrors      - FieldName → FieldErrorCode for a whole form    │
//! │                                                                         │
//! │  checkout-core translate module                                        │
//! │  └── NormalizedError  - Backend / gateway failure, normalized          │
//! │                                                                         │
//! │  checkout-flow errors (separate crate)                                 │
//! │  └── SubmitError      - What the submit handler sees                   │
//! │                                                                         │
//! │  Flow: FieldErrors ──┐                                                 │
//! │        NormalizedError ─► SubmitError ─► banner / field annotations    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Field error codes are enum variants, never free-form strings
//! 3. Every code maps to an i18n message id and a taxonomy category

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use thiserror::Error;
use ts_rs::TS;

use crate::types::FieldName;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the core API itself.
///
/// Validation failures are NOT errors in this sense: they are data
/// ([`FieldErrors`]) handed back to the form.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A string did not name any known form field.
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    /// Country/state reference data could not be decoded.
    #[error("Invalid country/state catalog: {0}")]
    InvalidCatalog(#[from] serde_json::Error),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Validation Category
// =============================================================================

/// Taxonomy of field validation failures.
///
/// All of them are recoverable locally: the form re-renders the field and
/// lets the user correct it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    MissingField,
    FormatInvalid,
    ContextIncompatible,
    ExpiredCredential,
}

// =============================================================================
// Field Error Code
// =============================================================================

/// Why a single form field is invalid.
///
/// Serialized as the kebab-case symbolic code (`"required"`, `"expired"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum FieldErrorCode {
    /// Required under the current context but empty.
    Required,

    /// Cardholder name has no Latin letters at all.
    AsciiNameRequired,

    /// Expiration month already passed in the current year.
    Expired,

    /// Card number is not a plausible digit sequence.
    InvalidNumber,

    /// Card brand is recognized but not accepted.
    UnsupportedBrand,

    /// Security code length does not match the card brand.
    InvalidSecurityCode,

    /// Billing country cannot be used with the selected payment method.
    CountryIncompatible,
}

impl FieldErrorCode {
    /// Symbolic code as it appears on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldErrorCode::Required => "required",
            FieldErrorCode::AsciiNameRequired => "ascii-name-required",
            FieldErrorCode::Expired => "expired",
            FieldErrorCode::InvalidNumber => "invalid-number",
            FieldErrorCode::UnsupportedBrand => "unsupported-brand",
            FieldErrorCode::InvalidSecurityCode => "invalid-security-code",
            FieldErrorCode::CountryIncompatible => "country-incompatible",
        }
    }

    /// Translation id the form uses to render the message under the input.
    pub const fn message_id(&self) -> &'static str {
        match self {
            FieldErrorCode::Required => "payment.form.errors.required.field",
            FieldErrorCode::AsciiNameRequired => "payment.form.errors.ascii.name",
            FieldErrorCode::Expired => "payment.form.errors.card.expired",
            FieldErrorCode::InvalidNumber => "payment.form.errors.invalid.card.number",
            FieldErrorCode::UnsupportedBrand => "payment.form.errors.unsupported.card",
            FieldErrorCode::InvalidSecurityCode => "payment.form.errors.invalid.security.code",
            FieldErrorCode::CountryIncompatible => {
                "payment.form.errors.dynamic_payment_methods_not_compatible.country"
            }
        }
    }

    /// Taxonomy bucket of this code.
    pub const fn category(&self) -> ValidationCategory {
        match self {
            FieldErrorCode::Required => ValidationCategory::MissingField,
            FieldErrorCode::AsciiNameRequired
            | FieldErrorCode::InvalidNumber
            | FieldErrorCode::UnsupportedBrand
            | FieldErrorCode::InvalidSecurityCode => ValidationCategory::FormatInvalid,
            FieldErrorCode::CountryIncompatible => ValidationCategory::ContextIncompatible,
            FieldErrorCode::Expired => ValidationCategory::ExpiredCredential,
        }
    }
}

impl std::fmt::Display for FieldErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Field name → error code for every field currently in error.
///
/// ## First Rule Wins
/// ```text
/// required rule      ──► firstName: required            (kept)
/// ascii-name rule    ──► firstName: ascii-name-required (ignored)
/// ```
/// [`FieldErrors::insert`] never overwrites, so merging rule outputs in
/// evaluation order keeps the earliest verdict for each field.
///
/// Backed by a `BTreeMap` so iteration and serialization follow form order
/// and identical inputs always produce identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldErrors(BTreeMap<FieldName, FieldErrorCode>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error unless the field already has one.
    ///
    /// Returns `true` if the error was recorded.
    pub fn insert(&mut self, field: FieldName, code: FieldErrorCode) -> bool {
        match self.0.entry(field) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(code);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Folds another rule's output in, keeping existing entries.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, code) in other.0 {
            self.insert(field, code);
        }
    }

    pub fn get(&self, field: FieldName) -> Option<FieldErrorCode> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    /// An empty map means the form can be submitted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, FieldErrorCode)> + '_ {
        self.0.iter().map(|(field, code)| (*field, *code))
    }
}

impl FromIterator<(FieldName, FieldErrorCode)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (FieldName, FieldErrorCode)>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for (field, code) in iter {
            errors.insert(field, code);
        }
        errors
    }
}

impl IntoIterator for FieldErrors {
    type Item = (FieldName, FieldErrorCode);
    type IntoIter = btree_map::IntoIter<FieldName, FieldErrorCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownField("cardHolder".to_string());
        assert_eq!(err.to_string(), "Unknown form field: cardHolder");
    }

    #[test]
    fn test_code_wire_format_matches_as_str() {
        for code in [
            FieldErrorCode::Required,
            FieldErrorCode::AsciiNameRequired,
            FieldErrorCode::Expired,
            FieldErrorCode::InvalidNumber,
            FieldErrorCode::UnsupportedBrand,
            FieldErrorCode::InvalidSecurityCode,
            FieldErrorCode::CountryIncompatible,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            FieldErrorCode::Required.category(),
            ValidationCategory::MissingField
        );
        assert_eq!(
            FieldErrorCode::Expired.category(),
            ValidationCategory::ExpiredCredential
        );
        assert_eq!(
            FieldErrorCode::CountryIncompatible.category(),
            ValidationCategory::ContextIncompatible
        );
        assert_eq!(
            FieldErrorCode::UnsupportedBrand.category(),
            ValidationCategory::FormatInvalid
        );
    }

    #[test]
    fn test_insert_keeps_first_error() {
        let mut errors = FieldErrors::new();
        assert!(errors.insert(FieldName::FirstName, FieldErrorCode::Required));
        assert!(!errors.insert(FieldName::FirstName, FieldErrorCode::AsciiNameRequired));
        assert_eq!(errors.get(FieldName::FirstName), Some(FieldErrorCode::Required));
    }

    #[test]
    fn test_merge_keeps_existing_entries() {
        let mut errors: FieldErrors =
            [(FieldName::Country, FieldErrorCode::Required)].into_iter().collect();
        let later: FieldErrors = [
            (FieldName::Country, FieldErrorCode::CountryIncompatible),
            (FieldName::City, FieldErrorCode::Required),
        ]
        .into_iter()
        .collect();

        errors.merge(later);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(FieldName::Country), Some(FieldErrorCode::Required));
        assert_eq!(errors.get(FieldName::City), Some(FieldErrorCode::Required));
    }

    #[test]
    fn test_serializes_as_plain_map_in_form_order() {
        let errors: FieldErrors = [
            (FieldName::Country, FieldErrorCode::CountryIncompatible),
            (FieldName::FirstName, FieldErrorCode::AsciiNameRequired),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"firstName":"ascii-name-required","country":"country-incompatible"}"#
        );
    }
}
