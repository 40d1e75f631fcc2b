//! # Validation Module
//!
//! Field rules for the checkout billing/payment form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Form Validation Pipeline                           │
//! │                                                                         │
//! │  FormValues + ValidationContext                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  compute_required_fields ──► RequiredFields                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  1. validate_required_fields           (always)                        │
//! │  2. validate_ascii_names               (always)                        │
//! │  3. validate_card_details              (legacy card flow only)         │
//! │  4. validate_country_payment_method... (modern processor only)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  FieldErrors  (first rule to flag a field wins; empty = submittable)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure. The only outside input is today's date for
//! the expiry rule, which [`FieldValidator`] lets callers pin.
//!
//! ## Usage
//! ```rust
//! use checkout_core::geo::StaticCatalog;
//! use checkout_core::validation::FieldValidator;
//! use checkout_core::{FieldName, FormValues, ValidationContext};
//!
//! let validator = FieldValidator::new(StaticCatalog::builtin());
//! let values = FormValues::default().with(FieldName::FirstName, "Ada");
//! let ctx = ValidationContext::new("US").with_modern_processor(true);
//!
//! let errors = validator.validate(&values, &ctx);
//! assert!(errors.contains(FieldName::LastName));
//! assert!(!errors.contains(FieldName::FirstName));
//! ```

use chrono::{Datelike, Local, NaiveDate};
use std::collections::btree_map::{self, BTreeMap};

use crate::card::{self, CardBrand, CardNumberIssue};
use crate::error::{FieldErrorCode, FieldErrors};
use crate::geo::CountryStateCatalog;
use crate::types::{payment_method, FieldName, FormValues, ValidationContext};

// =============================================================================
// Country Lists
// =============================================================================

/// Countries that always needed a postal code, before alternate payment
/// methods existed.
pub const BASELINE_POSTAL_CODE_COUNTRIES: &[&str] = &["CA", "GB", "US"];

/// Countries needing a postal code when the modern processor is on.
///
/// The processor requires state and postal code for buy-now-pay-later
/// methods in every country where one of them is offered.
pub const EXTENDED_POSTAL_CODE_COUNTRIES: &[&str] = &[
    "CA", // Affirm, Afterpay, Klarna
    "GB", // Afterpay, Klarna
    "US", // Affirm, Afterpay, Klarna
    "AU", // Afterpay, Klarna
    "AT", // Klarna
    "BE", // Klarna
    "CH", // Klarna
    "CZ", // Klarna
    "DE", // Klarna
    "DK", // Klarna
    "ES", // Klarna
    "FI", // Klarna
    "FR", // Klarna
    "GR", // Klarna
    "IE", // Klarna
    "IT", // Klarna
    "NL", // Klarna
    "NO", // Klarna
    "NZ", // Afterpay, Klarna
    "PL", // Klarna
    "PT", // Klarna
    "SE", // Klarna
];

/// Billing countries Affirm accepts.
pub const AFFIRM_COUNTRIES: &[&str] = &["CA", "US"];

/// Whether the postal code is required for a billing country.
///
/// The flag picks the list; it does not gate the requirement on its own, so
/// CA, GB and US need a postal code either way.
pub fn is_postal_code_required(country: &str, modern_processor_enabled: bool) -> bool {
    let countries = if modern_processor_enabled {
        EXTENDED_POSTAL_CODE_COUNTRIES
    } else {
        BASELINE_POSTAL_CODE_COUNTRIES
    };
    countries.contains(&country)
}

// =============================================================================
// Required Fields
// =============================================================================

/// Fields required under the current context, with their current values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields(BTreeMap<FieldName, String>);

impl RequiredFields {
    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldName, String> {
        self.0.iter()
    }
}

impl FromIterator<(FieldName, String)> for RequiredFields {
    fn from_iter<I: IntoIterator<Item = (FieldName, String)>>(iter: I) -> Self {
        RequiredFields(iter.into_iter().collect())
    }
}

/// Decides which fields are required.
///
/// ## Rules
/// - Always: first name, last name, address, city, country
/// - Expiration month/year: legacy card flow only (the modern processor
///   widget collects them itself)
/// - Postal code: see [`is_postal_code_required`]
/// - State: when the country has subdivisions in the catalog
/// - Organization: bulk orders
pub fn compute_required_fields(
    values: &FormValues,
    context: &ValidationContext,
    catalog: &dyn CountryStateCatalog,
) -> RequiredFields {
    let country = context.selected_country.as_str();
    let modern = context.modern_processor_enabled;

    let mut fields = vec![
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Address,
        FieldName::City,
        FieldName::Country,
    ];

    if !modern {
        fields.push(FieldName::CardExpirationMonth);
        fields.push(FieldName::CardExpirationYear);
    }

    if is_postal_code_required(country, modern) {
        fields.push(FieldName::PostalCode);
    }

    if catalog.has_subdivisions(country) {
        fields.push(FieldName::State);
    }

    if context.is_bulk_order {
        fields.push(FieldName::Organization);
    }

    fields
        .into_iter()
        .map(|field| (field, values.get(field).to_string()))
        .collect()
}

// =============================================================================
// Rules
// =============================================================================

/// Flags every required field whose value is empty.
pub fn validate_required_fields(required: &RequiredFields) -> FieldErrors {
    required
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| (*field, FieldErrorCode::Required))
        .collect()
}

/// Flags names written entirely without Latin letters.
///
/// Card networks need a Latin-script cardholder name. This only fires when
/// both names are present and there is not a single ASCII letter between
/// them, so mixed-script names pass. The error goes on the first name.
pub fn validate_ascii_names(first_name: &str, last_name: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let has_ascii_letter = first_name
        .chars()
        .chain(last_name.chars())
        .any(|c| c.is_ascii_alphabetic());

    if !first_name.is_empty() && !last_name.is_empty() && !has_ascii_letter {
        errors.insert(FieldName::FirstName, FieldErrorCode::AsciiNameRequired);
    }

    errors
}

/// Checks card details typed into the legacy card form.
///
/// ## Rules
/// - Expiry: month before `today`'s month in `today`'s year → `expired`.
///   An earlier year is NOT caught here.
/// - Number (if given): malformed → `invalid-number`, recognized but not
///   accepted brand → `unsupported-brand`
/// - Security code (if given): wrong length for the detected brand, or for
///   the default brand when the number is missing or unusable →
///   `invalid-security-code`
pub fn validate_card_details(
    card_number: &str,
    security_code: &str,
    expiration_month: &str,
    expiration_year: &str,
    today: NaiveDate,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !expiration_month.is_empty() {
        let month = expiration_month.trim().parse::<u32>().ok();
        let year = expiration_year.trim().parse::<i32>().ok();
        if let (Some(month), Some(year)) = (month, year) {
            if month < today.month() && year == today.year() {
                errors.insert(FieldName::CardExpirationMonth, FieldErrorCode::Expired);
            }
        }
    }

    let mut brand = CardBrand::Unknown;
    if !card_number.is_empty() {
        match card::check_card_number(card_number) {
            Ok(detected) => brand = detected,
            Err(CardNumberIssue::Malformed) => {
                errors.insert(FieldName::CardNumber, FieldErrorCode::InvalidNumber);
            }
            Err(CardNumberIssue::UnsupportedBrand(_)) => {
                errors.insert(FieldName::CardNumber, FieldErrorCode::UnsupportedBrand);
            }
        }
    }

    if !security_code.is_empty() && !card::is_valid_security_code(security_code.trim(), brand) {
        errors.insert(FieldName::SecurityCode, FieldErrorCode::InvalidSecurityCode);
    }

    errors
}

/// Rejects billing countries Affirm does not serve.
///
/// Only Affirm is checked on the form. Klarna and Afterpay are rejected by
/// the processor itself, and that error is translated into the
/// `dynamic-payment-methods-country-not-compatible` banner.
pub fn validate_country_payment_method_compatibility(
    modern_processor_enabled: bool,
    selected_method: Option<&str>,
    selected_country: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if modern_processor_enabled
        && selected_method == Some(payment_method::AFFIRM)
        && !AFFIRM_COUNTRIES.contains(&selected_country)
    {
        errors.insert(FieldName::Country, FieldErrorCode::CountryIncompatible);
    }

    errors
}

// =============================================================================
// Field Validator
// =============================================================================

/// Runs the whole rule set against a form.
///
/// Holds no mutable state, so one validator can be shared and called on
/// every keystroke from any thread.
#[derive(Debug, Clone)]
pub struct FieldValidator<C> {
    catalog: C,
    today: Option<NaiveDate>,
}

impl<C: CountryStateCatalog> FieldValidator<C> {
    /// Creates a validator that reads today's date from the local clock.
    pub fn new(catalog: C) -> Self {
        FieldValidator {
            catalog,
            today: None,
        }
    }

    /// Pins the date used by the expiry rule.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// The catalog used for state requirements.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// See [`compute_required_fields`].
    pub fn required_fields(
        &self,
        values: &FormValues,
        context: &ValidationContext,
    ) -> RequiredFields {
        compute_required_fields(values, context, &self.catalog)
    }

    /// Validates the form. An empty result means it can be submitted.
    pub fn validate(&self, values: &FormValues, context: &ValidationContext) -> FieldErrors {
        let required = self.required_fields(values, context);

        let mut errors = validate_required_fields(&required);
        errors.merge(validate_ascii_names(&values.first_name, &values.last_name));

        if !context.modern_processor_enabled {
            errors.merge(validate_card_details(
                &values.card_number,
                &values.security_code,
                &values.card_expiration_month,
                &values.card_expiration_year,
                self.today(),
            ));
        }

        errors.merge(validate_country_payment_method_compatibility(
            context.modern_processor_enabled,
            context.payment_method(),
            &context.selected_country,
        ));

        errors
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::StaticCatalog;

    fn june_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn complete_us_form() -> FormValues {
        FormValues::default()
            .with(FieldName::FirstName, "Ada")
            .with(FieldName::LastName, "Lovelace")
            .with(FieldName::Address, "1 Main St")
            .with(FieldName::City, "Boston")
            .with(FieldName::Country, "US")
            .with(FieldName::State, "MA")
            .with(FieldName::PostalCode, "02139")
            .with(FieldName::CardExpirationMonth, "12")
            .with(FieldName::CardExpirationYear, "2030")
    }

    fn validator() -> FieldValidator<StaticCatalog> {
        FieldValidator::new(StaticCatalog::builtin()).with_today(june_15())
    }

    #[test]
    fn test_always_required_fields() {
        let required = compute_required_fields(
            &FormValues::default(),
            &ValidationContext::new("SG").with_modern_processor(true),
            &StaticCatalog::builtin(),
        );
        let fields: Vec<FieldName> = required.iter().map(|(field, _)| *field).collect();
        assert_eq!(
            fields,
            vec![
                FieldName::FirstName,
                FieldName::LastName,
                FieldName::Address,
                FieldName::City,
                FieldName::Country,
            ]
        );
    }

    #[test]
    fn test_expiration_required_only_in_legacy_flow() {
        let catalog = StaticCatalog::builtin();
        for country in ["US", "DE", "SG", ""] {
            let legacy = compute_required_fields(
                &FormValues::default(),
                &ValidationContext::new(country),
                &catalog,
            );
            assert!(legacy.contains(FieldName::CardExpirationMonth));
            assert!(legacy.contains(FieldName::CardExpirationYear));

            let modern = compute_required_fields(
                &FormValues::default(),
                &ValidationContext::new(country).with_modern_processor(true),
                &catalog,
            );
            assert!(!modern.contains(FieldName::CardExpirationMonth));
            assert!(!modern.contains(FieldName::CardExpirationYear));
        }
    }

    #[test]
    fn test_baseline_countries_always_need_postal_code() {
        for country in BASELINE_POSTAL_CODE_COUNTRIES {
            assert!(is_postal_code_required(country, false));
            assert!(is_postal_code_required(country, true));
        }
    }

    #[test]
    fn test_extended_countries_need_postal_code_only_when_modern() {
        for country in EXTENDED_POSTAL_CODE_COUNTRIES
            .iter()
            .filter(|c| !BASELINE_POSTAL_CODE_COUNTRIES.contains(c))
        {
            assert!(!is_postal_code_required(country, false), "{country}");
            assert!(is_postal_code_required(country, true), "{country}");
        }
        assert!(!is_postal_code_required("SG", true));
    }

    #[test]
    fn test_postal_code_in_required_set() {
        let catalog = StaticCatalog::builtin();
        let values = FormValues::default().with(FieldName::PostalCode, "10115");

        let legacy =
            compute_required_fields(&values, &ValidationContext::new("DE"), &catalog);
        assert!(!legacy.contains(FieldName::PostalCode));

        let modern = compute_required_fields(
            &values,
            &ValidationContext::new("DE").with_modern_processor(true),
            &catalog,
        );
        assert_eq!(modern.get(FieldName::PostalCode), Some("10115"));
    }

    #[test]
    fn test_state_required_when_country_has_subdivisions() {
        let catalog = StaticCatalog::builtin();
        let us = compute_required_fields(
            &FormValues::default(),
            &ValidationContext::new("US"),
            &catalog,
        );
        assert!(us.contains(FieldName::State));

        let sg = compute_required_fields(
            &FormValues::default(),
            &ValidationContext::new("SG"),
            &catalog,
        );
        assert!(!sg.contains(FieldName::State));
    }

    #[test]
    fn test_organization_required_for_bulk_orders() {
        let catalog = StaticCatalog::builtin();
        let bulk = compute_required_fields(
            &FormValues::default(),
            &ValidationContext::new("US").with_bulk_order(true),
            &catalog,
        );
        assert!(bulk.contains(FieldName::Organization));

        let single = compute_required_fields(
            &FormValues::default(),
            &ValidationContext::new("US"),
            &catalog,
        );
        assert!(!single.contains(FieldName::Organization));
    }

    #[test]
    fn test_validate_required_fields() {
        let required: RequiredFields = [
            (FieldName::City, "x".to_string()),
            (FieldName::Address, String::new()),
        ]
        .into_iter()
        .collect();

        let errors = validate_required_fields(&required);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FieldName::Address), Some(FieldErrorCode::Required));
    }

    #[test]
    fn test_validate_ascii_names() {
        assert!(validate_ascii_names("María", "文").is_empty());
        assert!(validate_ascii_names("", "文").is_empty());
        assert!(validate_ascii_names("文", "").is_empty());

        let errors = validate_ascii_names("文", "文");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(FieldName::FirstName),
            Some(FieldErrorCode::AsciiNameRequired)
        );
    }

    #[test]
    fn test_expired_month_in_current_year() {
        let errors = validate_card_details("", "", "5", "2026", june_15());
        assert_eq!(
            errors.get(FieldName::CardExpirationMonth),
            Some(FieldErrorCode::Expired)
        );

        assert!(validate_card_details("", "", "05", "2026", june_15())
            .contains(FieldName::CardExpirationMonth));
        assert!(validate_card_details("", "", "6", "2026", june_15()).is_empty());
        assert!(validate_card_details("", "", "5", "2027", june_15()).is_empty());
    }

    /// The expiry rule only looks at the current year. A card that expired
    /// last year passes this check and is rejected later by the processor.
    #[test]
    fn test_past_year_is_not_flagged() {
        assert!(validate_card_details("", "", "1", "2025", june_15()).is_empty());
        assert!(validate_card_details("", "", "12", "2020", june_15()).is_empty());
    }

    #[test]
    fn test_unparseable_expiry_is_left_to_required_rule() {
        assert!(validate_card_details("", "", "May", "2026", june_15()).is_empty());
        assert!(validate_card_details("", "", "5", "", june_15()).is_empty());
    }

    #[test]
    fn test_card_number_rules() {
        let short = validate_card_details("4111", "", "", "", june_15());
        assert_eq!(
            short.get(FieldName::CardNumber),
            Some(FieldErrorCode::InvalidNumber)
        );

        let diners = validate_card_details("30569309025904", "", "", "", june_15());
        assert_eq!(
            diners.get(FieldName::CardNumber),
            Some(FieldErrorCode::UnsupportedBrand)
        );

        assert!(validate_card_details("4111 1111 1111 1111", "123", "", "", june_15())
            .is_empty());
    }

    #[test]
    fn test_security_code_rules() {
        let amex_short = validate_card_details("378282246310005", "123", "", "", june_15());
        assert_eq!(
            amex_short.get(FieldName::SecurityCode),
            Some(FieldErrorCode::InvalidSecurityCode)
        );
        assert!(validate_card_details("378282246310005", "1234", "", "", june_15()).is_empty());

        // No card number: the default brand expects three digits.
        assert!(validate_card_details("", "123", "", "", june_15()).is_empty());
        assert!(validate_card_details("", "1234", "", "", june_15())
            .contains(FieldName::SecurityCode));
    }

    #[test]
    fn test_country_payment_method_compatibility() {
        let errors = validate_country_payment_method_compatibility(true, Some("affirm"), "GB");
        assert_eq!(
            errors.get(FieldName::Country),
            Some(FieldErrorCode::CountryIncompatible)
        );

        assert!(validate_country_payment_method_compatibility(true, Some("affirm"), "US")
            .is_empty());
        assert!(validate_country_payment_method_compatibility(true, Some("klarna"), "GB")
            .is_empty());
        assert!(validate_country_payment_method_compatibility(false, Some("affirm"), "GB")
            .is_empty());
        assert!(validate_country_payment_method_compatibility(true, None, "GB").is_empty());
    }

    #[test]
    fn test_complete_form_is_submittable() {
        let errors = validator().validate(&complete_us_form(), &ValidationContext::new("US"));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_first_rule_wins_per_field() {
        let mut values = complete_us_form().with(FieldName::Country, "");
        values.set(FieldName::FirstName, "文");
        values.set(FieldName::LastName, "文");

        let ctx = ValidationContext::new("GB")
            .with_modern_processor(true)
            .with_payment_method("affirm");
        let errors = validator().validate(&values, &ctx);

        // Required fired first on country, compatibility did not replace it.
        assert_eq!(errors.get(FieldName::Country), Some(FieldErrorCode::Required));
        assert_eq!(
            errors.get(FieldName::FirstName),
            Some(FieldErrorCode::AsciiNameRequired)
        );
    }

    #[test]
    fn test_card_rules_skipped_with_modern_processor() {
        let values = complete_us_form()
            .with(FieldName::CardNumber, "4111")
            .with(FieldName::CardExpirationMonth, "1")
            .with(FieldName::CardExpirationYear, "2026");

        let legacy = validator().validate(&values, &ValidationContext::new("US"));
        assert!(legacy.contains(FieldName::CardNumber));
        assert!(legacy.contains(FieldName::CardExpirationMonth));

        let modern = validator().validate(
            &values,
            &ValidationContext::new("US").with_modern_processor(true),
        );
        assert!(modern.is_empty(), "{modern:?}");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let values = FormValues::default().with(FieldName::CardNumber, "30569309025904");
        let ctx = ValidationContext::new("CA").with_bulk_order(true);
        let v = validator();

        let first = serde_json::to_vec(&v.validate(&values, &ctx)).unwrap();
        let second = serde_json::to_vec(&v.validate(&values, &ctx)).unwrap();
        assert_eq!(first, second);
    }
}
