//! # Country / State Reference Data
//!
//! The validator asks one question of geographic data: "does this country
//! have subdivisions?". If it does, the state field becomes required.
//!
//! ## Ownership
//! ```text
//! ┌────────────────────────┐   subdivisions("US")   ┌──────────────────────┐
//! │  FieldValidator        │ ─────────────────────► │ CountryStateCatalog  │
//! │  (this crate)          │ ◄───────────────────── │ (host supplied)      │
//! └────────────────────────┘   Some({"AL", ...})    └──────────────────────┘
//! ```
//! The full ISO 3166-2 table belongs to the host application. This module
//! defines the lookup trait, an in-memory implementation that can be loaded
//! from JSON, and a small built-in table used as a default and in tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreResult;

/// Read-only lookup from country code to subdivision codes.
pub trait CountryStateCatalog: Send + Sync {
    /// Returns the subdivision codes of a country.
    ///
    /// `None` means the country has no known subdivisions. Implementations
    /// must not return `Some` of an empty set.
    fn subdivisions(&self, country: &str) -> Option<&BTreeSet<String>>;

    /// Whether the state field applies to this country.
    fn has_subdivisions(&self, country: &str) -> bool {
        self.subdivisions(country).is_some()
    }
}

/// In-memory catalog keyed by ISO 3166-1 alpha-2 code.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    countries: BTreeMap<String, BTreeSet<String>>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a country with its subdivision codes. Empty lists are dropped.
    pub fn with_country<I, S>(mut self, country: &str, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: BTreeSet<String> = codes.into_iter().map(Into::into).collect();
        if !codes.is_empty() {
            self.countries.insert(country.to_string(), codes);
        }
        self
    }

    /// Loads a catalog from `{"US": ["AL", "AK", ...], ...}`.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(raw
            .into_iter()
            .fold(StaticCatalog::new(), |catalog, (country, codes)| {
                catalog.with_country(&country, codes)
            }))
    }

    /// Built-in subdivision table for the most common billing countries.
    pub fn builtin() -> Self {
        StaticCatalog::new()
            .with_country("US", US_STATES.iter().copied())
            .with_country("CA", CA_PROVINCES.iter().copied())
            .with_country("AU", AU_STATES.iter().copied())
    }

    /// Number of countries with subdivisions.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl CountryStateCatalog for StaticCatalog {
    fn subdivisions(&self, country: &str) -> Option<&BTreeSet<String>> {
        self.countries.get(country)
    }
}

const US_STATES: &[&str] = &[
    "AK", "AL", "AR", "AS", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "GU", "HI", "IA",
    "ID", "IL", "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MP", "MS", "MT",
    "NC", "ND", "NE", "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "PR", "RI", "SC",
    "SD", "TN", "TX", "UM", "UT", "VA", "VI", "VT", "WA", "WI", "WV", "WY",
];

const CA_PROVINCES: &[&str] = &[
    "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
];

const AU_STATES: &[&str] = &["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"];

// =============================================================================
// Unit Tests
// =============================================================================
