//! # checkout-core: Pure Checkout Logic
//!
//! Validation and error normalization for the checkout payment form, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Checkout page (UI)                           │   │
//! │  │    Billing form ──► Place order ──► Alert banners              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    checkout-flow                                │   │
//! │  │    config, logging, session context, submission                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ checkout-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │validation │  │ translate │  │ feedback  │  │  billing  │  │   │
//! │  │   │ required  │  │ backend → │  │  alert    │  │ processor │  │   │
//! │  │   │ card, geo │  │ normalized│  │  banners  │  │  payload  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO COOKIES • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Form fields, values and validation context
//! - [`error`] - Field error codes and core errors
//! - [`validation`] - Required fields and field rules
//! - [`card`] - Card brand detection
//! - [`geo`] - Country/state reference data lookup
//! - [`translate`] - Backend/gateway error normalization
//! - [`feedback`] - Alert banners from normalized errors
//! - [`billing`] - Payment-intent payload from the form
//! - [`tracking`] - Analytics event payloads
//!
//! ## Example Usage
//!
//! ```rust
//! use checkout_core::translate::{translate, RequestError};
//! use serde_json::json;
//!
//! let error = RequestError::http(409, json!({ "sku_error": true }));
//! let normalized = translate(error);
//!
//! assert_eq!(
//!     normalized.api_errors()[0].code.as_deref(),
//!     Some("basket-changed-error-message")
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod card;
pub mod error;
pub mod feedback;
pub mod geo;
pub mod tracking;
pub mod translate;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldErrorCode, FieldErrors, ValidationCategory};
pub use geo::{CountryStateCatalog, StaticCatalog};
pub use tracking::{EventName, TrackingEvent, WebElement};
pub use translate::{ErrorCategory, NormalizedError, RequestError};
pub use types::*;
pub use validation::FieldValidator;
