//! # checkout-flow: Submission Orchestration
//!
//! Everything around the pure checkout logic that touches the outside world:
//! configuration, logging, the analytics session and the payment processor.
//!
//! ## Module Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout-flow                                   │
//! │                                                                         │
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐                      │
//! │  │  config    │   │  logging   │   │  session   │                      │
//! │  │  TOML+env  │──►│  tracing   │   │ correlation│                      │
//! │  └─────┬──────┘   └────────────┘   └─────┬──────┘                      │
//! │        │                                 │                              │
//! │        ▼                                 ▼                              │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │  submit: CheckoutFlow<P: PaymentProcessor, C: Catalog>        │     │
//! │  │    validate ──► processor calls ──► translate failures        │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = Arc::new(CheckoutConfig::load(None)?);
//! init_tracing(&config.logging)?;
//!
//! let session = SessionContext::resolve(&page_url, cookie, &config.session, Utc::now())?;
//! let flow = CheckoutFlow::new(config, processor, FieldValidator::new(StaticCatalog::builtin()));
//!
//! let context = flow.context_for(&values, Some("card"), false);
//! match flow.submit(&basket, &values, &context, &session).await { ... }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod submit;

pub use config::CheckoutConfig;
pub use error::{FlowError, FlowResult, SubmitError, SubmitResult};
pub use logging::init_tracing;
pub use session::SessionContext;
pub use submit::{Basket, CheckoutFlow, PaymentProcessor, SubmitOutcome};
