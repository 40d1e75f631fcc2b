//! # Payment Submission
//!
//! The place-order flow around the payment processor.
//!
//! ## Submission Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. validate form ───────────── errors ──► SubmitError::Validation     │
//! │          │                                                              │
//! │  2. update payment intent ───── error ───► translate                   │
//! │          │                                                              │
//! │  3. post payment response ───── error ───► sdn_check_failure?          │
//! │          │                                  yes ► SdnCheckFailed       │
//! │          │                                  no  ► translate            │
//! │          ▼                                                              │
//! │  receipt_page_url ──► Redirect                                         │
//! │  requires_action  ──► handle next action ── error ► translate          │
//! │  otherwise        ──► Accepted                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! `translate` yields `SubmitError::Rejected` for known error shapes and
//! `SubmitError::Unclassified` for anything else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use checkout_core::billing::PaymentIntentParams;
use checkout_core::translate::{self, RequestError};
use checkout_core::{CountryStateCatalog, FieldValidator, FormValues, ValidationContext};

use crate::config::CheckoutConfig;
use crate::error::{SubmitError, SubmitResult};
use crate::session::SessionContext;

// =============================================================================
// Processor Seam
// =============================================================================

/// Payment intent returned by the processor after an update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
}

/// Body posted to the ecommerce payment-response endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentResponseForm {
    pub payment_intent_id: String,
    pub skus: Vec<String>,
    pub dynamic_payment_methods_enabled: bool,
}

/// Ecommerce answer to a payment-response post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProcessorResponse {
    /// Set for card payments that completed immediately.
    #[serde(default)]
    pub receipt_page_url: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    /// Secret for the processor's follow-up step (3DS, BNPL redirect).
    #[serde(default)]
    pub confirmation_client_secret: Option<String>,
}

const REQUIRES_ACTION: &str = "requires_action";

/// Network side of a payment: the processor SDK and the ecommerce API.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Attaches billing details to the payment intent.
    async fn update_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> Result<PaymentIntent, RequestError>;

    /// Tells ecommerce the intent is ready to be charged.
    async fn post_payment_response(
        &self,
        form: &PaymentResponseForm,
    ) -> Result<ProcessorResponse, RequestError>;

    /// Runs the processor's next action (authentication, redirect).
    async fn handle_next_action(&self, client_secret: &str) -> Result<(), RequestError>;
}

// =============================================================================
// Submission Types
// =============================================================================

/// The basket being paid for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Basket {
    pub basket_id: u64,
    pub skus: Vec<String>,
    /// Buyer's account email, sent as the billing email.
    pub email: String,
    #[serde(default)]
    pub is_dynamic_payment_methods_enabled: bool,
}

/// Successful end of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Payment complete; send the browser to the receipt.
    Redirect(String),
    /// The processor's follow-up step completed.
    ActionHandled,
    /// Ecommerce accepted the payment without further instructions.
    Accepted,
}

// =============================================================================
// Checkout Flow
// =============================================================================

/// Validates and submits a checkout form.
pub struct CheckoutFlow<P, C> {
    config: Arc<CheckoutConfig>,
    processor: P,
    validator: FieldValidator<C>,
}

impl<P: PaymentProcessor, C: CountryStateCatalog> CheckoutFlow<P, C> {
    pub fn new(config: Arc<CheckoutConfig>, processor: P, validator: FieldValidator<C>) -> Self {
        CheckoutFlow {
            config,
            processor,
            validator,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Validation context for the form as currently filled in.
    pub fn context_for(
        &self,
        values: &FormValues,
        payment_method: Option<&str>,
        is_bulk_order: bool,
    ) -> ValidationContext {
        ValidationContext {
            selected_country: values.country.clone(),
            alternate_payment_method: payment_method.map(str::to_string),
            modern_processor_enabled: self.config.processor.modern_processor_enabled,
            is_bulk_order,
        }
    }

    /// Runs the whole place-order flow.
    #[instrument(
        skip_all,
        fields(basket_id = basket.basket_id, correlation_id = %session.correlation_id)
    )]
    pub async fn submit(
        &self,
        basket: &Basket,
        values: &FormValues,
        context: &ValidationContext,
        session: &SessionContext,
    ) -> SubmitResult<SubmitOutcome> {
        let field_errors = self.validator.validate(values, context);
        if !field_errors.is_empty() {
            info!(invalid_fields = field_errors.len(), "Form failed validation");
            return Err(SubmitError::Validation(field_errors));
        }

        let params =
            PaymentIntentParams::from_form(values, &basket.email, context.payment_method());
        let intent = self
            .processor
            .update_payment_intent(&params)
            .await
            .map_err(|e| self.fail(basket, "Payment Intent Update Error", e))?;

        let form = PaymentResponseForm {
            payment_intent_id: intent.id,
            skus: basket.skus.clone(),
            dynamic_payment_methods_enabled: basket.is_dynamic_payment_methods_enabled,
        };

        let response = match self.processor.post_payment_response(&form).await {
            Ok(response) => response,
            Err(e) if is_sdn_check_failure(&e) => {
                error!(basket_id = basket.basket_id, error = %e, "SDN Check Error");
                return Err(SubmitError::SdnCheckFailed {
                    redirect_url: self.config.ecommerce.sdn_failure_url(),
                });
            }
            Err(e) => return Err(self.fail(basket, "Submit Error", e)),
        };

        if let Some(url) = response.receipt_page_url {
            info!("Payment complete, redirecting to receipt");
            return Ok(SubmitOutcome::Redirect(url));
        }

        if response.status.as_deref() == Some(REQUIRES_ACTION) {
            let Some(secret) = response.confirmation_client_secret else {
                warn!("Processor asked for an action without a client secret");
                return Err(SubmitError::Unclassified(
                    RequestError::default()
                        .with_code(REQUIRES_ACTION)
                        .with_message("missing confirmation client secret"),
                ));
            };

            self.processor
                .handle_next_action(&secret)
                .await
                .map_err(|e| self.fail(basket, "Next Action Error", e))?;
            return Ok(SubmitOutcome::ActionHandled);
        }

        Ok(SubmitOutcome::Accepted)
    }

    fn fail(&self, basket: &Basket, stage: &str, e: RequestError) -> SubmitError {
        error!(basket_id = basket.basket_id, stage, error = %e, "Payment submission failed");
        SubmitError::from(translate::translate(e))
    }
}

fn is_sdn_check_failure(error: &RequestError) -> bool {
    error
        .data_field("sdn_check_failure")
        .is_some_and(translate::is_truthy)
}

// =============================================================================
// Unit Tests
// =============================================================================
