//! # Billing Payload
//!
//! Builds the payment-intent update sent to the processor from the form.
//!
//! ```json
//! {
//!   "payment_method_data": {
//!     "billing_details": {
//!       "address": { "city": "Boston", "country": "US", "line1": "1 Main St",
//!                    "line2": "", "postal_code": "02139", "state": "MA" },
//!       "email": "ada@example.com",
//!       "name": "Ada Lovelace"
//!     },
//!     "metadata": { "organization": "", "purchased_for_organization": "" }
//!   },
//!   "shipping": null
//! }
//! ```
//! Afterpay/Clearpay additionally needs `shipping`, filled with the billing
//! address.

use serde::Serialize;

use crate::types::{payment_method, FormValues};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub city: String,
    pub country: String,
    pub line1: String,
    pub line2: String,
    pub postal_code: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingDetails {
    pub address: Address,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMetadata {
    pub organization: String,
    pub purchased_for_organization: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethodData {
    pub billing_details: BillingDetails,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipping {
    pub address: Address,
    pub name: String,
}

/// Parameters for updating the payment intent before confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntentParams {
    pub payment_method_data: PaymentMethodData,
    pub shipping: Option<Shipping>,
}

impl PaymentIntentParams {
    /// Builds the update from the form values and the buyer's account email.
    pub fn from_form(values: &FormValues, email: &str, method: Option<&str>) -> Self {
        let address = Address {
            city: values.city.clone(),
            country: values.country.clone(),
            line1: values.address.clone(),
            line2: values.unit.clone(),
            postal_code: values.postal_code.clone(),
            state: values.state.clone(),
        };
        let name = format!("{} {}", values.first_name, values.last_name);

        let shipping = (method == Some(payment_method::AFTERPAY_CLEARPAY)).then(|| Shipping {
            address: address.clone(),
            name: name.clone(),
        });

        PaymentIntentParams {
            payment_method_data: PaymentMethodData {
                billing_details: BillingDetails {
                    address,
                    email: email.to_string(),
                    name,
                },
                metadata: PaymentMetadata {
                    organization: values.organization.clone(),
                    purchased_for_organization: values.purchased_for_organization.clone(),
                },
            },
            shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldName;
    use serde_json::json;

    fn values() -> FormValues {
        FormValues::default()
            .with(FieldName::FirstName, "Ada")
            .with(FieldName::LastName, "Lovelace")
            .with(FieldName::Address, "1 Main St")
            .with(FieldName::City, "Boston")
            .with(FieldName::Country, "US")
            .with(FieldName::State, "MA")
            .with(FieldName::PostalCode, "02139")
    }

    #[test]
    fn test_billing_details_payload() {
        let params = PaymentIntentParams::from_form(&values(), "ada@example.com", Some("card"));

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "payment_method_data": {
                    "billing_details": {
                        "address": {
                            "city": "Boston",
                            "country": "US",
                            "line1": "1 Main St",
                            "line2": "",
                            "postal_code": "02139",
                            "state": "MA"
                        },
                        "email": "ada@example.com",
                        "name": "Ada Lovelace"
                    },
                    "metadata": { "organization": "", "purchased_for_organization": "" }
                },
                "shipping": null
            })
        );
    }

    #[test]
    fn test_afterpay_gets_shipping_address() {
        let params = PaymentIntentParams::from_form(
            &values().with(FieldName::Unit, "Apt 2"),
            "ada@example.com",
            Some(payment_method::AFTERPAY_CLEARPAY),
        );
        let shipping = params.shipping.unwrap();
        assert_eq!(shipping.name, "Ada Lovelace");
        assert_eq!(shipping.address.line2, "Apt 2");
    }
}
