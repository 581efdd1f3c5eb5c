//! Field rules for the online payment form.
//!
//! Same error-set machinery as the case wizard, without steps or submission.
//! Card data is only shape-checked here; nothing is tokenized or stored.

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::{ErrorSet, FieldKey, ValidationError};
use crate::validate::{require_email, require_match, require_text};

static CARD_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{16}$").expect("card number pattern is a valid regex"));
static EXPIRY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("expiry pattern is a valid regex")
});
static CVV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3,4}$").expect("cvv pattern is a valid regex"));
static ZIP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("zip pattern is a valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub cardholder_name: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub billing_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub email: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum PaymentField {
    InvoiceNumber,
    Amount,
    CardholderName,
    CardNumber,
    ExpiryDate,
    Cvv,
    BillingAddress,
    City,
    State,
    ZipCode,
    Email,
}

impl FieldKey for PaymentField {
    fn path(self) -> &'static str {
        match self {
            Self::InvoiceNumber => "invoiceNumber",
            Self::Amount => "amount",
            Self::CardholderName => "cardholderName",
            Self::CardNumber => "cardNumber",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
            Self::BillingAddress => "billingAddress",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::Email => "email",
        }
    }
}

pub type PaymentErrors = ErrorSet<PaymentField>;

pub fn validate_payment(form: &PaymentForm) -> PaymentErrors {
    let mut errors = PaymentErrors::new();

    require_text(
        &mut errors,
        PaymentField::InvoiceNumber,
        &form.invoice_number,
        "Invoice number is required",
    );
    match form.amount {
        None => errors.insert(
            PaymentField::Amount,
            ValidationError::new("Payment amount is required", "required"),
        ),
        Some(amount) if amount.is_nan() || amount <= 0.0 => errors.insert(
            PaymentField::Amount,
            ValidationError::new("Amount must be greater than zero", "min"),
        ),
        Some(_) => {}
    }
    require_text(
        &mut errors,
        PaymentField::CardholderName,
        &form.cardholder_name,
        "Cardholder name is required",
    );
    require_match(
        &mut errors,
        PaymentField::CardNumber,
        &form.card_number,
        "Card number is required",
        &CARD_NUMBER,
        "Card number must be 16 digits",
    );
    require_match(
        &mut errors,
        PaymentField::ExpiryDate,
        &form.expiry_date,
        "Expiry date is required",
        &EXPIRY_DATE,
        "Expiry date must be in MM/YY format",
    );
    require_match(
        &mut errors,
        PaymentField::Cvv,
        &form.cvv,
        "CVV is required",
        &CVV,
        "CVV must be 3 or 4 digits",
    );
    require_text(
        &mut errors,
        PaymentField::BillingAddress,
        &form.billing_address,
        "Billing address is required",
    );
    require_text(&mut errors, PaymentField::City, &form.city, "City is required");
    require_text(
        &mut errors,
        PaymentField::State,
        &form.state,
        "State is required",
    );
    require_match(
        &mut errors,
        PaymentField::ZipCode,
        &form.zip_code,
        "ZIP code is required",
        &ZIP_CODE,
        "ZIP code must be valid",
    );
    require_email(
        &mut errors,
        PaymentField::Email,
        &form.email,
        "Email is required for receipt",
    );

    errors
}
