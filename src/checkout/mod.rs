pub mod commit;
pub mod payment;
pub mod pricing;
pub mod receipt;
pub mod status;

use thiserror::Error;

/// User-correctable checkout failures. Each maps to actionable text shown next
/// to the checkout dialog and leaves no durable state behind; the buyer may
/// retry with a different receipt or selection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Insufficient payment. Minimum amount is {minimum}")]
    InsufficientPayment { minimum: f32 },
    #[error("No payment method selected")]
    NoMethodSelected,
    #[error("Selected payment method is not offered by this shop")]
    MethodNotOffered,
    #[error("Missing receipt file for online payment")]
    MissingReceipt,
}
