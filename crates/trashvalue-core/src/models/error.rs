use thiserror::Error;

/// Input rejected before any request is sent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Enter a valid amount")]
    InvalidAmount,

    #[error("The minimum amount is {minimum}")]
    BelowMinimum { minimum: String },

    #[error("Payment method {0} is not available for this transaction")]
    UnsupportedPaymentMethod(String),

    #[error("Weight must be greater than zero")]
    InvalidWeight,

    #[error("{0} is required")]
    MissingField(&'static str),
}
