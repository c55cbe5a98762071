use thiserror::Error;

use cart_cell::error::CartError;

use crate::models::CheckoutState;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Gateway network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Missing checkout parameter: {0}")]
    MissingParam(&'static str),

    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidTransition {
        from: CheckoutState,
        to: CheckoutState,
    },

    #[error("Checkout is not in the {expected} state (currently {actual})")]
    WrongState {
        expected: CheckoutState,
        actual: CheckoutState,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Appointment confirmation failed: {0}")]
    ConfirmationFailed(String),

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
