// libs/checkout-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use cart_cell::models::CartItemRecord;

/// Backend case type code for consultations.
pub const CASE_TYPE_CONSULTATION: i32 = 2;

/// Shown on every voucher; the portal's standard consultation terms.
pub const VOUCHER_TERMS: &str = "Valid only for the scheduled consultation date and time. \
Arrive 15 minutes early with a valid photo ID. Rescheduling is allowed up to 4 hours \
before the appointment through the bookings page.";

// ==============================================================================
// STATE MACHINE
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    FetchingCartDetails,
    Reviewing,
    SubmittingFreeOrder,
    AwaitingGatewayResult,
    ConfirmingAppointment,
    Completed,
    Failed,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutState::Idle => write!(f, "idle"),
            CheckoutState::FetchingCartDetails => write!(f, "fetching_cart_details"),
            CheckoutState::Reviewing => write!(f, "reviewing"),
            CheckoutState::SubmittingFreeOrder => write!(f, "submitting_free_order"),
            CheckoutState::AwaitingGatewayResult => write!(f, "awaiting_gateway_result"),
            CheckoutState::ConfirmingAppointment => write!(f, "confirming_appointment"),
            CheckoutState::Completed => write!(f, "completed"),
            CheckoutState::Failed => write!(f, "failed"),
        }
    }
}

/// Parameters carried into checkout from the cart page. Both ids are
/// required; entering checkout without them is a precondition failure.
#[derive(Debug, Clone, Default)]
pub struct CheckoutParams {
    pub cart_unique_id: Option<i64>,
    pub employee_ref_id: Option<i64>,
    /// Diagnostic-center selection, when the booking carries one.
    pub dc_selection: Option<String>,
}

/// What the review screen renders after the cart fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutView {
    /// The server cart has no line items. A valid terminal view, not an
    /// error.
    EmptyCart,
    Review(OrderSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub line_items: Vec<CartItemRecord>,
    pub subtotal: f64,
}

/// Outcome of driving the payment step to a resting state.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentFlow {
    Completed(Voucher),
    /// The user closed the gateway; checkout is back at review and may
    /// retry without re-fetching the cart.
    Dismissed,
}

// ==============================================================================
// CONFIRMATION API
// ==============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ConfirmAppointmentRequest {
    pub case_lead_id: i64,
    pub case_type: i32,
    pub cart_unique_id: i64,
    pub cart_details_id: i64,
    #[serde(rename = "STMId", skip_serializing_if = "Option::is_none")]
    pub stm_id: Option<i64>,
    /// Date and time concatenated the way the backend expects.
    pub collection_date: String,
    #[serde(rename = "DCSelection", skip_serializing_if = "Option::is_none")]
    pub dc_selection: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ConfirmAppointmentResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub consultation_case_appointment_details_id: Option<i64>,
    #[serde(default)]
    pub district_name: Option<String>,
}

// ==============================================================================
// PAYMENT GATEWAY
// ==============================================================================

/// Order handed to the external gateway. Amounts are minor currency
/// units (paise), converted exactly from the rupee subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOrder {
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub receipt: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Completed { payment_id: String },
    Dismissed,
}

/// Exact rupee-to-paise conversion for gateway amounts.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

// ==============================================================================
// VOUCHER
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Free,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Free => write!(f, "Free"),
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

/// Post-checkout confirmation payload handed to the voucher screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Voucher {
    pub appointment_ref: String,
    pub patient_name: String,
    pub consultation_type: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub amount_paid: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub payment_id: Option<String>,
    pub terms: String,
}

/// Human-readable appointment reference, in priority order: the
/// confirmation API's id, the original case reference, then a
/// timestamp-derived display fallback (not a durable identifier).
pub fn appointment_reference(
    confirmation_id: Option<i64>,
    case_lead_id: i64,
    now: DateTime<Utc>,
) -> String {
    if let Some(id) = confirmation_id {
        format!("APT-{}", id)
    } else if case_lead_id > 0 {
        format!("CASE-{}", case_lead_id)
    } else {
        format!("APT-{}", now.timestamp())
    }
}
