// libs/shared/models/src/cart.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CART KINDS
// ==============================================================================

/// The three storefront domains a cart entry can belong to. The kind is
/// fixed at creation and drives which persisted slot an entry lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CartKind {
    Pharmacy,
    Appointment,
    Diagnostic,
}

impl fmt::Display for CartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartKind::Pharmacy => write!(f, "pharmacy"),
            CartKind::Appointment => write!(f, "appointment"),
            CartKind::Diagnostic => write!(f, "diagnostic"),
        }
    }
}

// ==============================================================================
// CART ENTRIES
// ==============================================================================

/// Marker for the persisted `type` tag on appointment entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentTag {
    #[default]
    Appointment,
}

/// Marker for the persisted `type` tag on diagnostic entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticTag {
    #[default]
    Diagnostic,
}

/// One line in a persisted cart array.
///
/// Appointment and diagnostic entries carry an explicit `type` tag; the
/// pharmacy shape predates the tag and is recognized by its absence, so
/// the untagged variants are tried tag-first with pharmacy as the legacy
/// fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CartEntry {
    Appointment(AppointmentEntry),
    Diagnostic(DiagnosticEntry),
    Pharmacy(PharmacyEntry),
}

impl CartEntry {
    pub fn kind(&self) -> CartKind {
        match self {
            CartEntry::Pharmacy(_) => CartKind::Pharmacy,
            CartEntry::Appointment(_) => CartKind::Appointment,
            CartEntry::Diagnostic(_) => CartKind::Diagnostic,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            CartEntry::Pharmacy(e) => e.quantity,
            CartEntry::Appointment(e) => e.quantity,
            CartEntry::Diagnostic(e) => e.quantity,
        }
    }

    /// Unit price used for totals. Pharmacy entries prefer the inventory
    /// snapshot's discounted price over the flat price when present.
    pub fn resolved_unit_price(&self) -> f64 {
        match self {
            CartEntry::Pharmacy(e) => e.resolved_unit_price(),
            CartEntry::Appointment(e) => e.price,
            CartEntry::Diagnostic(e) => e.price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.resolved_unit_price() * f64::from(self.quantity())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PharmacyEntry {
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
    pub unit_price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventorySnapshot>,
    #[serde(default)]
    pub total_payable: f64,
}

impl PharmacyEntry {
    pub fn resolved_unit_price(&self) -> f64 {
        self.inventory
            .as_ref()
            .and_then(|inv| inv.discounted_price)
            .unwrap_or(self.unit_price)
    }
}

/// Inventory pricing captured at add-to-cart time. Discounted price wins
/// over the flat unit price when the snapshot carries one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub mrp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentEntry {
    #[serde(rename = "type")]
    pub tag: AppointmentTag,
    pub case_lead_id: i64,
    /// Server-issued session handle for the appointment cart.
    pub cart_unique_id: i64,
    #[serde(default)]
    pub cart_details_id: i64,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub consultation_type: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticEntry {
    #[serde(rename = "type")]
    pub tag: DiagnosticTag,
    pub test_id: i64,
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// "Self" or the dependent's name.
    #[serde(default = "default_beneficiary")]
    pub beneficiary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_id: Option<i64>,
}

fn default_quantity() -> u32 {
    1
}

fn default_beneficiary() -> String {
    "Self".to_string()
}

// ==============================================================================
// PHARMACY BREAKDOWN
// ==============================================================================

/// Server-computed pricing summary for the pharmacy cart. Derived state:
/// it must be deleted whenever the pharmacy array empties, never left
/// dangling as a stale source of totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartBreakdown {
    pub original_price: f64,
    pub discounted_price: f64,
    pub discount_amount: f64,
    #[serde(default)]
    pub handling_fee: f64,
    #[serde(default)]
    pub platform_fee: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub total_payable: f64,
    pub updated_at: DateTime<Utc>,
}
