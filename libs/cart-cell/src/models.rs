// libs/cart-cell/src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_models::{AppointmentEntry, AppointmentTag};

use crate::error::CartError;

/// Defaults applied when the backend emits neither the new nor the legacy
/// field name for a consultation record.
pub const DEFAULT_CONSULTATION_TYPE: &str = "Consultation";
pub const DEFAULT_DOCTOR_NAME: &str = "Doctor";
pub const DEFAULT_RELATIONSHIP: &str = "Self";

// ==============================================================================
// RESPONSE ENVELOPES
// ==============================================================================

/// The cart endpoint has shipped four envelope shapes over time: a bare
/// array and objects wrapping the array under `items`, `data` or
/// `results`. Anything else is a typed parse error, never a silent empty
/// list.
#[derive(Debug)]
pub enum ResponseEnvelope {
    Bare(Vec<Value>),
    Items(Vec<Value>),
    Data(Vec<Value>),
    Results(Vec<Value>),
}

impl ResponseEnvelope {
    pub fn parse(value: Value) -> Result<Self, CartError> {
        match value {
            Value::Array(items) => Ok(ResponseEnvelope::Bare(items)),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.remove("items") {
                    return Ok(ResponseEnvelope::Items(items));
                }
                if let Some(Value::Array(items)) = map.remove("data") {
                    return Ok(ResponseEnvelope::Data(items));
                }
                if let Some(Value::Array(items)) = map.remove("results") {
                    return Ok(ResponseEnvelope::Results(items));
                }
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                Err(CartError::UnrecognizedEnvelope(format!(
                    "object with keys [{}]",
                    keys.join(", ")
                )))
            }
            other => Err(CartError::UnrecognizedEnvelope(format!(
                "unexpected JSON {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            ResponseEnvelope::Bare(items)
            | ResponseEnvelope::Items(items)
            | ResponseEnvelope::Data(items)
            | ResponseEnvelope::Results(items) => items,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ==============================================================================
// SERVER CART RECORDS
// ==============================================================================

/// One consultation line as the backend returns it. The backend schema
/// migrated field names mid-flight, so every field accepts the legacy
/// alias alongside the current name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItemRecord {
    #[serde(rename = "CartDetailsId", alias = "ConsultationCartDetailsId", default)]
    pub cart_details_id: i64,

    #[serde(rename = "CaseLeadId", alias = "ConsultationCaseLeadId", default)]
    pub case_lead_id: i64,

    #[serde(rename = "PatientName", alias = "PersonName", default)]
    pub patient_name: Option<String>,

    #[serde(rename = "Relationship", alias = "Relation", default)]
    pub relationship: Option<String>,

    #[serde(rename = "DoctorName", alias = "ConsultantName", default)]
    pub doctor_name: Option<String>,

    #[serde(rename = "Specialization", alias = "Speciality", default)]
    pub specialization: Option<String>,

    #[serde(rename = "ConsultationType", alias = "CaseTypeName", default)]
    pub consultation_type: Option<String>,

    #[serde(rename = "AppointmentDate", alias = "CollectionDate", default)]
    pub appointment_date: Option<String>,

    #[serde(rename = "AppointmentTime", alias = "SlotTime", default)]
    pub appointment_time: Option<String>,

    #[serde(rename = "Amount", alias = "Price", default)]
    pub amount: f64,

    #[serde(rename = "Quantity", alias = "Qty", default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartItemRecord {
    /// Map a server record into a persisted appointment entry, filling
    /// domain defaults where both field generations were absent.
    pub fn into_appointment_entry(self, cart_unique_id: i64) -> AppointmentEntry {
        AppointmentEntry {
            tag: AppointmentTag::Appointment,
            case_lead_id: self.case_lead_id,
            cart_unique_id,
            cart_details_id: self.cart_details_id,
            patient_name: self.patient_name.unwrap_or_default(),
            relationship: self
                .relationship
                .unwrap_or_else(|| DEFAULT_RELATIONSHIP.to_string()),
            doctor_name: self
                .doctor_name
                .unwrap_or_else(|| DEFAULT_DOCTOR_NAME.to_string()),
            specialization: self.specialization.unwrap_or_default(),
            consultation_type: self
                .consultation_type
                .unwrap_or_else(|| DEFAULT_CONSULTATION_TYPE.to_string()),
            appointment_date: self.appointment_date.unwrap_or_default(),
            appointment_time: self.appointment_time.unwrap_or_default(),
            price: self.amount,
            quantity: self.quantity,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.amount * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_accepts_all_four_known_shapes() {
        let bare = json!([{"CartDetailsId": 1}]);
        assert_eq!(ResponseEnvelope::parse(bare).unwrap().into_items().len(), 1);

        for key in ["items", "data", "results"] {
            let wrapped = json!({ key: [{"CartDetailsId": 1}, {"CartDetailsId": 2}] });
            let items = ResponseEnvelope::parse(wrapped).unwrap().into_items();
            assert_eq!(items.len(), 2, "envelope key {key}");
        }
    }

    #[test]
    fn envelope_rejects_unknown_shapes() {
        let unknown = json!({"payload": []});
        assert!(matches!(
            ResponseEnvelope::parse(unknown),
            Err(CartError::UnrecognizedEnvelope(_))
        ));
        assert!(matches!(
            ResponseEnvelope::parse(json!("oops")),
            Err(CartError::UnrecognizedEnvelope(_))
        ));
    }

    #[test]
    fn record_accepts_legacy_field_names() {
        let legacy = json!({
            "ConsultationCartDetailsId": 55,
            "ConsultationCaseLeadId": 9,
            "PersonName": "Ravi Kumar",
            "ConsultantName": "Dr. Mehta",
            "CaseTypeName": "Video Consultation",
            "CollectionDate": "2026-09-01",
            "SlotTime": "11:00",
            "Price": 450.0
        });
        let record: CartItemRecord = serde_json::from_value(legacy).unwrap();
        assert_eq!(record.cart_details_id, 55);
        assert_eq!(record.patient_name.as_deref(), Some("Ravi Kumar"));
        assert_eq!(record.amount, 450.0);
        assert_eq!(record.quantity, 1);
    }

    #[test]
    fn mapping_applies_domain_defaults() {
        let sparse = json!({"CartDetailsId": 3, "CaseLeadId": 12});
        let record: CartItemRecord = serde_json::from_value(sparse).unwrap();
        let entry = record.into_appointment_entry(777);
        assert_eq!(entry.cart_unique_id, 777);
        assert_eq!(entry.consultation_type, DEFAULT_CONSULTATION_TYPE);
        assert_eq!(entry.doctor_name, DEFAULT_DOCTOR_NAME);
        assert_eq!(entry.relationship, DEFAULT_RELATIONSHIP);
    }
}
