use std::sync::Arc;

use chrono::Utc;

use cart_cell::services::{PersistentCartStore, StorageSlot};
use shared_models::{
    AppointmentEntry, AppointmentTag, CartBreakdown, CartEntry, CartKind, DiagnosticEntry,
    DiagnosticTag, InventorySnapshot, OwnerKey, PharmacyEntry,
};
use shared_storage::{FileStorage, MemoryStorage, StorageBackend};

fn pharmacy_entry(product_id: i64, unit: f64, qty: u32) -> CartEntry {
    CartEntry::Pharmacy(PharmacyEntry {
        product_id,
        product_name: format!("Product {}", product_id),
        unit_price: unit,
        quantity: qty,
        inventory: Some(InventorySnapshot {
            mrp: unit,
            discounted_price: Some(unit - 10.0),
            discount_percent: None,
        }),
        total_payable: (unit - 10.0) * f64::from(qty),
    })
}

fn appointment_entry(cart_details_id: i64) -> CartEntry {
    CartEntry::Appointment(AppointmentEntry {
        tag: AppointmentTag::Appointment,
        case_lead_id: 5,
        cart_unique_id: 300,
        cart_details_id,
        patient_name: "Asha Verma".to_string(),
        relationship: "Self".to_string(),
        doctor_name: "Dr. Rao".to_string(),
        specialization: "ENT".to_string(),
        consultation_type: "Consultation".to_string(),
        appointment_date: "2026-09-02".to_string(),
        appointment_time: "10:30".to_string(),
        price: 500.0,
        quantity: 1,
    })
}

fn diagnostic_entry(test_id: i64) -> CartEntry {
    CartEntry::Diagnostic(DiagnosticEntry {
        tag: DiagnosticTag::Diagnostic,
        test_id,
        test_name: "Lipid Profile".to_string(),
        price: 350.0,
        quantity: 1,
        beneficiary: "Self".to_string(),
        center_id: Some(12),
    })
}

#[test]
fn save_then_load_round_trips_each_slot() {
    let store = PersistentCartStore::new(Arc::new(MemoryStorage::new()));
    let owner = OwnerKey::for_employee(Some(1023));

    let pharmacy = vec![pharmacy_entry(1, 120.0, 2), pharmacy_entry(2, 60.0, 1)];
    store
        .save_slot(&owner, StorageSlot::Pharmacy, &pharmacy)
        .unwrap();
    assert_eq!(store.load(&owner, CartKind::Pharmacy), pharmacy);

    let booking = vec![appointment_entry(11), diagnostic_entry(21)];
    store
        .save_slot(&owner, StorageSlot::Booking, &booking)
        .unwrap();
    assert_eq!(store.load_slot(&owner, StorageSlot::Booking), booking);
    assert_eq!(store.load(&owner, CartKind::Appointment).len(), 1);
    assert_eq!(store.load(&owner, CartKind::Diagnostic).len(), 1);
}

#[test]
fn file_backed_store_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = PersistentCartStore::new(Arc::new(FileStorage::new(dir.path()).unwrap()));
    let owner = OwnerKey::for_employee(Some(7));

    let booking = vec![appointment_entry(1), diagnostic_entry(2)];
    store
        .save_slot(&owner, StorageSlot::Booking, &booking)
        .unwrap();
    assert_eq!(store.load_slot(&owner, StorageSlot::Booking), booking);
}

#[test]
fn corrupt_or_missing_slots_read_as_empty() {
    let backend = Arc::new(MemoryStorage::new());
    let owner = OwnerKey::for_employee(Some(9));

    backend
        .write(&format!("{}:pharmacy", owner), "not valid json {")
        .unwrap();

    let store = PersistentCartStore::new(backend);
    assert!(store.load(&owner, CartKind::Pharmacy).is_empty());
    assert!(store.load(&owner, CartKind::Appointment).is_empty());
    assert!(store.load_breakdown(&owner).is_none());
}

#[test]
fn carts_are_scoped_per_owner() {
    let store = PersistentCartStore::new(Arc::new(MemoryStorage::new()));
    let alice = OwnerKey::for_employee(Some(1));
    let guest = OwnerKey::for_employee(None);

    store
        .save_slot(&alice, StorageSlot::Pharmacy, &[pharmacy_entry(1, 50.0, 1)])
        .unwrap();

    assert_eq!(store.load(&alice, CartKind::Pharmacy).len(), 1);
    assert!(store.load(&guest, CartKind::Pharmacy).is_empty());
}

#[test]
fn emptying_pharmacy_slot_deletes_breakdown() {
    let store = PersistentCartStore::new(Arc::new(MemoryStorage::new()));
    let owner = OwnerKey::for_employee(Some(44));

    store
        .save_slot(&owner, StorageSlot::Pharmacy, &[pharmacy_entry(1, 80.0, 1)])
        .unwrap();
    store
        .save_breakdown(
            &owner,
            &CartBreakdown {
                original_price: 80.0,
                discounted_price: 70.0,
                discount_amount: 10.0,
                handling_fee: 5.0,
                platform_fee: 2.0,
                delivery_fee: 0.0,
                coupon_code: Some("WELCOME10".to_string()),
                total_payable: 77.0,
                updated_at: Utc::now(),
            },
        )
        .unwrap();
    assert!(store.load_breakdown(&owner).is_some());

    store.save_slot(&owner, StorageSlot::Pharmacy, &[]).unwrap();
    assert!(store.load_breakdown(&owner).is_none());
}

#[test]
fn cart_session_scalar_requires_positive_id() {
    let store = PersistentCartStore::new(Arc::new(MemoryStorage::new()));
    let owner = OwnerKey::for_employee(Some(5));

    assert_eq!(store.load_cart_session(&owner), None);

    store.save_cart_session(&owner, 4021).unwrap();
    assert_eq!(store.load_cart_session(&owner), Some(4021));

    store.save_cart_session(&owner, 0).unwrap();
    assert_eq!(store.load_cart_session(&owner), None);

    store.save_cart_session(&owner, 4021).unwrap();
    store.clear_cart_session(&owner).unwrap();
    assert_eq!(store.load_cart_session(&owner), None);

    store.save_selected_center(&owner, 12).unwrap();
    assert_eq!(store.load_selected_center(&owner), Some(12));
}
