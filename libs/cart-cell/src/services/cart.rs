// libs/cart-cell/src/services/cart.rs
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use shared_config::PortalConfig;
use shared_models::{CartEntry, CartKind, OwnerKey, UserIdentity};
use shared_storage::StorageBackend;

use crate::error::CartError;
use crate::services::aggregate::{ActivePage, CartView};
use crate::services::api::CartApiClient;
use crate::services::events::{CartChange, CartEvents};
use crate::services::reconcile::{CartReconciler, ReconcileOutcome};
use crate::services::store::{PersistentCartStore, StorageSlot};

/// Identifies one entry inside a persisted array by its domain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySelector {
    Pharmacy { product_id: i64 },
    Appointment { cart_details_id: i64 },
    Diagnostic { test_id: i64 },
}

impl EntrySelector {
    pub fn kind(&self) -> CartKind {
        match self {
            EntrySelector::Pharmacy { .. } => CartKind::Pharmacy,
            EntrySelector::Appointment { .. } => CartKind::Appointment,
            EntrySelector::Diagnostic { .. } => CartKind::Diagnostic,
        }
    }

    fn matches(&self, entry: &CartEntry) -> bool {
        match (self, entry) {
            (EntrySelector::Pharmacy { product_id }, CartEntry::Pharmacy(e)) => {
                e.product_id == *product_id
            }
            (EntrySelector::Appointment { cart_details_id }, CartEntry::Appointment(e)) => {
                e.cart_details_id == *cart_details_id
            }
            (EntrySelector::Diagnostic { test_id }, CartEntry::Diagnostic(e)) => {
                e.test_id == *test_id
            }
            _ => false,
        }
    }
}

/// Snapshot of counts and totals for the header badge and cart pages.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub pharmacy_count: usize,
    pub appointment_count: usize,
    pub diagnostic_count: usize,
    pub pharmacy_total: f64,
    pub appointment_total: f64,
    pub diagnostic_total: f64,
    pub active_count: usize,
    pub active_total: f64,
}

/// The single writer over persisted cart state. All mutation paths go
/// through this service so every change reaches subscribers; observers
/// re-read the store on notification instead of trusting event payloads.
pub struct CartService {
    store: PersistentCartStore,
    api: CartApiClient,
    events: CartEvents,
}

impl CartService {
    pub fn new(config: &PortalConfig, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: PersistentCartStore::new(backend),
            api: CartApiClient::new(config),
            events: CartEvents::new(),
        }
    }

    pub fn store(&self) -> &PersistentCartStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartChange> {
        self.events.subscribe()
    }

    pub fn entries(&self, owner: &OwnerKey, kind: CartKind) -> Vec<CartEntry> {
        self.store.load(owner, kind)
    }

    pub fn summary(&self, owner: &OwnerKey, page: ActivePage) -> CartSummary {
        let pharmacy = self.store.load(owner, CartKind::Pharmacy);
        let appointments = self.store.load(owner, CartKind::Appointment);
        let diagnostics = self.store.load(owner, CartKind::Diagnostic);
        let view = CartView::new(&pharmacy, &appointments, &diagnostics);

        CartSummary {
            pharmacy_count: view.count_for(CartKind::Pharmacy),
            appointment_count: view.count_for(CartKind::Appointment),
            diagnostic_count: view.count_for(CartKind::Diagnostic),
            pharmacy_total: view.total_for(CartKind::Pharmacy),
            appointment_total: view.total_for(CartKind::Appointment),
            diagnostic_total: view.total_for(CartKind::Diagnostic),
            active_count: view.active_count(page),
            active_total: view.active_total(page),
        }
    }

    /// Add an entry to its slot. Creation itself happens in the product
    /// screens; the service only owns the persisted mutation.
    pub fn add_entry(&self, owner: &OwnerKey, entry: CartEntry) -> Result<(), CartError> {
        let kind = entry.kind();
        let slot = StorageSlot::for_kind(kind);
        let mut entries = self.store.load_slot(owner, slot);
        entries.push(entry);
        self.store.save_slot(owner, slot, &entries)?;
        self.events.notify(owner, kind);
        Ok(())
    }

    /// Set an entry's quantity; zero removes it.
    pub fn set_quantity(
        &self,
        owner: &OwnerKey,
        selector: EntrySelector,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_entry(owner, selector);
        }
        let slot = StorageSlot::for_kind(selector.kind());
        let mut entries = self.store.load_slot(owner, slot);
        let entry = entries
            .iter_mut()
            .find(|e| selector.matches(e))
            .ok_or_else(|| CartError::EntryNotFound(format!("{:?}", selector)))?;

        match entry {
            CartEntry::Pharmacy(e) => {
                e.quantity = quantity;
                e.total_payable = e.resolved_unit_price() * f64::from(quantity);
            }
            CartEntry::Appointment(e) => e.quantity = quantity,
            CartEntry::Diagnostic(e) => e.quantity = quantity,
        }
        self.store.save_slot(owner, slot, &entries)?;
        self.events.notify(owner, selector.kind());
        Ok(())
    }

    pub fn remove_entry(&self, owner: &OwnerKey, selector: EntrySelector) -> Result<(), CartError> {
        let slot = StorageSlot::for_kind(selector.kind());
        let mut entries = self.store.load_slot(owner, slot);
        let before = entries.len();
        entries.retain(|e| !selector.matches(e));
        if entries.len() == before {
            return Err(CartError::EntryNotFound(format!("{:?}", selector)));
        }
        self.store.save_slot(owner, slot, &entries)?;
        self.events.notify(owner, selector.kind());
        Ok(())
    }

    /// Drop every entry of one kind, preserving the rest of the slot.
    /// Checkout completion uses this to consume the purchased kind.
    pub fn clear_kind(&self, owner: &OwnerKey, kind: CartKind) -> Result<(), CartError> {
        let slot = StorageSlot::for_kind(kind);
        let mut entries = self.store.load_slot(owner, slot);
        entries.retain(|e| e.kind() != kind);
        self.store.save_slot(owner, slot, &entries)?;
        self.events.notify(owner, kind);
        info!("Cleared {} cart for {}", kind, owner);
        Ok(())
    }

    pub async fn reconcile(
        &self,
        identity: &UserIdentity,
    ) -> Result<ReconcileOutcome, CartError> {
        CartReconciler::new(&self.store, &self.api, &self.events)
            .reconcile(identity)
            .await
    }
}
