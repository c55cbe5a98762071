// libs/cart-cell/src/services/store.rs
use std::sync::Arc;

use tracing::{debug, warn};

use shared_models::{CartBreakdown, CartEntry, CartKind, OwnerKey};
use shared_storage::StorageBackend;

use crate::error::CartError;

/// Physical storage slots per owner. The booking slot is shared by
/// appointment and diagnostic entries, discriminated by the persisted
/// `type` tag; pharmacy predates the tag and keeps its own slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSlot {
    Pharmacy,
    Booking,
}

impl StorageSlot {
    pub fn for_kind(kind: CartKind) -> Self {
        match kind {
            CartKind::Pharmacy => StorageSlot::Pharmacy,
            CartKind::Appointment | CartKind::Diagnostic => StorageSlot::Booking,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            StorageSlot::Pharmacy => "pharmacy",
            StorageSlot::Booking => "booking",
        }
    }
}

/// Key-scoped persistence for cart arrays, the pharmacy breakdown and
/// the reconciliation scalars. Writes are whole-array replace; callers
/// own read-modify-write sequencing.
pub struct PersistentCartStore {
    backend: Arc<dyn StorageBackend>,
}

impl PersistentCartStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    fn slot_key(owner: &OwnerKey, slot: StorageSlot) -> String {
        format!("{}:{}", owner, slot.suffix())
    }

    fn breakdown_key(owner: &OwnerKey) -> String {
        format!("{}:breakdown", owner)
    }

    fn session_key(owner: &OwnerKey) -> String {
        format!("{}:cart_session", owner)
    }

    fn center_key(owner: &OwnerKey) -> String {
        format!("{}:selected_center", owner)
    }

    /// Load a whole slot. Missing or corrupt storage degrades to an
    /// empty array so a bad cache can never break the storefront.
    pub fn load_slot(&self, owner: &OwnerKey, slot: StorageSlot) -> Vec<CartEntry> {
        let key = Self::slot_key(owner, slot);
        let raw = match self.backend.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read cart slot {}: {}", key, e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<CartEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Corrupt cart slot {} ignored: {}", key, e);
                Vec::new()
            }
        }
    }

    pub fn save_slot(
        &self,
        owner: &OwnerKey,
        slot: StorageSlot,
        entries: &[CartEntry],
    ) -> Result<(), CartError> {
        let key = Self::slot_key(owner, slot);
        let raw = serde_json::to_string(entries)?;
        self.backend.write(&key, &raw)?;
        debug!("Saved {} entries to {}", entries.len(), key);

        // The breakdown is derived from the pharmacy array; an empty
        // array must never leave a stale breakdown behind.
        if slot == StorageSlot::Pharmacy && entries.is_empty() {
            self.clear_breakdown(owner)?;
        }
        Ok(())
    }

    /// Load the entries of one kind, filtered out of its physical slot.
    pub fn load(&self, owner: &OwnerKey, kind: CartKind) -> Vec<CartEntry> {
        self.load_slot(owner, StorageSlot::for_kind(kind))
            .into_iter()
            .filter(|entry| entry.kind() == kind)
            .collect()
    }

    pub fn load_breakdown(&self, owner: &OwnerKey) -> Option<CartBreakdown> {
        let key = Self::breakdown_key(owner);
        let raw = self.backend.read(&key).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(breakdown) => Some(breakdown),
            Err(e) => {
                warn!("Corrupt breakdown {} ignored: {}", key, e);
                None
            }
        }
    }

    pub fn save_breakdown(
        &self,
        owner: &OwnerKey,
        breakdown: &CartBreakdown,
    ) -> Result<(), CartError> {
        let raw = serde_json::to_string(breakdown)?;
        self.backend.write(&Self::breakdown_key(owner), &raw)?;
        Ok(())
    }

    pub fn clear_breakdown(&self, owner: &OwnerKey) -> Result<(), CartError> {
        self.backend.remove(&Self::breakdown_key(owner))?;
        Ok(())
    }

    /// The server-issued appointment-cart session handle. Only positive
    /// ids count as a live session.
    pub fn load_cart_session(&self, owner: &OwnerKey) -> Option<i64> {
        let raw = self.backend.read(&Self::session_key(owner)).ok().flatten()?;
        raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
    }

    pub fn save_cart_session(&self, owner: &OwnerKey, id: i64) -> Result<(), CartError> {
        self.backend
            .write(&Self::session_key(owner), &id.to_string())?;
        Ok(())
    }

    pub fn clear_cart_session(&self, owner: &OwnerKey) -> Result<(), CartError> {
        self.backend.remove(&Self::session_key(owner))?;
        Ok(())
    }

    pub fn load_selected_center(&self, owner: &OwnerKey) -> Option<i64> {
        let raw = self.backend.read(&Self::center_key(owner)).ok().flatten()?;
        raw.trim().parse::<i64>().ok()
    }

    pub fn save_selected_center(&self, owner: &OwnerKey, center_id: i64) -> Result<(), CartError> {
        self.backend
            .write(&Self::center_key(owner), &center_id.to_string())?;
        Ok(())
    }
}
