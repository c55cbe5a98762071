// libs/cart-cell/src/services/reconcile.rs
use tracing::{info, warn};

use shared_models::{CartEntry, CartKind, OwnerKey, UserIdentity};

use crate::error::CartError;
use crate::services::api::CartApiClient;
use crate::services::events::CartEvents;
use crate::services::store::{PersistentCartStore, StorageSlot};

/// How a reconciliation run resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Local appointment entries were replaced with the server's list
    /// (possibly empty; "no items" is authoritative).
    Replaced { count: usize },
    /// No signed-in employee or no live cart session: appointment
    /// entries were cleared, everything else left alone.
    ClearedNoSession,
}

/// Keeps the appointment kind aligned with the backend's cart session.
/// Other kinds pass through every merge verbatim.
pub struct CartReconciler<'a> {
    store: &'a PersistentCartStore,
    api: &'a CartApiClient,
    events: &'a CartEvents,
}

impl<'a> CartReconciler<'a> {
    pub fn new(
        store: &'a PersistentCartStore,
        api: &'a CartApiClient,
        events: &'a CartEvents,
    ) -> Self {
        Self { store, api, events }
    }

    pub async fn reconcile(
        &self,
        identity: &UserIdentity,
    ) -> Result<ReconcileOutcome, CartError> {
        let owner = identity.owner_key();
        let session = self.store.load_cart_session(&owner);

        let (employee_id, cart_unique_id) = match (identity.employee_id, session) {
            (Some(emp), Some(session_id)) if emp > 0 => (emp, session_id),
            _ => {
                // Without a live session the server list is unknowable;
                // stale appointment entries must not linger.
                warn!(
                    "Skipping cart reconciliation for {}: no employee or cart session",
                    owner
                );
                self.clear_appointment_entries(&owner)?;
                return Ok(ReconcileOutcome::ClearedNoSession);
            }
        };

        let records = match self
            .api
            .fetch_appointment_cart(employee_id, cart_unique_id)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                // Fetch failure keeps the local cache as-is; the caller
                // surfaces a non-fatal warning and may retry later.
                warn!("Cart reconciliation fetch failed for {}: {}", owner, e);
                return Err(e);
            }
        };

        let fetched = records.len();
        let mut slot = self.store.load_slot(&owner, StorageSlot::Booking);
        slot.retain(|entry| entry.kind() != CartKind::Appointment);
        slot.extend(
            records
                .into_iter()
                .map(|r| CartEntry::Appointment(r.into_appointment_entry(cart_unique_id))),
        );
        self.store.save_slot(&owner, StorageSlot::Booking, &slot)?;
        self.events.notify(&owner, CartKind::Appointment);

        info!(
            "Reconciled appointment cart for {}: {} server entries",
            owner, fetched
        );
        Ok(ReconcileOutcome::Replaced { count: fetched })
    }

    fn clear_appointment_entries(&self, owner: &OwnerKey) -> Result<(), CartError> {
        let mut slot = self.store.load_slot(owner, StorageSlot::Booking);
        let before = slot.len();
        slot.retain(|entry| entry.kind() != CartKind::Appointment);
        if slot.len() != before {
            self.store.save_slot(owner, StorageSlot::Booking, &slot)?;
            self.events.notify(owner, CartKind::Appointment);
        }
        Ok(())
    }
}
