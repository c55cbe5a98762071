// libs/cart-cell/src/services/events.rs
use tokio::sync::broadcast;
use tracing::debug;

use shared_models::{CartKind, OwnerKey};

/// A cart mutation observers should react to by re-reading the store.
/// The event body is a hint, not a payload: handlers stay idempotent
/// under redundant or out-of-order delivery because the persisted store
/// is the only source of truth.
#[derive(Debug, Clone)]
pub struct CartChange {
    pub owner: OwnerKey,
    pub kind: CartKind,
}

/// In-process broadcast channel replacing the ambient page events the
/// old storefront relied on. Independent views subscribe; every mutation
/// path funnels through the cart service and notifies here.
pub struct CartEvents {
    tx: broadcast::Sender<CartChange>,
}

impl CartEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartChange> {
        self.tx.subscribe()
    }

    pub fn notify(&self, owner: &OwnerKey, kind: CartKind) {
        debug!("Cart changed: owner={} kind={}", owner, kind);
        // No subscribers is fine; views mount and unmount freely.
        let _ = self.tx.send(CartChange {
            owner: owner.clone(),
            kind,
        });
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}
