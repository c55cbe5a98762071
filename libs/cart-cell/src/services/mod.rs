pub mod aggregate;
pub mod api;
pub mod cart;
pub mod events;
pub mod reconcile;
pub mod store;

pub use aggregate::{ActivePage, CartView};
pub use api::CartApiClient;
pub use cart::{CartService, CartSummary, EntrySelector};
pub use events::{CartChange, CartEvents};
pub use reconcile::{CartReconciler, ReconcileOutcome};
pub use store::{PersistentCartStore, StorageSlot};
