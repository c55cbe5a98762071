pub mod confirmation;
pub mod gateway;
pub mod orchestrator;

pub use confirmation::AppointmentConfirmationClient;
pub use gateway::{HostedPaymentGateway, PaymentGateway};
pub use orchestrator::CheckoutOrchestrator;
