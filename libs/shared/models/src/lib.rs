pub mod cart;
pub mod identity;

pub use cart::*;
pub use identity::*;
