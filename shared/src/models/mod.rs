//! Domain models for the Agri Assistant client

mod cart;
mod npk;
mod order;
mod product;
mod session;

pub use cart::*;
pub use npk::*;
pub use order::*;
pub use product::*;
pub use session::*;
