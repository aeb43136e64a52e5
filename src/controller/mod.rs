//! Controllers - operations that combine the entity store with the remote.
//!
//! Each controller owns a database handle and a [`CommerceApi`](crate::api::CommerceApi)
//! implementation and runs every step of an operation in order.

/// Sale creation and posting
pub mod sale;
/// Folder and item synchronization
pub mod sync;
/// Member login
pub mod user;

pub use sale::{SaleController, TotalPriceMismatch};
pub use sync::SyncController;
pub use user::UserController;
