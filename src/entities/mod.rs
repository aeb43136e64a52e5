//! Entity module - Contains all SeaORM entity definitions for the local mirror.
//! Users, folders and items mirror the remote commerce system; sales are local
//! records of purchases and their posting outcome.

pub mod folder;
pub mod item;
pub mod sale;
pub mod user;

// Re-export specific types to avoid conflicts
pub use folder::{Column as FolderColumn, Entity as Folder, Model as FolderModel};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel, SaleStatus};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
