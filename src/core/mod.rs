//! Entity store - typed create/read/update/delete over the local mirror.
//!
//! Framework-agnostic and free of remote calls. Each sub-module exposes free functions
//! taking the database handle explicitly.

/// Folder persistence
pub mod folder;
/// Item persistence and per-folder lookup
pub mod item;
/// Sale persistence and per-user / per-item lookup
pub mod sale;
/// Shared create-or-update helper and bookkeeping timestamps
pub mod upsert;
/// User persistence and student-number lookup
pub mod user;
