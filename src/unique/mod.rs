//! Uniquification: canonical-path derivation and id assignment.

pub mod hash;
pub mod store;
pub mod subproject;
pub mod walker;

pub use hash::md5_hex;
pub use store::{ResultEntry, ResultStore};
pub use subproject::{Subproject, SubprojectCache};
