//! Structure-aware streaming rewriters over the raw project text.

pub mod backup;
pub mod patterns;
pub mod sort;
pub mod substitute;

pub use sort::{sort_content, SortOutcome};
pub use substitute::{substitute, Substitution};
