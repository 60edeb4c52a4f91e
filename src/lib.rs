//! Normalize Xcode `project.pbxproj` files so they stay stable across
//! machines, developers, and branches.
//!
//! Two transformations, both preserving the file's Xcode-readable surface
//! syntax byte-for-byte outside the regions they touch:
//!
//! - **Uniquify**: replace Xcode's per-author random object ids with MD5
//!   digests of each object's canonical path in the project graph, so the
//!   same logical object gets the same id everywhere.
//! - **Sort**: reorder section objects and `files`/`children` arrays by
//!   deterministic keys.
//!
//! ```no_run
//! use std::path::Path;
//! use pbxnorm::Normalizer;
//!
//! # fn main() -> pbxnorm::Result<()> {
//! let mut normalizer = Normalizer::open(Path::new("Demo.xcodeproj"))?;
//! let unique = normalizer.uniquify()?;
//! let sort = normalizer.sort(false)?;
//! println!("modified: {}", normalizer.is_modified());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod objects;
pub mod parser;
pub mod project;
pub mod rewrite;
pub mod types;
pub mod unique;

mod normalizer;

pub use error::{Error, Result};
pub use normalizer::{Normalizer, StageReport};
