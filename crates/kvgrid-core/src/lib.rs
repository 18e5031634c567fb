//! # kvgrid-core - Core Domain Types
//!
//! Foundation crate for kvgrid. Provides the store value model, error
//! handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde_json, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Value Model (`value`)
//! - [`Value`] - A store value: `Scalar` text or a `Matrix` of cells
//! - [`ShapeFingerprint`] - Cheap dimension summary for the patch-vs-rebuild decision
//! - [`normalize_cell()`] - Canonical decimal form for numeric-looking cell text
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use kvgrid_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod value;

/// Prelude for common imports used throughout all kvgrid crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use value::{format_number, normalize_cell, parse_numeric, ShapeFingerprint, Value};
