//! # Blastfield Common
//!
//! Common types, utilities, and shared abstractions for Blastfield.
//!
//! This crate provides foundational types used across all Blastfield crates:
//! - Geometry (integer rectangles, display density)
//! - Packed ARGB colours
//! - Session identifiers
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;
