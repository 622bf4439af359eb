//! Domain layer for md-normalize
//!
//! Outcomes of a normalization run and the error taxonomy shared by the walker
//! and the rewriter. Nothing here touches the filesystem.

pub mod outcome;

// Re-export main domain types for convenience
pub use outcome::*;
