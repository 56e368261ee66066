//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod enrichment;
pub mod expenses;
pub mod insights;
pub mod meta;
pub mod suggestions;

// Re-export all handlers for use in router
pub use enrichment::*;
pub use expenses::*;
pub use insights::*;
pub use meta::*;
pub use suggestions::*;
