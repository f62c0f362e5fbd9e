//! movewiki/crates/mw-core/src/lib.rs
//!
//! The central domain logic and interface definitions for movewiki.

pub mod error;
pub mod markdown;
pub mod models;
pub mod service;
pub mod slug;
pub mod tags;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
