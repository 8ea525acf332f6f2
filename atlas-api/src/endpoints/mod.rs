//! API endpoint modules organized by resource.
//!
//! Each module adds methods to [`crate::AtlasClient`] for one resource.

pub mod measurements;
pub mod probes;
