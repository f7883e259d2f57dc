//! Speech provider implementations
//!
//! Contains adapters for different speech synthesis services.

pub mod google_translate;
