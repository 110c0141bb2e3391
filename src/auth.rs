//! Provider-facing identifiers and redacted credential material.

pub mod id;
pub mod secret;

pub use id::*;
pub use secret::*;
