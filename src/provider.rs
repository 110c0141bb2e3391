//! Provider-facing descriptors: validated base URL, environment, and wire quirks.
//!
//! `descriptor` exposes [`ProviderDescriptor`], the only configuration the endpoint
//! adapters need to address the funding and one-time-token APIs. Header names the
//! provider uses for step-up signalling live in [`ProviderQuirks`] so deployments against
//! a differently configured gateway can override them without touching flow code.

pub mod descriptor;

pub use descriptor::*;
