//! Strong customer authentication building blocks.
//!
//! - [`attempt`] performs one funding call and classifies the reply.
//! - [`challenge`] models step-up challenges reported by the one-time-token API.
//! - [`code`] defines the pluggable [`CodeProvider`] that supplies one-time codes.
//! - [`resolver`] drives a challenge's outstanding list to empty, bounded by
//!   [`ResolverConfig`].
//!
//! [`flows::FundingOrchestrator`](crate::flows::FundingOrchestrator) ties them together.

pub mod attempt;
pub mod challenge;
pub mod code;
pub mod resolver;

pub(crate) mod wire;

pub use attempt::*;
pub use challenge::*;
pub use code::*;
pub use resolver::*;
