//! Wire types for the portal service.
//!
//! The service answers every call with a layered [`ResultEnvelope`]: an outer
//! status plus zero or more named [`SectionResult`]s, each carrying its own
//! error. This crate only describes that shape and how calls are identified
//! ([`CallSignature`]); interpreting success and failure is left to the client.
//!
//! # Main Types
//!
//! - [`ResultEnvelope`] - Outer response with header, error, and sections
//! - [`SectionResult`] - One named sub-result (`Portal`, `Content`, ...)
//! - [`ErrorPayload`] - Service-provided error details
//! - [`Parameters`] - Ordered call parameters
//! - [`CallSignature`] - Path, method, parameters, and session flag of a call

pub mod envelope;
pub mod signature;

pub use envelope::{ErrorPayload, Header, ResultEnvelope, SectionResult, section};
pub use signature::{CallSignature, Parameters};
