//! Portal Runtime - transport layer for the portal service
//!
//! This crate moves requests to the service and envelopes back. It does not
//! interpret envelopes or manage sessions; that is the job of the client in
//! `portal-rs`.
//!
//! - **Transport**: the [`Transport`] trait every backend implements
//! - **HTTP**: [`HttpTransport`], form-encoded POSTs decoded as JSON envelopes
//! - **Fake**: [`FakeTransport`], a scripted transport for tests (feature `testing`)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  portal-rs   │  Session manager, dispatcher, cache
//! └──────┬───────┘
//!        │ Transport::invoke
//! ┌──────▼───────┐
//! │portal-runtime│  This crate
//! └──────┬───────┘
//!        │ HTTP POST
//! ┌──────▼───────┐
//! │   service    │
//! └──────────────┘
//! ```

pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod fake;
pub mod http;
pub mod transport;

pub use error::{Result, TransportError};
#[cfg(any(test, feature = "testing"))]
pub use fake::FakeTransport;
pub use http::{HttpTransport, HttpTransportConfig};
pub use transport::{Transport, TransportRequest};
