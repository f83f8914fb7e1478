//! portal: session-managed, caching client for the portal content service
//!
//! Callers describe *what* to call; the client takes care of sessions,
//! access points, caching, and recovering from expired sessions.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use portal::{MemorySettings, ObjectQuery, PortalClient, ServiceCall, keys};
//! use portal_runtime::{HttpTransport, HttpTransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(HttpTransportConfig::new("https://api.example.org/v5"))?;
//!     let settings = MemorySettings::new()
//!         .with(keys::EMAIL, "editor@example.org")
//!         .with(keys::PASSWORD, "secret")
//!         .with(keys::ACCESS_POINT_GUID, "00000000-0000-0000-0000-000000000001");
//!
//!     let client = PortalClient::new(Arc::new(transport), Arc::new(settings));
//!
//!     // Session, access point, and cache are handled by the client.
//!     let envelope = client.call(ServiceCall::new("Object", "Get").param("query", "FolderID:7")).await?;
//!     println!("{} objects", envelope.content_results().len());
//!
//!     client.add_global_constraint("ObjectTypeID:36");
//!     let registry = Arc::new(portal::AttributeRegistry::new());
//!     for object in client.get_objects(ObjectQuery::new("score:[1 TO *]"), &registry).await? {
//!         println!("{:?}", object.guid());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   call()   ┌──────────────┐  session_id()  ┌────────────────┐
//! │    caller    │───────────▶│ PortalClient │───────────────▶│ SessionManager │
//! └──────────────┘            └──────┬───────┘                └───────┬────────┘
//!                                    │ invoke                         │ Create / Login / Update
//!                             ┌──────▼────────────────────────────────▼─┐
//!                             │           Transport (portal-runtime)    │
//!                             └─────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod object;
pub mod observer;
pub mod options;
pub mod outcome;
pub mod query;
pub mod session;
pub mod settings;

pub use cache::{MemoryResponseCache, ResponseCache};
pub use client::{ACCESS_POINT_PARAM, AccessPoint, PortalClient, PortalClientBuilder, ServiceCall};
pub use error::{Error, Result};
pub use object::{AttributeRegistry, ContentObject};
pub use observer::{CallEvent, CallObserver, ObserverId};
pub use options::ClientOptions;
pub use outcome::{Classifier, Outcome, SessionExpired};
pub use query::ObjectQuery;
pub use session::{SessionManager, SessionState};
pub use settings::{MemorySettings, SettingsStore, keys};
// Re-exported so callers need not depend on portal-protocol directly.
pub use portal_protocol::{Parameters, ResultEnvelope, SectionResult};
