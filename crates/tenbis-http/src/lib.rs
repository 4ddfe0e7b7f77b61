//! tenbis-http - reqwest transport and Microsoft Teams notifiers.
//!
//! [`ReqwestTransport`] performs exactly one HTTP exchange per call and
//! leaves retries to `tenbis_core::ResilientClient`. The notifiers build on
//! the same [`Transport`](tenbis_core::Transport) seam so they can be pointed
//! at a mock server in tests.

mod notify;
mod transport;

pub use notify::graph::{GraphChatNotifier, GraphConfig};
pub use notify::webhook::TeamsWebhookNotifier;
pub use transport::ReqwestTransport;
