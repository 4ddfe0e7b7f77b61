//! tenbis-core - Core types, retry client and scheduled actions.
//!
//! A scheduled action loads the current [`CredentialSet`] from a
//! [`CredentialStore`], issues one request through a [`ResilientClient`],
//! extracts rotated tokens from the response and writes them back.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tenbis_core::{
//!     ActionContext, ActionKind, NullNotifier, ResilientClient, Schedule, ScheduledAction,
//!     TenbisApi, Transport, CredentialStore,
//! };
//!
//! # async fn example(
//! #     store: Arc<dyn CredentialStore>,
//! #     transport: Arc<dyn Transport>,
//! # ) {
//! let ctx = ActionContext {
//!     store,
//!     client: ResilientClient::from_arc(transport),
//!     api: TenbisApi::production(),
//!     notifier: Arc::new(NullNotifier),
//!     schedule: Schedule::always(),
//! };
//!
//! let report = ScheduledAction::new(ActionKind::TokenRefresh, ctx)
//!     .run(chrono::Utc::now())
//!     .await;
//! std::process::exit(report.exit_code().into());
//! # }
//! ```

pub mod action;
pub mod api;
pub mod error;
pub mod retry;
pub mod schedule;
pub mod traits;
pub mod types;

pub use action::{ActionContext, ActionKind, ActionReport, ScheduledAction};
pub use api::{DEFAULT_API_BASE, TenbisApi};
pub use error::{Error, TransportError};
pub use retry::{DEFAULT_MAX_ATTEMPTS, ResilientClient};
pub use schedule::{DEFAULT_TIMEZONE, Schedule, WEEKEND};
pub use traits::{CredentialStore, Notification, NotificationStatus, Notifier, NullNotifier, Transport};
pub use types::{
    AttemptOutcome, Body, CredentialField, CredentialSet, HttpResponse, Method, RequestDescriptor,
    Secret, TokenSource, TokenUpdate,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
