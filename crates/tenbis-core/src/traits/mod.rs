//! Seams between the orchestration core and its collaborators.

mod notifier;
mod store;
mod transport;

pub use notifier::{Notification, NotificationStatus, Notifier, NullNotifier};
pub use store::CredentialStore;
pub use transport::Transport;
