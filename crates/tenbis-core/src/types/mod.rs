//! Core data types.

mod credentials;
mod http;
mod secret;
mod token_update;

pub use credentials::{CredentialField, CredentialSet};
pub use http::{AttemptOutcome, Body, DEFAULT_TIMEOUT, HttpResponse, Method, RequestDescriptor};
pub use secret::Secret;
pub use token_update::{TokenSource, TokenUpdate};
