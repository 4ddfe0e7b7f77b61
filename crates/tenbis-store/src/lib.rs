//! tenbis-store - Credential stores backed by a JSON file or the environment.

mod actions;
mod env;
mod file;

pub use actions::ActionsOutput;
pub use env::EnvCredentialStore;
pub use file::FileCredentialStore;
