mod hub;
mod client;
mod types;

// Re-export from types
pub use types::{HubError, RepoInfo, Sibling};
// Re-export from hub
pub use hub::{ModelHub, checked_local_path};
// Re-export from client
pub use client::HubClient;
