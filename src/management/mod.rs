mod auth;

pub use auth::CredentialError;
pub use auth::CredentialStore;
