pub mod app_state;
pub mod credential_store;

pub use app_state::AppState;
pub use credential_store::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, open_store,
};
