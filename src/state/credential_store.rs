use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::{CredentialBackend, CredentialsConfig};
use crate::models::Credentials;
use crate::utils::{AppError, AppResult};

const KEYRING_SERVICE: &str = "vidseek";
const SESSION_KEY: &str = "session_id";
const EVALUATION_KEY: &str = "evaluation_id";

/// Persists the evaluation credential pair between runs.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> AppResult<Option<Credentials>>;
    fn save(&self, credentials: &Credentials) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

pub fn open_store(config: &CredentialsConfig) -> AppResult<Box<dyn CredentialStore>> {
    match config.backend {
        CredentialBackend::File => Ok(Box::new(FileCredentialStore::default_location()?)),
        CredentialBackend::Keyring => Ok(Box::new(KeyringCredentialStore)),
    }
}

/// JSON file under the user data directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> AppResult<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            AppError::Credentials("Failed to get data directory".to_string())
        })?;
        Ok(Self::new(data_dir.join("vidseek").join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> AppResult<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let credentials: Credentials = serde_json::from_str(&contents)?;
        // A half-written pair is as good as none
        Ok(credentials.is_complete().then_some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(credentials)?)?;
        debug!("Credentials saved to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("Removed stored credentials");
        }
        Ok(())
    }
}

/// System keyring, one entry per field.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    fn entry(key: &str) -> AppResult<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, key).map_err(|e| {
            error!("Failed to create keyring entry: {}", e);
            AppError::Credentials(e.to_string())
        })
    }

    fn read(key: &str) -> AppResult<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AppError::Credentials(e.to_string())),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> AppResult<Option<Credentials>> {
        let session = Self::read(SESSION_KEY)?;
        let evaluation = Self::read(EVALUATION_KEY)?;
        Ok(match (session, evaluation) {
            (Some(s), Some(e)) => Some(Credentials::new(s, e)).filter(|c| c.is_complete()),
            _ => None,
        })
    }

    fn save(&self, credentials: &Credentials) -> AppResult<()> {
        Self::entry(SESSION_KEY)?
            .set_password(credentials.session_id.as_str())
            .map_err(|e| AppError::Credentials(e.to_string()))?;
        Self::entry(EVALUATION_KEY)?
            .set_password(credentials.evaluation_id.as_str())
            .map_err(|e| AppError::Credentials(e.to_string()))?;
        debug!("Credentials stored in keyring");
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        for key in [SESSION_KEY, EVALUATION_KEY] {
            if let Ok(entry) = Self::entry(key) {
                let _ = entry.delete_credential(); // missing entries are fine
            }
        }
        Ok(())
    }
}
