use crate::client::agent::{TokenGetter, TokenSetter};
use crate::common::Token;
use crate::error::AuthError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const APP_DIR: &str = ".oncat-login";

/// Per-identity token file at `<home>/.oncat-login/{identity_key}_token.json`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    identity_key: String,
    token_path: PathBuf,
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Keys end up in a file name, so only `[a-z0-9_-]` is accepted. Lowercase
/// only: on case-insensitive filesystems `Key` and `key` would share a file.
pub fn validate_identity_key(identity_key: &str) -> Result<(), AuthError> {
    let valid = !identity_key.is_empty()
        && identity_key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidIdentityKey(identity_key.to_string()))
    }
}

impl TokenStore {
    pub fn new(identity_key: &str) -> Result<Self, AuthError> {
        Self::with_base_dir(Self::default_base_dir()?, identity_key)
    }

    pub fn with_base_dir(
        base_dir: impl Into<PathBuf>,
        identity_key: &str,
    ) -> Result<Self, AuthError> {
        validate_identity_key(identity_key)?;
        let token_path = base_dir
            .into()
            .join(format!("{}_token.json", identity_key));

        Ok(Self {
            identity_key: identity_key.to_string(),
            token_path,
        })
    }

    pub fn default_base_dir() -> Result<PathBuf, AuthError> {
        let home = dirs::home_dir().ok_or_else(|| {
            AuthError::Configuration("Could not find home directory".to_string())
        })?;
        Ok(home.join(APP_DIR))
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Missing, unreadable and malformed files all mean "no token".
    pub fn read_token(&self) -> Option<Token> {
        let json = match fs::read_to_string(&self.token_path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.token_path.display(), "Failed to read token: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(
                    path = %self.token_path.display(),
                    "Ignoring malformed token file: {}",
                    e
                );
                None
            }
        }
    }

    pub fn write_token(&self, token: &Token) -> Result<(), AuthError> {
        if let Some(parent) = self.token_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AuthError::TokenStorage(format!("Failed to create token directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string(token)?;
        atomic_write(&self.token_path, json.as_bytes())
            .map_err(|e| AuthError::TokenStorage(format!("Failed to save token: {}", e)))?;

        tracing::debug!(identity_key = %self.identity_key, "Token saved");
        Ok(())
    }

    pub fn token_getter(&self) -> TokenGetter {
        let store = self.clone();
        Box::new(move || store.read_token())
    }

    pub fn token_setter(&self) -> TokenSetter {
        let store = self.clone();
        Box::new(move |token| store.write_token(token))
    }
}

/// Write to a fresh temp file next to `path`, then rename it over `path`.
///
/// Every writer gets its own temp file (`create_new`), so readers only ever
/// see a complete token from one writer. The temp file is removed on failure.
fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_name = format!(
        ".{}.tmp-{}-{}-{}",
        file_name,
        std::process::id(),
        nonce,
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let write_result = (|| -> std::io::Result<()> {
        let mut file = options.open(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    // the umask may have narrowed the mode further, never widened it
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
