use secrecy::{ExposeSecret, SecretString};

/// Username/password fields of the login dialog.
///
/// The password only ever lives here, in memory, for the length of a login
/// attempt.
pub struct LoginForm {
    username: String,
    password: SecretString,
}

impl LoginForm {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: empty_secret(),
        }
    }

    /// Pre-filled with the name of the logged-in OS user
    pub fn for_current_user() -> Self {
        Self::new(default_username())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = SecretString::from(password.into());
    }

    pub fn password_is_empty(&self) -> bool {
        self.password.expose_secret().is_empty()
    }

    /// The submit action stays disabled until both fields hold something.
    pub fn can_submit(&self) -> bool {
        !self.username.is_empty() && !self.password_is_empty()
    }

    pub fn clear_password(&mut self) {
        self.password = empty_secret();
    }

    pub fn clear(&mut self) {
        self.username.clear();
        self.clear_password();
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}
