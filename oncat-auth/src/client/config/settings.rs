use config::{Config, ConfigError, Environment, File, FileFormat};
use std::collections::HashMap;

const LOGIN_SECTION: &str = "login.oncat";
const DEFAULT_ONCAT_URL: &str = oncat_api::DEFAULT_BASE_URL;

/// A single configuration value, with the INI-style literals
/// `True`/`False` read as booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
}

impl ConfigValue {
    fn parse(raw: String) -> Option<Self> {
        match raw.as_str() {
            "None" => None,
            "True" => Some(Self::Bool(true)),
            "False" => Some(Self::Bool(false)),
            _ => Some(Self::Text(raw)),
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bool(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    config: Config,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("ONCAT_LOGIN_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_path(&config_path)
    }

    pub fn from_path(config_path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("ONCAT_LOGIN").separator("__"))
            .build()?;

        Ok(Self { config })
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Ok(Self { config })
    }

    /// Look up `name` in `section`; a missing section or key is `None`.
    pub fn get_data(&self, section: &str, name: &str) -> Option<ConfigValue> {
        let raw = self
            .config
            .get_string(&format!("{}.{}", section, name))
            .ok()?;
        ConfigValue::parse(raw)
    }

    pub fn get_section(&self, section: &str) -> Option<HashMap<String, String>> {
        let table = self.config.get_table(section).ok()?;
        Some(
            table
                .into_iter()
                .filter_map(|(key, value)| value.into_string().ok().map(|value| (key, value)))
                .collect(),
        )
    }

    pub fn oncat_url(&self) -> String {
        self.get_data(LOGIN_SECTION, "oncat_url")
            .and_then(ConfigValue::into_string)
            .unwrap_or_else(|| DEFAULT_ONCAT_URL.to_string())
    }

    /// Client identifier registered for `identity_key` (`{key}_id`).
    pub fn client_id(&self, identity_key: &str) -> Option<String> {
        self.get_data(LOGIN_SECTION, &format!("{}_id", identity_key))
            .and_then(ConfigValue::into_string)
            .filter(|id| !id.is_empty())
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = self.oncat_url();
        if !url.starts_with("http") {
            return Err("login.oncat.oncat_url must be a valid HTTP(S) URL".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[login.oncat]
oncat_url = "https://oncat.example.org"
shiver_id = "0123-abcd"
test_id = "test-client"
verbose = "True"
quiet = "False"
lowercase = "true"
missing_id = "None"
"#;

    fn settings() -> Settings {
        Settings::from_toml_str(SAMPLE).unwrap()
    }

    #[test]
    fn reads_values_by_section_and_key() {
        let settings = settings();
        assert_eq!(
            settings.get_data("login.oncat", "oncat_url"),
            Some(ConfigValue::Text("https://oncat.example.org".to_string()))
        );
        assert_eq!(settings.client_id("shiver").as_deref(), Some("0123-abcd"));
    }

    #[test]
    fn missing_section_or_key_is_none() {
        let settings = settings();
        assert_eq!(settings.get_data("nope", "oncat_url"), None);
        assert_eq!(settings.get_data("login.oncat", "nope"), None);
        assert_eq!(settings.client_id("unknown"), None);
        assert!(settings.get_section("nope").is_none());
    }

    #[test]
    fn literal_booleans_and_none() {
        let settings = settings();
        assert_eq!(
            settings.get_data("login.oncat", "verbose"),
            Some(ConfigValue::Bool(true))
        );
        assert_eq!(
            settings.get_data("login.oncat", "quiet"),
            Some(ConfigValue::Bool(false))
        );
        assert_eq!(settings.get_data("login.oncat", "missing_id"), None);
    }

    #[test]
    fn only_capitalised_literals_are_booleans() {
        assert_eq!(
            settings().get_data("login.oncat", "lowercase"),
            Some(ConfigValue::Text("true".to_string()))
        );
    }

    #[test]
    fn whole_section_lookup() {
        let section = settings().get_section("login.oncat").unwrap();
        assert_eq!(section.get("test_id").map(String::as_str), Some("test-client"));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[login.oncat]\noncat_url = \"https://file.example.org\"\nenvcheck_id = \"from-file\"\n",
        )
        .unwrap();
        // key unique to this test, nothing else reads it
        std::env::set_var("ONCAT_LOGIN__LOGIN__ONCAT__ENVCHECK_ID", "from-env");

        let settings = Settings::from_path(path.to_str().unwrap()).unwrap();
        std::env::remove_var("ONCAT_LOGIN__LOGIN__ONCAT__ENVCHECK_ID");

        assert_eq!(settings.oncat_url(), "https://file.example.org");
        assert_eq!(settings.client_id("envcheck").as_deref(), Some("from-env"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let settings = Settings::from_path(path.to_str().unwrap()).unwrap();

        assert_eq!(settings.oncat_url(), DEFAULT_ONCAT_URL);
    }

    #[test]
    fn url_defaults_when_unset() {
        let settings = Settings::from_toml_str("[login.oncat]\nshiver_id = \"x\"").unwrap();
        assert_eq!(settings.oncat_url(), DEFAULT_ONCAT_URL);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_url() {
        let settings = Settings::from_toml_str("[login.oncat]\noncat_url = \"ftp://x\"").unwrap();
        assert!(settings.validate().is_err());
    }
}
