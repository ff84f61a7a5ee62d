use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{CONFIG_PATH_ENV, find_config_file, read_config, read_config_from};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    ai: Ai,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default = "default_token_ttl_hours")]
    token_ttl_hours: i64,
    #[serde(default)]
    seed_defaults: bool,
}

/// Gemini settings. An empty key disables AI generation.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ai {
    gemini_api_key: String,
    gemini_model: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout_secs: u64,
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Default for Ai {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: String::from("gemini-1.5-flash"),
            temperature: 0.7,
            max_output_tokens: 2048,
            timeout_secs: 30,
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    let config = Self::from_slice(&bytes)?;
                    Ok(config.with_overrides(|key| std::env::var(key).ok()))
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        Ok(config)
    }

    /// Secrets may come from the environment instead of the file:
    /// `DATABASE_URL`, `JWT_SECRET` and `GEMINI_API_KEY` win when set and non-empty.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(uri) = lookup("DATABASE_URL") {
            self.app.database_uri = uri;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.app.jwt = secret;
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.ai.gemini_api_key = key;
        }
        self
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn ai(&self) -> &Ai {
        &self.ai
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    #[inline]
    pub fn seed_defaults(&self) -> bool {
        self.seed_defaults
    }
}

impl Ai {
    pub fn gemini_api_key(&self) -> Option<&str> {
        let key = self.gemini_api_key.trim();
        if key.is_empty() { None } else { Some(key) }
    }

    #[inline]
    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    #[inline]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    #[inline]
    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    #[inline]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
        assert!(config.app().seed_defaults());
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "k"
            database_uri = "postgres://localhost/x"
        "#;
        let config = Config::from_slice(raw).unwrap();

        assert!(!config.app().docs());
        assert!(!config.app().seed_defaults());
        assert_eq!(config.app().token_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.ai().gemini_api_key(), None);
        assert_eq!(config.ai().gemini_model(), "gemini-1.5-flash");
        assert_eq!(config.ai().max_output_tokens(), 2048);
    }

    #[test]
    fn blank_gemini_key_counts_as_missing() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "k"
            database_uri = "postgres://localhost/x"

            [ai]
            gemini_api_key = "   "
            gemini_model = "gemini-pro"
        "#;
        let config = Config::from_slice(raw).unwrap();

        assert_eq!(config.ai().gemini_api_key(), None);
        assert_eq!(config.ai().gemini_model(), "gemini-pro");
        assert_eq!(config.ai().timeout(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides_secrets() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "from-file"
            database_uri = "postgres://localhost/file"
        "#;
        let config = Config::from_slice(raw).unwrap().with_overrides(|key| match key {
            "JWT_SECRET" => Some("from-env".to_string()),
            "DATABASE_URL" => Some(" ".to_string()),
            "GEMINI_API_KEY" => Some("g-key".to_string()),
            _ => None,
        });

        assert_eq!(config.app().jwt(), "from-env");
        assert_eq!(config.app().database_uri(), "postgres://localhost/file");
        assert_eq!(config.ai().gemini_api_key(), Some("g-key"));
    }

    #[test]
    fn missing_app_section_is_an_error() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"
        "#;
        assert!(matches!(Config::from_slice(raw), Err(ConfigError::TomlDeError(_))));
    }
}
