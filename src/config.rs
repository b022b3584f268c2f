use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Environment variables override file values, e.g. `APOD__NASA__API__KEY`.
const ENV_PREFIX: &str = "APOD";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub nasa: NasaConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NasaConfig {
    pub api: NasaApiConfig,
}

/// Maps to the `nasa.api.url` / `nasa.api.key` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NasaApiConfig {
    #[serde(default = "default_nasa_url")]
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_translation_url")]
    pub api_url: String,
    #[serde(default = "default_langpair")]
    pub langpair: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_nasa_url() -> String {
    "https://api.nasa.gov/planetary/apod".to_string()
}

fn default_translation_url() -> String {
    "https://api.mymemory.translated.net/get".to_string()
}

fn default_langpair() -> String {
    "en|pt-BR".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: default_translation_url(),
            langpair: default_langpair(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Config {
    /// Load configuration from an optional YAML/JSON file layered under
    /// `APOD__*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            let content = read_config_text(path)?;
            builder = builder.add_source(::config::File::from_str(&content, file_format(path)));
        }

        let config: Config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let key = self.nasa.api.key.trim();
        if key.is_empty() {
            anyhow::bail!("nasa.api.key must not be empty");
        }
        if key.starts_with("${") {
            anyhow::bail!("nasa.api.key references an unset environment variable: {}", key);
        }
        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

fn file_format(path: &str) -> ::config::FileFormat {
    let path_lower = path.to_lowercase();
    if path_lower.ends_with(".json") {
        ::config::FileFormat::Json
    } else {
        ::config::FileFormat::Yaml
    }
}

/// Read a config file, tolerating a UTF-8 BOM, and expand `${VAR}`
/// placeholders from the environment.
pub fn read_config_text(config_path: &str) -> Result<String> {
    if !Path::new(config_path).exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let bytes = fs::read(config_path)?;
    let (content, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        warn!("Configuration file {} contains invalid UTF-8, replaced lossily", config_path);
    }

    substitute_env_vars(&content)
}

/// Unknown variables are left untouched so validation can name them.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let substituted = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(substituted.into_owned())
}
