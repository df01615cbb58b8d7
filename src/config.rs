//! Environment configuration: where it comes from and what it looks like
//! once validated.

use crate::error::{Result, ThemeError};
use crate::schema::Schema;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Path prefix of the Scroll Viewport REST API below the Confluence base URL.
pub const REST_BASE_PATH: &str = "/rest/scroll-viewport/1.0";

/// File name of the config store in the user's home directory.
pub const STORE_FILE_NAME: &str = ".vpconfig.json";

/// Environment variable backing each schema field, in schema order.
pub const ENV_VARS: [(&str, &str); 5] = [
    ("envName", "VPRT_ENV"),
    ("confluenceBaseUrl", "VPRT_CONFLUENCEBASEURL"),
    ("username", "VPRT_USERNAME"),
    ("password", "VPRT_PASSWORD"),
    ("scope", "VPRT_SCOPE"),
];

/// Validated, immutable environment settings. The only way to get one is
/// [`EnvironmentConfig::from_candidate`], so holding one means the schema
/// check passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentConfig {
    env_name: String,
    confluence_base_url: String,
    username: String,
    password: String,
    scope: String,
}

/// Wire shape of a config object; only read after the schema check.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvironment {
    env_name: String,
    confluence_base_url: String,
    username: String,
    password: String,
    scope: String,
}

impl EnvironmentConfig {
    pub fn from_candidate(candidate: Map<String, Value>) -> Result<Self> {
        if let Some(problem) = Schema::environment().mismatch(&candidate) {
            return Err(ThemeError::InvalidConfigSchema(problem));
        }
        let raw: RawEnvironment = serde_json::from_value(Value::Object(candidate))
            .map_err(|e| ThemeError::InvalidConfigSchema(e.to_string()))?;
        Ok(Self {
            env_name: raw.env_name,
            confluence_base_url: raw.confluence_base_url,
            username: raw.username,
            password: raw.password,
            scope: raw.scope,
        })
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn confluence_base_url(&self) -> &str {
        &self.confluence_base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Root of the REST API all theme calls go through.
    pub fn rest_url(&self) -> String {
        format!("{}{}", self.confluence_base_url, REST_BASE_PATH)
    }

    /// Basic auth header value derived from the credentials.
    pub fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

/// Where the configuration is read from. Chosen once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// A named entry of the file-backed store.
    Named(String),
    /// The complete set of `VPRT_*` environment variables.
    Environment,
}

impl ConfigSource {
    pub fn detect(env_name: Option<&str>) -> Self {
        match env_name {
            Some(name) => ConfigSource::Named(name.to_string()),
            None => ConfigSource::Environment,
        }
    }
}

/// Produces the raw, not yet validated configuration object.
pub trait ConfigProvider {
    fn resolve(&self, source: &ConfigSource) -> Result<Map<String, Value>>;
}

/// Reads named entries from a JSON store file and falls back to process
/// environment variables.
pub struct FileConfigProvider {
    store_path: PathBuf,
    lookup_var: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl FileConfigProvider {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            lookup_var: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Store at `~/.vpconfig.json`, or the working directory when no home
    /// directory is known.
    pub fn from_home() -> Self {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(STORE_FILE_NAME))
    }

    /// Replaces the environment variable lookup.
    pub fn with_var_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.lookup_var = Box::new(lookup);
        self
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn from_store(&self, env_name: &str) -> Result<Map<String, Value>> {
        let not_found = |reason: String| ThemeError::ConfigNotFound {
            env_name: env_name.to_string(),
            path: self.store_path.clone(),
            reason,
        };

        let data = std::fs::read_to_string(&self.store_path).map_err(|e| not_found(e.to_string()))?;
        let mut store: Map<String, Value> =
            serde_json::from_str(&data).map_err(|e| not_found(e.to_string()))?;

        match store.remove(env_name) {
            Some(Value::Object(entry)) => Ok(entry),
            Some(_) => Err(not_found("entry is not an object".to_string())),
            None => Err(not_found("no such entry".to_string())),
        }
    }

    fn from_environment(&self) -> Result<Map<String, Value>> {
        let mut found = Map::new();
        let mut missing = Vec::new();
        for (field, var) in ENV_VARS {
            match (self.lookup_var)(var).filter(|value| !value.is_empty()) {
                Some(value) => {
                    found.insert(field.to_string(), Value::String(value));
                }
                None => missing.push(var.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(found)
        } else {
            Err(ThemeError::IncompleteEnvironment { missing })
        }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn resolve(&self, source: &ConfigSource) -> Result<Map<String, Value>> {
        match source {
            ConfigSource::Named(env_name) => self.from_store(env_name),
            ConfigSource::Environment => self.from_environment(),
        }
    }
}
