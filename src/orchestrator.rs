//! Theme lifecycle: existence check, creation, reset and batch upload.
//!
//! An orchestrator is built synchronously from a validated configuration
//! and performs no network I/O until one of its async operations is awaited.
//! It moves through three phases:
//!
//! - unchecked: nothing known about the remote theme,
//! - checked: the existence answer is cached for the rest of its lifetime,
//! - bound: `create()` ran and the remote theme id is known.
//!
//! The existence cache is never invalidated, not even by `create()` or
//! `reset()`. The remote side is assumed not to change underneath a single
//! instance, so a long-lived instance may hold a stale answer.

use crate::api::{Endpoint, FormDataBuilder, ThemeApi};
use crate::config::{ConfigProvider, ConfigSource, EnvironmentConfig};
use crate::error::{Result, ThemeError};
use crate::files::GlobResolver;
use crate::paths;
use crate::schema::Schema;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;

/// Typed form of the upload argument object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSpec {
    pub target_path: String,
    pub source_path: String,
    pub glob_string: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExistsCache {
    Unknown,
    Known(bool),
}

pub struct ThemeOrchestrator<A, G, F> {
    theme_name: String,
    env_name: String,
    scope: String,
    endpoint: Endpoint,
    theme_id: Option<String>,
    exists_cache: ExistsCache,
    api: A,
    files: G,
    forms: F,
}

impl<A, G, F> ThemeOrchestrator<A, G, F>
where
    A: ThemeApi,
    G: GlobResolver,
    F: FormDataBuilder,
{
    /// Resolves and validates the configuration for `source`.
    pub fn new(
        theme_name: impl Into<String>,
        provider: &dyn ConfigProvider,
        source: &ConfigSource,
        api: A,
        files: G,
        forms: F,
    ) -> Result<Self> {
        let candidate = provider.resolve(source)?;
        let config = EnvironmentConfig::from_candidate(candidate)?;
        Ok(Self::with_config(theme_name, &config, api, files, forms))
    }

    pub fn with_config(
        theme_name: impl Into<String>,
        config: &EnvironmentConfig,
        api: A,
        files: G,
        forms: F,
    ) -> Self {
        let theme_name = theme_name.into();
        info!(
            theme = %theme_name,
            env = config.env_name(),
            base_url = config.confluence_base_url(),
            user = config.username(),
            "theme orchestrator configured"
        );
        Self {
            theme_name,
            env_name: config.env_name().to_string(),
            scope: config.scope().to_string(),
            endpoint: Endpoint {
                base_url: config.rest_url(),
                authorization: config.authorization(),
            },
            theme_id: None,
            exists_cache: ExistsCache::Unknown,
            api,
            files,
            forms,
        }
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Remote id, known once `create()` has completed.
    pub fn theme_id(&self) -> Option<&str> {
        self.theme_id.as_deref()
    }

    /// URL of the theme's resource collection. Fails without touching the
    /// network while the theme id is unknown.
    pub fn resource_url(&self) -> Result<String> {
        match &self.theme_id {
            Some(id) => Ok(format!("{}/theme/{}/resource", self.endpoint.base_url, id)),
            None => Err(ThemeError::ThemeNotInitialized(self.theme_name.clone())),
        }
    }

    /// Whether the theme exists remotely. Only the first call asks the
    /// server; later calls answer from the cache.
    pub async fn exists(&mut self) -> Result<bool> {
        let exists = match self.exists_cache {
            ExistsCache::Known(exists) => exists,
            ExistsCache::Unknown => {
                let found = self
                    .api
                    .lookup_theme(&self.endpoint, &self.theme_name, &self.scope)
                    .await?
                    .is_some();
                self.exists_cache = ExistsCache::Known(found);
                found
            }
        };
        info!(theme = %self.theme_name, scope = %self.scope, exists, "theme existence");
        Ok(exists)
    }

    /// Creates the theme unless it already exists, then binds its id. An
    /// existing theme is not an error.
    pub async fn create(&mut self) -> Result<()> {
        if self.exists().await? {
            info!(theme = %self.theme_name, "theme already exists, skipping creation");
        } else {
            info!(theme = %self.theme_name, scope = %self.scope, "creating theme");
            self.api
                .create_theme(&self.endpoint, &self.theme_name, &self.scope)
                .await?;
        }

        let descriptor = self
            .api
            .lookup_theme(&self.endpoint, &self.theme_name, &self.scope)
            .await?
            .ok_or_else(|| ThemeError::ThemeNotFound(self.theme_name.clone()))?;
        info!(theme = %self.theme_name, id = %descriptor.id, "theme bound");
        self.theme_id = Some(descriptor.id);
        Ok(())
    }

    /// Removes all resources of the theme. Needs an existing theme and a
    /// bound id.
    pub async fn reset(&mut self) -> Result<()> {
        if !self.exists().await? {
            return Err(ThemeError::ThemeNotFound(self.theme_name.clone()));
        }
        let url = self.resource_url()?;
        info!(theme = %self.theme_name, "resetting theme resources");
        self.api.reset_theme(&self.endpoint, &url).await?;
        info!(theme = %self.theme_name, "theme reset");
        Ok(())
    }

    /// Uploads the files matched by a typed upload spec.
    pub async fn upload_spec(&mut self, spec: &UploadSpec) -> Result<Vec<String>> {
        let args = match serde_json::to_value(spec) {
            Ok(Value::Object(args)) => args,
            Ok(_) => return Err(ThemeError::InvalidArguments("upload spec is not an object".into())),
            Err(e) => return Err(ThemeError::InvalidArguments(e.to_string())),
        };
        self.upload(&args).await
    }

    /// Uploads every file matched by `args.globString`, placed under
    /// `args.targetPath` relative to `args.sourcePath`. Returns the paths the
    /// server accepted; an empty match uploads nothing and succeeds.
    pub async fn upload(&mut self, args: &Map<String, Value>) -> Result<Vec<String>> {
        if !self.exists().await? {
            return Err(ThemeError::ThemeNotFound(self.theme_name.clone()));
        }
        if let Some(problem) = Schema::upload().mismatch(args) {
            return Err(ThemeError::InvalidArguments(problem));
        }
        let field = |name: &str| args.get(name).and_then(Value::as_str).unwrap_or_default();
        let (target_root, source_root, pattern) =
            (field("targetPath"), field("sourcePath"), field("globString"));

        let sources = self.files.resolve(pattern)?;
        if sources.is_empty() {
            info!(pattern, "no files matched, nothing to upload");
            return Ok(Vec::new());
        }

        let cwd = std::env::current_dir().map_err(|e| ThemeError::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        let targets = paths::remap(&cwd, source_root, target_root, &sources);
        for (source, target) in sources.iter().zip(&targets) {
            info!(source = %source.display(), target = %target, "upload mapping");
        }

        let url = self.resource_url()?;
        let payload = self.forms.build(&sources, &targets).await?;
        let uploaded = self
            .api
            .upload_resources(&self.endpoint, &url, payload)
            .await?;
        for path in &uploaded {
            info!(theme = %self.theme_name, path = %path, "uploaded");
        }
        Ok(uploaded)
    }
}
