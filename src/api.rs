// API client module: the REST calls against the Scroll Viewport theme
// endpoints, plus the multipart payload they upload. The orchestrator only
// sees the `ThemeApi` and `FormDataBuilder` traits so tests can swap in
// capturing fakes.

use crate::error::{Result, ThemeError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{multipart, Client, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Where to send requests and how to authenticate them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// REST root, e.g. `https://wiki.example.com/rest/scroll-viewport/1.0`.
    pub base_url: String,
    /// Value of the `Authorization` header.
    pub authorization: String,
}

/// What the lookup endpoint returns for a theme. Ids may come back as
/// numbers or strings depending on the server version, so they are kept as
/// text.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ThemeDescriptor {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Debug)]
struct CreateThemeRequest<'a> {
    name: &'a str,
    scope: &'a str,
}

#[derive(Deserialize, Debug)]
struct UploadedResource {
    path: String,
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// One file of a batch upload, keyed by its remote target path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPart {
    pub target: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Ordered batch of files for a single upload call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadPayload {
    pub parts: Vec<UploadPart>,
}

impl UploadPayload {
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn into_form(self) -> Result<multipart::Form> {
        // Target paths go out as-is; the server expects `a/b.css`, not `a%2Fb.css`.
        let mut form = multipart::Form::new().percent_encode_noop();
        for part in self.parts {
            let file = multipart::Part::bytes(part.bytes)
                .file_name(part.file_name)
                .mime_str("application/octet-stream")?;
            form = form.part(part.target, file);
        }
        Ok(form)
    }
}

/// The four remote operations on a theme.
#[async_trait]
pub trait ThemeApi: Send + Sync {
    /// `None` when no theme with this name exists in the scope.
    async fn lookup_theme(
        &self,
        endpoint: &Endpoint,
        name: &str,
        scope: &str,
    ) -> Result<Option<ThemeDescriptor>>;

    async fn create_theme(&self, endpoint: &Endpoint, name: &str, scope: &str) -> Result<()>;

    /// Removes every resource below `resource_url`, keeping the theme.
    async fn reset_theme(&self, endpoint: &Endpoint, resource_url: &str) -> Result<()>;

    /// Returns the accepted resource paths in the order the server reports them.
    async fn upload_resources(
        &self,
        endpoint: &Endpoint,
        resource_url: &str,
        payload: UploadPayload,
    ) -> Result<Vec<String>>;
}

/// Builds the upload payload from index-aligned source and target lists.
#[async_trait]
pub trait FormDataBuilder: Send + Sync {
    async fn build(&self, sources: &[PathBuf], targets: &[String]) -> Result<UploadPayload>;
}

/// Reads each source file from disk into a part named by its target path.
#[derive(Clone, Debug, Default)]
pub struct MultipartFormBuilder;

#[async_trait]
impl FormDataBuilder for MultipartFormBuilder {
    async fn build(&self, sources: &[PathBuf], targets: &[String]) -> Result<UploadPayload> {
        if sources.len() != targets.len() {
            return Err(ThemeError::InvalidArguments(format!(
                "{} sources but {} targets",
                sources.len(),
                targets.len()
            )));
        }

        let mut parts = Vec::with_capacity(sources.len());
        for (source, target) in sources.iter().zip(targets) {
            let bytes = tokio::fs::read(source).await.map_err(|e| ThemeError::Io {
                path: source.clone(),
                source: e,
            })?;
            let file_name = source
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or(target.as_str())
                .to_string();
            parts.push(UploadPart {
                target: target.clone(),
                file_name,
                bytes,
            });
        }
        Ok(UploadPayload { parts })
    }
}

/// HTTP implementation of [`ThemeApi`] on top of a shared reqwest client.
#[derive(Clone, Debug)]
pub struct HttpThemeApi {
    client: Client,
}

impl HttpThemeApi {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    fn auth_headers(endpoint: &Endpoint) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&endpoint.authorization)
            .map_err(|e| ThemeError::InvalidConfigSchema(format!("invalid credentials: {e}")))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn theme_url(endpoint: &Endpoint) -> String {
        format!("{}/theme", endpoint.base_url)
    }
}

/// Turns a non-success response into a `RemoteError` carrying the body.
async fn ensure_success(action: &str, res: Response) -> Result<Response> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let txt = res.text().await.unwrap_or_default();
    Err(ThemeError::RemoteError(format!("{action} failed: {status} - {txt}")))
}

#[async_trait]
impl ThemeApi for HttpThemeApi {
    async fn lookup_theme(
        &self,
        endpoint: &Endpoint,
        name: &str,
        scope: &str,
    ) -> Result<Option<ThemeDescriptor>> {
        let url = Self::theme_url(endpoint);
        debug!(%url, name, scope, "looking up theme");
        let res = self
            .client
            .get(&url)
            .headers(Self::auth_headers(endpoint)?)
            .query(&[("name", name), ("scope", scope)])
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = ensure_success("theme lookup", res).await?;
        let theme: ThemeDescriptor = res
            .json()
            .await
            .map_err(|e| ThemeError::RemoteError(format!("parsing theme lookup response: {e}")))?;
        Ok(Some(theme))
    }

    async fn create_theme(&self, endpoint: &Endpoint, name: &str, scope: &str) -> Result<()> {
        let url = Self::theme_url(endpoint);
        debug!(%url, name, scope, "creating theme");
        let res = self
            .client
            .post(&url)
            .headers(Self::auth_headers(endpoint)?)
            .json(&CreateThemeRequest { name, scope })
            .send()
            .await?;
        ensure_success("theme creation", res).await?;
        Ok(())
    }

    async fn reset_theme(&self, endpoint: &Endpoint, resource_url: &str) -> Result<()> {
        debug!(url = resource_url, "clearing theme resources");
        let res = self
            .client
            .delete(resource_url)
            .headers(Self::auth_headers(endpoint)?)
            .send()
            .await?;
        ensure_success("theme reset", res).await?;
        Ok(())
    }

    async fn upload_resources(
        &self,
        endpoint: &Endpoint,
        resource_url: &str,
        payload: UploadPayload,
    ) -> Result<Vec<String>> {
        debug!(url = resource_url, files = payload.len(), "uploading resources");
        let res = self
            .client
            .put(resource_url)
            .headers(Self::auth_headers(endpoint)?)
            .multipart(payload.into_form()?)
            .send()
            .await?;
        let res = ensure_success("resource upload", res).await?;
        let uploaded: Vec<UploadedResource> = res
            .json()
            .await
            .map_err(|e| ThemeError::RemoteError(format!("parsing upload response: {e}")))?;
        Ok(uploaded.into_iter().map(|resource| resource.path).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn descriptor_accepts_numeric_and_text_ids() {
        let numeric: ThemeDescriptor =
            serde_json::from_str(r#"{ "id": 42, "name": "brand" }"#).unwrap();
        let text: ThemeDescriptor = serde_json::from_str(r#"{ "id": "abc-1" }"#).unwrap();

        assert_eq!(numeric.id, "42");
        assert_eq!(numeric.name, "brand");
        assert_eq!(text.id, "abc-1");
        assert_eq!(text.name, "");
    }

    #[tokio::test]
    async fn multipart_builder_keeps_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.css");
        let b = dir.path().join("b.css");
        std::fs::write(&a, "body{}").unwrap();
        std::fs::write(&b, "p{}").unwrap();

        let payload = MultipartFormBuilder
            .build(&[a, b], &["dist/a.css".into(), "dist/b.css".into()])
            .await
            .unwrap();

        assert_eq!(
            payload.parts,
            vec![
                UploadPart {
                    target: "dist/a.css".into(),
                    file_name: "a.css".into(),
                    bytes: b"body{}".to_vec(),
                },
                UploadPart {
                    target: "dist/b.css".into(),
                    file_name: "b.css".into(),
                    bytes: b"p{}".to_vec(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn multipart_builder_rejects_misaligned_lists() {
        let err = MultipartFormBuilder
            .build(&[PathBuf::from("a.css")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ThemeError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn multipart_builder_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.css");

        let err = MultipartFormBuilder
            .build(&[missing.clone()], &["gone.css".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, ThemeError::Io { ref path, .. } if *path == missing));
    }
}
