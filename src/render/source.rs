use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::foundation::error::{CoverError, CoverResult};

/// Sandboxed base directory for public paths (template layers, request overlays, sources).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    /// Wrap a base directory. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The base directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a public path such as `/VHS/templates/x.png` under the root.
    ///
    /// Resolution is purely lexical and happens before any I/O. `..` segments may walk back up
    /// inside the root; walking above it is a [`CoverError::Security`].
    pub fn resolve(&self, public_path: &str) -> CoverResult<PathBuf> {
        let rel = normalize_public_path(public_path)?;
        Ok(self.root.join(rel))
    }
}

/// Normalize a public path into a root-relative `/`-joined path.
pub fn normalize_public_path(public_path: &str) -> CoverResult<String> {
    let s = public_path.trim().replace('\\', "/");
    if s.is_empty() {
        return Err(CoverError::validation(
            "publicPath",
            "public path must be non-empty",
        ));
    }
    if s.contains('\0') {
        return Err(CoverError::security(format!(
            "public path '{public_path}' contains a NUL byte"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if out.pop().is_none() {
                    return Err(CoverError::security(format!(
                        "public path '{public_path}' escapes the asset root"
                    )));
                }
            }
            _ => {
                // Drive prefixes would make `join` discard the root.
                if part.contains(':') {
                    return Err(CoverError::security(format!(
                        "public path '{public_path}' is not root-relative"
                    )));
                }
                out.push(part);
            }
        }
    }

    if out.is_empty() {
        return Err(CoverError::validation(
            "publicPath",
            "public path must name a file",
        ));
    }
    Ok(out.join("/"))
}

/// Where the poster bytes come from. Exactly one variant per request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderSource {
    /// Fetched over HTTP(S).
    RemoteUrl(String),
    /// Resolved under the [`AssetRoot`].
    PublicPath(String),
    /// Pre-resolved file on local disk.
    LocalFile(PathBuf),
}

impl RenderSource {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RemoteUrl(_) => "remote",
            Self::PublicPath(_) => "public",
            Self::LocalFile(_) => "local",
        }
    }

    /// Checks that need no I/O: URL syntax and scheme, sandbox containment, non-empty path.
    pub fn validate(&self, assets: &AssetRoot) -> CoverResult<()> {
        match self {
            Self::RemoteUrl(raw) => parse_remote_url(raw).map(|_| ()),
            Self::PublicPath(p) => assets.resolve(p).map(|_| ()),
            Self::LocalFile(p) => {
                if p.as_os_str().is_empty() {
                    Err(CoverError::validation(
                        "source.localFile",
                        "path must be non-empty",
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Shared HTTP client with a whole-request timeout.
pub fn build_http_client(timeout: Duration) -> CoverResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("vhs-cover/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build http client")
        .map_err(CoverError::from)
}

/// Load the raw (still encoded) bytes of `source`.
#[tracing::instrument(skip_all, fields(kind = source.kind()))]
pub async fn load_source_bytes(
    source: &RenderSource,
    assets: &AssetRoot,
    client: &reqwest::Client,
) -> CoverResult<Vec<u8>> {
    match source {
        RenderSource::RemoteUrl(raw) => fetch_remote(client, raw).await,
        RenderSource::PublicPath(p) => {
            let path = assets.resolve(p)?;
            read_file(&path).await
        }
        RenderSource::LocalFile(path) => read_file(path).await,
    }
}

/// Fetch an image over HTTP, requiring a success status and an `image/*` content type.
pub async fn fetch_remote(client: &reqwest::Client, raw: &str) -> CoverResult<Vec<u8>> {
    let url = parse_remote_url(raw)?;
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| CoverError::fetch(format!("GET {url}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(CoverError::fetch(format!("GET {url}: status {status}")));
    }
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    check_content_type(content_type.as_deref())
        .map_err(|e| CoverError::fetch(format!("GET {url}: {e}")))?;

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| CoverError::fetch(format!("GET {url}: read body: {e}")))?;
    tracing::debug!(%url, len = bytes.len(), "fetched remote source");
    Ok(bytes.to_vec())
}

/// Accept only `image/*` media types (parameters and case ignored).
pub fn check_content_type(content_type: Option<&str>) -> Result<(), String> {
    let Some(ct) = content_type else {
        return Err("missing content-type".to_owned());
    };
    let essence = ct.split(';').next().unwrap_or_default().trim();
    let is_image = essence
        .get(..6)
        .is_some_and(|p| p.eq_ignore_ascii_case("image/"))
        && essence.len() > 6;
    if is_image {
        Ok(())
    } else {
        Err(format!("content-type '{ct}' is not an image"))
    }
}

fn parse_remote_url(raw: &str) -> CoverResult<url::Url> {
    let url = url::Url::parse(raw.trim())
        .map_err(|e| CoverError::validation("source.remoteUrl", format!("invalid url: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CoverError::validation(
            "source.remoteUrl",
            format!("unsupported scheme '{other}'"),
        )),
    }
}

async fn read_file(path: &Path) -> CoverResult<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CoverError::not_found(format!(
            "source file '{}'",
            path.display()
        ))),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("read source file '{}'", path.display()))
            .into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/source.rs"]
mod tests;
