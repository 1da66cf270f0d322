//! Downloadable artifacts with a local cache.

use std::path::{Path, PathBuf};

use crate::http::HttpClient;
use crate::{PackagingError, Result};

/// A single downloadable file, identified by package name, file name and
/// source URL, cached under `<cache_dir>/<package>/<file>`.
///
/// Immutable once downloaded for a given version; `update` revalidates the
/// cached copy against the remote and `get` only fills a missing one.
#[derive(Debug, Clone)]
pub struct Artifact {
    package: String,
    file_name: String,
    url: String,
    path: PathBuf,
}

impl Artifact {
    pub fn new(
        package: impl Into<String>,
        file_name: impl Into<String>,
        url: impl Into<String>,
        cache_dir: &Path,
    ) -> Self {
        let package = package.into();
        let file_name = file_name.into();
        let path = cache_dir.join(&package).join(&file_name);

        Self {
            package,
            file_name,
            url: url.into(),
            path,
        }
    }

    /// Local cache path. The file exists only after `get` or `update`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the artifact unless a cached copy already exists.
    pub async fn get<F>(&self, http: &HttpClient, progress: Option<F>) -> Result<()>
    where
        F: Fn(u64, u64),
    {
        if self.path.exists() {
            log::debug!("Using cached {} for {}", self.file_name, self.package);
            return Ok(());
        }

        log::debug!("Downloading {} from {}", self.file_name, self.url);
        http.download(&self.url, &self.path, progress)
            .await
            .map_err(|e| self.download_error(e))
    }

    /// Idempotent refresh: re-download only when the remote copy is newer
    /// than the cache. Returns `true` if a fresh copy was fetched.
    pub async fn update<F>(&self, http: &HttpClient, progress: Option<F>) -> Result<bool>
    where
        F: Fn(u64, u64),
    {
        let fresh = http
            .download_if_newer(&self.url, &self.path, progress)
            .await
            .map_err(|e| self.download_error(e))?;

        if fresh {
            log::debug!("Downloaded {} from {}", self.file_name, self.url);
        } else {
            log::debug!("Cached {} is current", self.file_name);
        }

        Ok(fresh)
    }

    /// Fetch the artifact and read it as UTF-8 text (for small manifests).
    pub async fn fetch_text(&self, http: &HttpClient) -> Result<String> {
        self.get(http, None::<fn(u64, u64)>).await?;
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn download_error(&self, e: crate::http::HttpError) -> PackagingError {
        PackagingError::DownloadFailed {
            artifact: self.file_name.clone(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_path_layout() {
        let artifact = Artifact::new(
            "nuodb",
            "supportedversions.txt",
            "https://ce-downloads.nuohub.org/supportedversions.txt",
            Path::new("/cache"),
        );

        assert_eq!(
            artifact.path(),
            Path::new("/cache/nuodb/supportedversions.txt")
        );
        assert_eq!(artifact.file_name(), "supportedversions.txt");
    }

    #[tokio::test]
    async fn test_get_skips_existing_file() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let artifact = Artifact::new(
            "nuodb",
            "supportedversions.txt",
            "https://invalid.invalid/supportedversions.txt",
            temp_dir.path(),
        );

        std::fs::create_dir_all(artifact.path().parent().unwrap()).unwrap();
        std::fs::write(artifact.path(), "4.0\n4.1\n").unwrap();

        // The URL is unreachable, so this only passes because the cache hit
        // short-circuits the download.
        let http = HttpClient::new().unwrap();
        artifact.get(&http, None::<fn(u64, u64)>).await.unwrap();

        let text = artifact.fetch_text(&http).await.unwrap();
        assert_eq!(text, "4.0\n4.1\n");
    }
}
