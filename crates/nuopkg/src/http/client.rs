//! HTTP client for the artifact fetcher.
//!
//! A wrapper around `reqwest` with the behavior the packaging workflow needs:
//! - Automatic retry with exponential backoff on server errors and rate limits
//! - Streaming downloads with an optional progress callback
//! - Conditional fetches (`If-Modified-Since`) so cached artifacts are only
//!   re-downloaded when the remote copy changed

use chrono::{DateTime, Utc};
use reqwest::header::IF_MODIFIED_SINCE;
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const DEFAULT_USER_AGENT: &str = "nuopkg/0.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Max retries exceeded for {url}")]
    MaxRetries { url: String },
}

pub struct HttpClient {
    client: Client,
    user_agent: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Perform a GET request with automatic retries.
    ///
    /// A 304 Not Modified response to a conditional request is returned as-is;
    /// all other non-success statuses are errors. Server errors and 429 are
    /// retried with exponential backoff, other client errors are not.
    pub async fn get(
        &self,
        url: &str,
        if_modified_since: Option<&str>,
    ) -> Result<Response, HttpError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.execute_get(url, if_modified_since).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() || status == StatusCode::NOT_MODIFIED {
                        return Ok(response);
                    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(HttpError::HttpStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    } else {
                        return Err(HttpError::HttpStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }

            if attempt < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = self.retry_delay * 2_u32.pow(attempt);
                tokio::time::sleep(delay).await;
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Err(HttpError::MaxRetries {
                url: url.to_string(),
            }),
        }
    }

    async fn execute_get(
        &self,
        url: &str,
        if_modified_since: Option<&str>,
    ) -> Result<Response, HttpError> {
        let mut request = self.client.get(url);

        if let Some(since) = if_modified_since {
            request = request.header(IF_MODIFIED_SINCE, since);
        }

        let response = request.send().await?;
        Ok(response)
    }

    /// GET a small text resource into memory.
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let response = self.get(url, None).await?;
        Ok(response.text().await?)
    }

    /// Download a file, streaming the body to `dest`.
    pub async fn download<F>(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<F>,
    ) -> Result<(), HttpError>
    where
        F: Fn(u64, u64),
    {
        let response = self.get(url, None).await?;
        self.write_body(response, dest, progress).await
    }

    /// Download a file only if the remote copy is newer than `dest`.
    ///
    /// Sends `If-Modified-Since` derived from the local file's mtime; a 304
    /// answer keeps the cached copy and returns `false`. Returns `true` when
    /// a fresh copy was written.
    pub async fn download_if_newer<F>(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<F>,
    ) -> Result<bool, HttpError>
    where
        F: Fn(u64, u64),
    {
        let since = match tokio::fs::metadata(dest).await {
            Ok(meta) => meta.modified().ok().map(format_http_date),
            Err(_) => None,
        };

        let response = self.get(url, since.as_deref()).await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(false);
        }

        self.write_body(response, dest, progress).await?;
        Ok(true)
    }

    /// Stream a response body into `dest`.
    ///
    /// The body is written to a temporary file next to `dest` and renamed
    /// into place only after it is complete, so an interrupted download
    /// never leaves a partial file at the final path.
    async fn write_body<F>(
        &self,
        response: Response,
        dest: &Path,
        progress: Option<F>,
    ) -> Result<(), HttpError>
    where
        F: Fn(u64, u64),
    {
        let total_size = response.content_length().unwrap_or(0);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let temp = tempfile::NamedTempFile::new_in(parent)?;

        let mut file = File::create(temp.path()).await?;
        let mut downloaded: u64 = 0;

        let mut stream = response.bytes_stream();

        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref callback) = progress {
                callback(downloaded, total_size);
            }
        }

        file.flush().await?;
        drop(file);

        temp.persist(dest).map_err(|e| HttpError::Io(e.error))?;

        Ok(())
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Format a timestamp as an HTTP-date (RFC 7231, always GMT).
fn format_http_date(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}
