//! HTTP transport for artifact downloads.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpError};
