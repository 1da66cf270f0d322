//! Packaging configuration.

use std::env;
use std::path::PathBuf;

use crate::platform::Target;
use crate::{PackagingError, Result};

pub const DEFAULT_BASE_URL: &str = "https://ce-downloads.nuohub.org";

/// Configuration for one packaging run: where to fetch from, where the
/// package root and outputs live, and where the companion scripts that are
/// not shipped inside the archive come from.
#[derive(Debug, Clone)]
pub struct PackagingConfig {
    pub target: Target,
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub pkg_root: PathBuf,
    pub output_root: PathBuf,
    pub bin_dir: PathBuf,
    pub etc_dir: PathBuf,
}

impl PackagingConfig {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: PathBuf::from(".nuopkg/cache"),
            pkg_root: PathBuf::from(".nuopkg/pkg"),
            output_root: PathBuf::from("dist"),
            bin_dir: PathBuf::from("scripts/bin"),
            etc_dir: PathBuf::from("scripts/etc"),
        }
    }

    /// Build a config from the environment. `NUOPKG_TARGET` is required
    /// unless a target was already chosen by the caller.
    pub fn from_env(target: Option<Target>) -> Result<Self> {
        let target = match target {
            Some(t) => t,
            None => {
                let name = env::var("NUOPKG_TARGET")
                    .map_err(|_| PackagingError::Config("NUOPKG_TARGET is not set".to_string()))?;
                Target::from_name(&name).ok_or_else(|| {
                    PackagingError::Config(format!("Unknown build target: {}", name))
                })?
            }
        };

        let mut config = Self::new(target);

        if let Ok(url) = env::var("NUOPKG_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(dir) = env::var("NUOPKG_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("NUOPKG_PKG_ROOT") {
            config.pkg_root = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("NUOPKG_OUTPUT_DIR") {
            config.output_root = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("NUOPKG_BIN_DIR") {
            config.bin_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("NUOPKG_ETC_DIR") {
            config.etc_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_pkg_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pkg_root = dir.into();
        self
    }

    pub fn with_output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_root = dir.into();
        self
    }

    pub fn with_bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = dir.into();
        self
    }

    pub fn with_etc_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.etc_dir = dir.into();
        self
    }

    /// URL of a file served under the base URL.
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PackagingConfig::new(Target::Lin64);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_dir, PathBuf::from(".nuopkg/cache"));
        assert_eq!(config.output_root, PathBuf::from("dist"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = PackagingConfig::new(Target::Win64)
            .with_base_url("https://mirror.example.org/")
            .with_cache_dir("/var/cache/nuopkg")
            .with_bin_dir("/opt/build/bin");

        assert_eq!(config.target, Target::Win64);
        assert_eq!(config.base_url, "https://mirror.example.org/");
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/nuopkg"));
        assert_eq!(config.bin_dir, PathBuf::from("/opt/build/bin"));
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let config =
            PackagingConfig::new(Target::Lin64).with_base_url("https://mirror.example.org/");
        assert_eq!(
            config.url_for("supportedversions.txt"),
            "https://mirror.example.org/supportedversions.txt"
        );
    }

    #[test]
    fn test_from_env_requires_target() {
        // Explicit target wins over the environment
        let config = PackagingConfig::from_env(Some(Target::Lin64)).unwrap();
        assert_eq!(config.target, Target::Lin64);
    }
}
