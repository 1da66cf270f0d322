//! Shared configuration flags.

use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;

use nuopkg::{PackagingConfig, Target};

/// Flags shared by every subcommand; unset values fall back to `NUOPKG_*`
/// environment variables and then to the built-in defaults.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Build target platform (lin64 or win64)
    #[arg(long, value_name = "TARGET")]
    pub target: Option<String>,

    /// Remote base URL for the distribution downloads
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for cached downloads
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Package root the archive is extracted into
    #[arg(long, value_name = "DIR")]
    pub pkg_root: Option<PathBuf>,

    /// Output directory for staged products
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the client-specific companion binaries
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<PathBuf>,

    /// Directory holding the client-specific companion config scripts
    #[arg(long, value_name = "DIR")]
    pub etc_dir: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn to_config(&self) -> Result<PackagingConfig> {
        let target = self
            .target
            .as_deref()
            .map(|name| {
                Target::from_name(name).ok_or_else(|| anyhow!("Unknown build target: {}", name))
            })
            .transpose()?;

        let mut config = PackagingConfig::from_env(target)?;

        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.pkg_root {
            config.pkg_root = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_root = dir.clone();
        }
        if let Some(dir) = &self.bin_dir {
            config.bin_dir = dir.clone();
        }
        if let Some(dir) = &self.etc_dir {
            config.etc_dir = dir.clone();
        }

        Ok(config)
    }
}
