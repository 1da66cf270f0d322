//! The NuoDB client package lifecycle.
//!
//! One `ClientPackage` walks `version-resolved -> downloaded -> unpacked ->
//! installed`, driven externally by the build driver. Download resolves the
//! latest supported version from the remote manifest and fetches the platform
//! archive; unpack destructively resets the package root and extracts; install
//! declares every stage's copy plan for the chosen target.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::archive;
use crate::artifact::Artifact;
use crate::config::PackagingConfig;
use crate::http::HttpClient;
use crate::platform::Target;
use crate::stage::Stage;
use crate::{PackagingError, Result};

pub const PKG_NAME: &str = "nuodb";

const VERSIONS_FILE: &str = "supportedversions.txt";

/// Stages that ship native code and need the bundled runtime libraries.
const NATIVE_STAGES: &[&str] = &["nuosql", "nuoloader", "nuoodbc", "nuoremote", "nuoclient"];

/// Extracts the NuoDB clients from the Community Edition database package.
pub struct ClientPackage {
    name: String,
    target: Target,
    version: Option<String>,
    archive: Option<Artifact>,
    dir_name: Option<String>,
    stages: IndexMap<String, Stage>,
}

/// The latest supported version is the last whitespace-separated token of
/// the manifest.
pub fn parse_version(manifest: &str) -> Result<&str> {
    manifest
        .split_whitespace()
        .last()
        .ok_or_else(|| PackagingError::ManifestParse("no version tokens".to_string()))
}

impl ClientPackage {
    pub fn new(target: Target) -> Self {
        let mut stages = IndexMap::new();

        for stage in [
            Stage::new("nuosql", "nuosql", "GNU/Linux or Windows"),
            Stage::new("nuoloader", "nuoloader", "GNU/Linux or Windows"),
            Stage::new("nuodbmgr", "nuodbmgr", "Java 8 or 11"),
            Stage::new(
                "nuoodbc",
                "NuoODBC Driver",
                "GNU/Linux with UnixODBC 2.3 or Windows",
            ),
            Stage::new("nuoremote", "C++ Driver", "GNU/Linux or Windows"),
            Stage::new("nuoclient", "C Driver", "GNU/Linux or Windows"),
        ] {
            stages.insert(stage.name().to_string(), stage);
        }

        Self {
            name: PKG_NAME.to_string(),
            target,
            version: None,
            archive: None,
            dir_name: None,
            stages,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn archive(&self) -> Option<&Artifact> {
        self.archive.as_ref()
    }

    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.values()
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.get(name)
    }

    fn stage_mut(&mut self, name: &str) -> Result<&mut Stage> {
        self.stages
            .get_mut(name)
            .ok_or_else(|| PackagingError::Config(format!("unknown stage {}", name)))
    }

    /// Resolve the latest supported version from the remote manifest.
    pub async fn latest_version(http: &HttpClient, config: &PackagingConfig) -> Result<String> {
        let versions = Artifact::new(
            PKG_NAME,
            VERSIONS_FILE,
            config.url_for(VERSIONS_FILE),
            &config.cache_dir,
        );
        let manifest = versions.fetch_text(http).await?;
        Ok(parse_version(&manifest)?.to_string())
    }

    /// Pin the package to a version. Archive and directory names derive
    /// deterministically from it; resolving twice is an error.
    pub fn resolve(&mut self, version: &str, config: &PackagingConfig) -> Result<()> {
        if self.version.is_some() {
            return Err(PackagingError::Config(format!(
                "version already resolved for package {}",
                self.name
            )));
        }

        let archive_name = self.target.archive_name(version);
        self.archive = Some(Artifact::new(
            &self.name,
            &archive_name,
            config.url_for(&archive_name),
            &config.cache_dir,
        ));
        self.dir_name = Some(self.target.dir_name(version));
        self.version = Some(version.to_string());

        log::info!("Resolved {} {} ({})", self.name, version, archive_name);
        Ok(())
    }

    /// Resolve the version (once) and fetch the platform archive. The fetch
    /// is idempotent: a current cached copy is not downloaded again.
    pub async fn download<F>(
        &mut self,
        http: &HttpClient,
        config: &PackagingConfig,
        progress: Option<F>,
    ) -> Result<String>
    where
        F: Fn(u64, u64),
    {
        if self.version.is_none() {
            let version = Self::latest_version(http, config).await?;
            self.resolve(&version, config)?;
        }

        let archive = self
            .archive
            .as_ref()
            .ok_or_else(|| PackagingError::VersionUnresolved(self.name.clone()))?;
        archive.update(http, progress).await?;

        self.version
            .clone()
            .ok_or_else(|| PackagingError::VersionUnresolved(self.name.clone()))
    }

    /// Destructively reset the package root, extract the archive into it and
    /// point every stage's base directory at the extracted tree.
    pub fn unpack(&mut self, pkg_root: &Path) -> Result<PathBuf> {
        let archive = self
            .archive
            .as_ref()
            .ok_or_else(|| PackagingError::VersionUnresolved(self.name.clone()))?;
        let dir_name = self
            .dir_name
            .clone()
            .ok_or_else(|| PackagingError::VersionUnresolved(self.name.clone()))?;

        // No merging with stale content from a previous run
        if pkg_root.exists() {
            fs::remove_dir_all(pkg_root)?;
        }
        fs::create_dir_all(pkg_root)?;

        archive::extract(archive.path(), pkg_root)?;

        let tree = pkg_root.join(dir_name);
        for stage in self.stages.values_mut() {
            stage.set_base_dir(&tree);
        }

        log::info!("Unpacked {} into {}", self.name, tree.display());
        Ok(tree)
    }

    /// Declare every stage's copy plan for the configured target.
    pub fn install(&mut self, config: &PackagingConfig) -> Result<()> {
        match self.target {
            Target::Lin64 => self.install_linux(config)?,
            Target::Win64 => self.install_windows(config)?,
        }

        // Header and sample files for the C/C++ drivers
        self.stage_mut("nuoremote")?.stage_files(
            "include",
            "include",
            &["NuoDB.h", "SQLException.h", "SQLExceptionConstants.h", "NuoRemote"],
        );
        self.stage_mut("nuoremote")?
            .stage("samples", &[PathBuf::from("samples/doc/cpp")]);
        self.stage_mut("nuoclient")?
            .stage_files("include", "include", &["nuodb"]);
        self.stage_mut("nuoclient")?
            .stage("samples", &[PathBuf::from("samples/doc/c")]);

        for stage in self.stages.values_mut() {
            stage.stage(
                "doc",
                &[PathBuf::from("README.txt"), PathBuf::from("ce_license.txt")],
            );
        }

        Ok(())
    }

    fn install_linux(&mut self, config: &PackagingConfig) -> Result<()> {
        self.stage_mut("nuosql")?.stage_files("bin", "bin", &["nuosql"]);
        self.stage_mut("nuoloader")?
            .stage_files("bin", "bin", &["nuoloader"]);

        self.stage_mut("nuoodbc")?
            .stage_files("lib64", "lib64", &["libNuoODBC.so"]);
        self.stage_mut("nuoremote")?
            .stage_files("lib64", "lib64", &["libNuoRemote.so"]);
        self.stage_mut("nuoclient")?
            .stage_files("lib64", "lib64", &["libnuoclient.so"]);

        // Shared libraries for the stages that need them
        for name in NATIVE_STAGES {
            self.stage_mut(name)?
                .stage_files("lib64", "lib64", &["libicu*.so.*", "libmpir.so.*"]);
        }

        self.stage_mut("nuodbmgr")?
            .stage_files("jar", "jar", &["nuodbmanager.jar"]);

        // Client-specific versions of these scripts, shipped outside the archive
        let bin_script = std::path::absolute(config.bin_dir.join("nuodbmgr"))?;
        let etc_script = std::path::absolute(config.etc_dir.join("run-java-app.sh"))?;
        self.stage_mut("nuodbmgr")?.stage("bin", &[bin_script]);
        self.stage_mut("nuodbmgr")?.stage("etc", &[etc_script]);

        Ok(())
    }

    fn install_windows(&mut self, config: &PackagingConfig) -> Result<()> {
        self.stage_mut("nuosql")?
            .stage_files("bin", "bin", &["nuosql.exe"]);
        self.stage_mut("nuoloader")?
            .stage_files("bin", "bin", &["nuoloader.exe"]);

        self.stage_mut("nuoodbc")?
            .stage_files("bin", "bin", &["NuoODBC.dll", "NuoODBC.pdb"]);
        self.stage_mut("nuoremote")?
            .stage_files("bin", "bin", &["NuoRemote.dll", "NuoRemote.pdb"]);
        self.stage_mut("nuoremote")?
            .stage_files("lib", "lib", &["NuoRemote.lib"]);
        self.stage_mut("nuoclient")?
            .stage_files("bin", "bin", &["nuoclient.dll", "nuoclient.pdb"]);
        self.stage_mut("nuoclient")?
            .stage_files("lib", "lib", &["nuoclient.lib"]);

        // Runtime libraries for the stages that need them
        for name in NATIVE_STAGES {
            self.stage_mut(name)?.stage_files(
                "bin",
                "bin",
                &["icu*.dll", "mpir*.dll", "msvcp140.dll", "vcruntime140.dll"],
            );
        }

        self.stage_mut("nuodbmgr")?
            .stage_files("jar", "jar", &["nuodbmanager.jar"]);

        let bin_script = std::path::absolute(config.bin_dir.join("nuodbmgr.bat"))?;
        self.stage_mut("nuodbmgr")?.stage("bin", &[bin_script]);

        Ok(())
    }
}
