//! Copy engine: executes staging plans against the extracted tree.
//!
//! Shared by every stage so the per-platform install code never touches the
//! filesystem. A source that resolves to nothing is fatal; an incomplete
//! extraction must not silently produce a degraded package.

use std::fs;
use std::path::{Path, PathBuf};

use crate::stage::{SourceSpec, Stage};
use crate::{PackagingError, Result};

/// Executes a [`Stage`]'s copy plan into `<output_root>/<stage>/<dest>/`.
pub struct StageCopier {
    output_root: PathBuf,
}

impl StageCopier {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Run the whole plan for one stage. Returns the number of files copied.
    pub fn run(&self, stage: &Stage) -> Result<u64> {
        let base = stage.base_dir().ok_or_else(|| PackagingError::StagingFailed {
            stage: stage.name().to_string(),
            reason: "base directory not set (unpack must run first)".to_string(),
        })?;

        let mut copied = 0;

        for op in stage.ops() {
            let dest_dir = self.output_root.join(stage.name()).join(&op.dest);
            fs::create_dir_all(&dest_dir)?;

            for source in &op.sources {
                let resolved = self.resolve(stage, base, source)?;

                for path in resolved {
                    copied += copy_entry(stage.name(), &path, &dest_dir)?;
                }
            }
        }

        log::info!("Staged {} files for {}", copied, stage.name());
        Ok(copied)
    }

    /// Resolve one recorded source to concrete paths. Globs are expanded
    /// here, never earlier.
    fn resolve(&self, stage: &Stage, base: &Path, source: &SourceSpec) -> Result<Vec<PathBuf>> {
        let staging_error = |reason: String| PackagingError::StagingFailed {
            stage: stage.name().to_string(),
            reason,
        };

        match source {
            SourceSpec::Categorized { category, pattern } => {
                let full = base.join(category).join(pattern);

                if source.is_glob() {
                    // An unreadable directory mid-walk must not shrink the
                    // match set; a partial expansion is a broken package
                    let matches: Vec<PathBuf> = glob::glob(&full.to_string_lossy())
                        .map_err(|e| staging_error(format!("bad pattern {}: {}", pattern, e)))?
                        .collect::<std::result::Result<_, _>>()
                        .map_err(|e| {
                            staging_error(format!("failed expanding {}: {}", pattern, e))
                        })?;

                    if matches.is_empty() {
                        return Err(staging_error(format!("no file matched {}", pattern)));
                    }
                    Ok(matches)
                } else {
                    if !full.exists() {
                        return Err(staging_error(format!("no file matched {}", pattern)));
                    }
                    Ok(vec![full])
                }
            }
            SourceSpec::Direct(path) => {
                let full = if path.is_absolute() {
                    path.clone()
                } else {
                    base.join(path)
                };

                if !full.exists() {
                    return Err(staging_error(format!("missing {}", full.display())));
                }
                Ok(vec![full])
            }
        }
    }
}

/// Copy a file, or a directory recursively, into `dest_dir`.
fn copy_entry(stage: &str, source: &Path, dest_dir: &Path) -> Result<u64> {
    let name = source.file_name().ok_or_else(|| PackagingError::StagingFailed {
        stage: stage.to_string(),
        reason: format!("source has no file name: {}", source.display()),
    })?;
    let dest = dest_dir.join(name);

    if source.is_dir() {
        copy_tree(source, &dest)
    } else {
        fs::copy(source, &dest)?;
        Ok(1)
    }
}

fn copy_tree(source: &Path, dest: &Path) -> Result<u64> {
    fs::create_dir_all(dest)?;
    let mut copied = 0;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            copied += copy_tree(&path, &dest.join(entry.file_name()))?;
        } else {
            fs::copy(&path, dest.join(entry.file_name()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn staged_stage(base: &Path) -> Stage {
        let mut stage = Stage::new("nuosql", "nuosql", "GNU/Linux or Windows");
        stage.set_base_dir(base);
        stage
    }

    #[test]
    fn test_copy_literal_file() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("tree");
        touch(&base.join("bin/nuosql"));

        let mut stage = staged_stage(&base);
        stage.stage_files("bin", "bin", &["nuosql"]);

        let out = temp.path().join("out");
        let copier = StageCopier::new(&out);
        let copied = copier.run(&stage).unwrap();

        assert_eq!(copied, 1);
        assert!(out.join("nuosql/bin/nuosql").exists());
    }

    #[test]
    fn test_glob_expansion_at_copy_time() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("tree");
        touch(&base.join("lib64/libicuuc.so.48"));
        touch(&base.join("lib64/libicudata.so.48"));
        touch(&base.join("lib64/libNuoODBC.so"));

        let mut stage = staged_stage(&base);
        stage.stage_files("lib64", "lib64", &["libicu*.so.*"]);

        let out = temp.path().join("out");
        let copied = StageCopier::new(&out).run(&stage).unwrap();

        assert_eq!(copied, 2);
        assert!(out.join("nuosql/lib64/libicuuc.so.48").exists());
        assert!(out.join("nuosql/lib64/libicudata.so.48").exists());
        assert!(!out.join("nuosql/lib64/libNuoODBC.so").exists());
    }

    #[test]
    fn test_direct_path_copies_directory_recursively() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("tree");
        touch(&base.join("samples/doc/cpp/example.cpp"));
        touch(&base.join("samples/doc/cpp/nested/more.cpp"));

        let mut stage = staged_stage(&base);
        stage.stage("samples", &[PathBuf::from("samples/doc/cpp")]);

        let out = temp.path().join("out");
        let copied = StageCopier::new(&out).run(&stage).unwrap();

        assert_eq!(copied, 2);
        assert!(out.join("nuosql/samples/cpp/example.cpp").exists());
        assert!(out.join("nuosql/samples/cpp/nested/more.cpp").exists());
    }

    #[test]
    fn test_missing_literal_is_fatal() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("tree");
        fs::create_dir_all(base.join("bin")).unwrap();

        let mut stage = staged_stage(&base);
        stage.stage_files("bin", "bin", &["nuosql"]);

        let result = StageCopier::new(temp.path().join("out")).run(&stage);
        assert!(matches!(
            result,
            Err(PackagingError::StagingFailed { .. })
        ));
    }

    #[test]
    fn test_unmatched_glob_is_fatal() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("tree");
        fs::create_dir_all(base.join("lib64")).unwrap();

        let mut stage = staged_stage(&base);
        stage.stage_files("lib64", "lib64", &["libicu*.so.*"]);

        let result = StageCopier::new(temp.path().join("out")).run(&stage);
        assert!(matches!(
            result,
            Err(PackagingError::StagingFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_during_glob_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let base = temp.path().join("tree");
        touch(&base.join("lib64/a/libicuuc.so.48"));
        touch(&base.join("lib64/b/libicudata.so.48"));

        let locked = base.join("lib64/b");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running as root; directory permissions are not enforced
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut stage = staged_stage(&base);
        stage.stage_files("lib64", "lib64", &["*/libicu*"]);

        let result = StageCopier::new(temp.path().join("out")).run(&stage);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            result,
            Err(PackagingError::StagingFailed { .. })
        ));
    }

    #[test]
    fn test_unset_base_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let mut stage = Stage::new("nuosql", "nuosql", "GNU/Linux or Windows");
        stage.stage_files("bin", "bin", &["nuosql"]);

        let result = StageCopier::new(temp.path().join("out")).run(&stage);
        assert!(matches!(
            result,
            Err(PackagingError::StagingFailed { .. })
        ));
    }
}
