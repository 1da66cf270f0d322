//! Staging plans: what to copy for each named output product.
//!
//! A [`Stage`] only records intent. Path resolution, glob expansion and the
//! actual copying are done by the copy engine against the base directory set
//! after unpacking, so the per-platform install code stays declarative.

use std::path::{Path, PathBuf};

/// One source of a copy operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A literal name or glob pattern under `<base_dir>/<category>`.
    Categorized { category: String, pattern: String },
    /// A path relative to the base directory, or an absolute path to a
    /// companion file shipped outside the archive.
    Direct(PathBuf),
}

impl SourceSpec {
    /// Whether this source is a glob pattern (expanded at copy time).
    pub fn is_glob(&self) -> bool {
        match self {
            SourceSpec::Categorized { pattern, .. } => {
                pattern.contains(['*', '?', '['])
            }
            SourceSpec::Direct(_) => false,
        }
    }
}

/// One recorded copy operation: sources into a destination category.
#[derive(Debug, Clone)]
pub struct CopyOp {
    pub dest: String,
    pub sources: Vec<SourceSpec>,
}

/// A named output product with its accumulated copy plan.
#[derive(Debug)]
pub struct Stage {
    name: String,
    title: String,
    requirements: String,
    base_dir: Option<PathBuf>,
    ops: Vec<CopyOp>,
}

impl Stage {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        requirements: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            requirements: requirements.into(),
            base_dir: None,
            ops: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    /// Base directory the plan resolves against; set once, after unpack.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.base_dir = Some(dir.into());
    }

    /// Record a copy of names or glob patterns found under
    /// `<base_dir>/<category>` into the `dest` category.
    pub fn stage_files(&mut self, category: &str, dest: &str, patterns: &[&str]) {
        self.ops.push(CopyOp {
            dest: dest.to_string(),
            sources: patterns
                .iter()
                .map(|p| SourceSpec::Categorized {
                    category: category.to_string(),
                    pattern: (*p).to_string(),
                })
                .collect(),
        });
    }

    /// Record a copy of fully-qualified paths (relative to the base directory,
    /// or absolute) into the `dest` category. No category remap.
    pub fn stage(&mut self, dest: &str, paths: &[PathBuf]) {
        self.ops.push(CopyOp {
            dest: dest.to_string(),
            sources: paths.iter().cloned().map(SourceSpec::Direct).collect(),
        });
    }

    pub fn ops(&self) -> &[CopyOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
