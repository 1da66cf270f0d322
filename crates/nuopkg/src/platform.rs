//! Build target platforms and their archive naming templates.

use std::fmt;

/// Supported build targets, carrying the platform-specific naming data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Lin64,
    Win64,
}

impl Target {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lin64" => Some(Target::Lin64),
            "win64" => Some(Target::Win64),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Target::Lin64 => "lin64",
            Target::Win64 => "win64",
        }
    }

    fn archive_ext(&self) -> &'static str {
        match self {
            Target::Lin64 => ".tar.gz",
            Target::Win64 => ".zip",
        }
    }

    /// The extracted directory name: archive name minus the extension.
    pub fn dir_name(&self, version: &str) -> String {
        match self {
            Target::Lin64 => format!("nuodb-ce-{}.linux.x86_64", version),
            Target::Win64 => format!("nuodb-ce-{}.win64", version),
        }
    }

    /// The versioned archive file name for this platform.
    pub fn archive_name(&self, version: &str) -> String {
        format!("{}{}", self.dir_name(version), self.archive_ext())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
