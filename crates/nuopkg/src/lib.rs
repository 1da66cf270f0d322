pub mod archive;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod copier;
pub mod error;
pub mod http;
pub mod package;
pub mod platform;
pub mod registry;
pub mod stage;

pub use archive::{extract, ArchiveKind};
pub use artifact::Artifact;
pub use config::PackagingConfig;
pub use copier::StageCopier;
pub use error::{PackagingError, Result};
pub use http::{HttpClient, HttpClientConfig};
pub use package::ClientPackage;
pub use platform::Target;
pub use registry::PackageRegistry;
pub use stage::{CopyOp, SourceSpec, Stage};
