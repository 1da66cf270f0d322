use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackagingError {
    // Version manifest errors
    #[error("Version manifest is empty or malformed: {0}")]
    ManifestParse(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Download errors
    #[error("Download failed for {artifact}: {reason}")]
    DownloadFailed { artifact: String, reason: String },

    // Extraction errors
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    // Staging errors
    #[error("Staging failed for {stage}: {reason}")]
    StagingFailed { stage: String, reason: String },

    // Lifecycle errors
    #[error("Version not resolved for package {0}")]
    VersionUnresolved(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PackagingError>;
