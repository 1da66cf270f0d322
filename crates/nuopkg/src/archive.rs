//! Archive extraction for the downloaded distribution.
//!
//! Unlike a vendor-directory installer this keeps the archive's own top-level
//! directory: its name is derived from the version and platform template and
//! the staging plans resolve against it.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::{PackagingError, Result};

/// Supported archive kinds, detected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Tar,
    Zip,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.to_string_lossy().to_lowercase();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else {
            None
        }
    }
}

/// Extract an archive into `dest_dir`, preserving its internal layout.
///
/// Entries that would escape the destination directory are rejected.
pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let kind = ArchiveKind::from_path(archive_path).ok_or_else(|| {
        PackagingError::ExtractionFailed(format!(
            "Unknown archive type: {}",
            archive_path.display()
        ))
    })?;

    std::fs::create_dir_all(dest_dir)?;

    match kind {
        ArchiveKind::TarGz => {
            let file = File::open(archive_path)?;
            let decoder = GzDecoder::new(BufReader::new(file));
            extract_tar_reader(decoder, dest_dir)
        }
        ArchiveKind::Tar => {
            let file = File::open(archive_path)?;
            extract_tar_reader(BufReader::new(file), dest_dir)
        }
        ArchiveKind::Zip => extract_zip(archive_path, dest_dir),
    }
}

fn extract_tar_reader<R: Read>(reader: R, dest_dir: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);

    for entry in archive
        .entries()
        .map_err(|e| PackagingError::ExtractionFailed(format!("Failed to read tar: {}", e)))?
    {
        let mut entry = entry
            .map_err(|e| PackagingError::ExtractionFailed(format!("Failed to read tar entry: {}", e)))?;

        // unpack_in refuses entries that escape dest_dir
        let unpacked = entry
            .unpack_in(dest_dir)
            .map_err(|e| PackagingError::ExtractionFailed(format!("Failed to extract: {}", e)))?;

        if !unpacked {
            let path = entry.path().map(|p| p.display().to_string()).unwrap_or_default();
            return Err(PackagingError::ExtractionFailed(format!(
                "Path traversal detected in archive: {}",
                path
            )));
        }
    }

    Ok(())
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| PackagingError::ExtractionFailed(format!("Failed to open zip: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| PackagingError::ExtractionFailed(format!("Failed to read zip entry: {}", e)))?;

        let relative = entry.enclosed_name().ok_or_else(|| {
            PackagingError::ExtractionFailed(format!(
                "Path traversal detected in archive: {}",
                entry.name()
            ))
        })?;

        let outpath = dest_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}
