//! Best-effort asset checks. Failures are reported, never fatal.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Asset lookup errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),

    #[error("asset path is not a file: {0}")]
    NotAFile(PathBuf),

    #[error("cannot read asset {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check that an asset exists and is a readable file
pub fn check_file(path: impl AsRef<Path>) -> Result<(), AssetError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => AssetError::NotFound(path.to_path_buf()),
        _ => AssetError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if !metadata.is_file() {
        return Err(AssetError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Check every path, log the missing ones, return how many are available
pub fn report_missing<'a>(paths: impl IntoIterator<Item = &'a str>) -> usize {
    let mut available = 0;
    let mut missing = 0;
    for path in paths {
        match check_file(path) {
            Ok(()) => available += 1,
            Err(e) => {
                missing += 1;
                warn!(error = %e, "Asset missing, frontend will substitute");
            }
        }
    }
    info!(available, missing, "Asset check complete");
    available
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_file_classifies_paths() {
        assert!(check_file("Cargo.toml").is_ok());
        assert!(matches!(check_file("no/such/file.png"), Err(AssetError::NotFound(_))));
        assert!(matches!(check_file("src"), Err(AssetError::NotAFile(_))));
    }

    #[test]
    fn report_counts_available() {
        assert_eq!(report_missing(["Cargo.toml", "missing.jpg"]), 1);
    }
}
