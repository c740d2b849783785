//! Local kubeconfig file

use crate::error::KubeconfigError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Mode for a newly created kubeconfig
pub const LOCAL_FILE_MODE: u32 = 0o600;

/// Append `contents` to `path`, creating it (and its parent) if absent
///
/// Existing content is never truncated. A newly created file is readable by
/// the owner only.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub fn append_kubeconfig(path: &Path, contents: &[u8]) -> Result<(), KubeconfigError> {
    let io_err = |source| KubeconfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(LOCAL_FILE_MODE);
    }

    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(contents).map_err(io_err)?;
    file.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".kube").join("config");

        append_kubeconfig(&path, b"apiVersion: v1\n").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"apiVersion: v1\n");
    }

    #[test]
    fn test_appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "existing: true\n").unwrap();

        append_kubeconfig(&path, b"apiVersion: v1\n").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "existing: true\napiVersion: v1\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");

        append_kubeconfig(&path, b"x").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }
}
