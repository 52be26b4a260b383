//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use stencil_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{StencilError, StencilResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> StencilResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> StencilResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if executable {
                let metadata =
                    std::fs::metadata(path).map_err(|e| map_io_error(path, e, "read metadata"))?;
                let mut perms = metadata.permissions();
                perms.set_mode(perms.mode() | 0o111);
                std::fs::set_permissions(path, perms)
                    .map_err(|e| map_io_error(path, e, "set permissions"))?;
            }
        }
        #[cfg(not(unix))]
        {
            let _ = (path, executable);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as occupying the path
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
    }

    fn is_empty_dir(&self, path: &Path) -> StencilResult<bool> {
        let mut entries =
            std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "read directory"))?;
        Ok(entries.next().is_none())
    }

    fn rename(&self, from: &Path, to: &Path) -> StencilResult<()> {
        std::fs::rename(from, to).map_err(|e| map_io_error(to, e, "move staged project"))
    }

    fn remove_dir(&self, path: &Path) -> StencilResult<()> {
        std::fs::remove_dir(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn remove_dir_all(&self, path: &Path) -> StencilResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StencilError {
    ApplicationError::WriteFailure {
        path: path.to_path_buf(),
        reason: format!("failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_detects_files() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let file = temp.path().join("nested/dir/main.py");

        fs.create_dir_all(file.parent().unwrap()).unwrap();
        fs.write_file(&file, "print('hi')\n").unwrap();

        assert!(fs.exists(&file));
        assert!(!fs.is_dir(&file));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "print('hi')\n");
    }

    #[test]
    fn empty_dir_detection() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        assert!(fs.is_empty_dir(temp.path()).unwrap());
        std::fs::write(temp.path().join("keep"), "").unwrap();
        assert!(!fs.is_empty_dir(temp.path()).unwrap());
    }

    #[test]
    fn rename_moves_a_whole_tree() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let staging = temp.path().join(".demo.staging");
        let dest = temp.path().join("demo");

        fs.create_dir_all(&staging.join("app")).unwrap();
        fs.write_file(&staging.join("app/__init__.py"), "").unwrap();
        fs.rename(&staging, &dest).unwrap();

        assert!(!staging.exists());
        assert!(dest.join("app/__init__.py").exists());
    }

    #[test]
    fn io_errors_become_write_failures() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let missing_parent = temp.path().join("missing/main.py");

        let err = fs.write_file(&missing_parent, "x").unwrap_err();

        assert!(err.is_write_failure());
        assert!(err.to_string().contains("failed to write file"));
    }

    #[cfg(unix)]
    #[test]
    fn sets_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let script = temp.path().join("run.sh");
        fs.write_file(&script, "#!/bin/sh\n").unwrap();

        fs.set_permissions(&script, true).unwrap();

        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
