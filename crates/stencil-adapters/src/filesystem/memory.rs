//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use stencil_core::{
    application::{ApplicationError, ports::Filesystem},
    error::StencilResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can hand one clone to a service
/// and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
    executables: HashSet<PathBuf>,
    /// File names whose writes fail (failure injection).
    failing: HashSet<String>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to a file with this name fail.
    pub fn fail_writes_to(self, file_name: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing.insert(file_name.into());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        self.inner.read().ok()?.files.get(path).cloned()
    }

    /// Check if a file is marked executable.
    pub fn is_executable(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.executables.contains(path))
            .unwrap_or(false)
    }

    /// All files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// All directories, sorted.
    pub fn list_directories(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.directories.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self) -> StencilResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?)
    }

    fn write(&self) -> StencilResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        Ok(self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?)
    }
}

fn write_failure(path: &Path, reason: &str) -> ApplicationError {
    ApplicationError::WriteFailure {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

impl MemoryFilesystemInner {
    fn children_of<'a>(&'a self, dir: &'a Path) -> impl Iterator<Item = &'a PathBuf> + 'a {
        self.files
            .keys()
            .chain(self.directories.iter())
            .filter(move |p| p.parent() == Some(dir))
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self.write()?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if inner.files.contains_key(&current) {
                return Err(write_failure(&current, "not a directory").into());
            }
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> StencilResult<()> {
        let mut inner = self.write()?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if inner.failing.contains(&name) {
            return Err(write_failure(path, "injected write failure").into());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(write_failure(path, "parent directory does not exist").into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> StencilResult<()> {
        let mut inner = self.write()?;

        if executable {
            inner.executables.insert(path.to_path_buf());
        } else {
            inner.executables.remove(path);
        }

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_symlink(&self, _path: &Path) -> bool {
        false
    }

    fn is_empty_dir(&self, path: &Path) -> StencilResult<bool> {
        let inner = self.read()?;
        if !inner.directories.contains(path) {
            return Err(write_failure(path, "not a directory").into());
        }
        Ok(inner.children_of(path).next().is_none())
    }

    fn rename(&self, from: &Path, to: &Path) -> StencilResult<()> {
        let mut inner = self.write()?;

        if !inner.directories.contains(from) {
            return Err(write_failure(from, "no such directory").into());
        }
        if inner.files.contains_key(to) || inner.directories.contains(to) {
            return Err(write_failure(to, "destination already exists").into());
        }

        let relocate = |p: &Path| -> Option<PathBuf> {
            p.strip_prefix(from).ok().map(|rest| to.join(rest))
        };

        let files = std::mem::take(&mut inner.files);
        inner.files = files
            .into_iter()
            .map(|(p, c)| (relocate(&p).unwrap_or(p), c))
            .collect();

        let dirs = std::mem::take(&mut inner.directories);
        inner.directories = dirs
            .into_iter()
            .map(|p| relocate(&p).unwrap_or(p))
            .collect();

        let execs = std::mem::take(&mut inner.executables);
        inner.executables = execs
            .into_iter()
            .map(|p| relocate(&p).unwrap_or(p))
            .collect();

        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self.write()?;
        if inner.children_of(path).next().is_some() {
            return Err(write_failure(path, "directory not empty").into());
        }
        inner.directories.remove(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self.write()?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.executables.retain(|p| !p.starts_with(path));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/a/b.txt"), "x").is_err());

        fs.create_dir_all(Path::new("/a")).unwrap();
        fs.write_file(Path::new("/a/b.txt"), "x").unwrap();
        assert_eq!(fs.read_file(Path::new("/a/b.txt")).as_deref(), Some("x"));
    }

    #[test]
    fn rename_moves_descendants() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/out/.stage/app")).unwrap();
        fs.write_file(Path::new("/out/.stage/app/main.py"), "x").unwrap();
        fs.set_permissions(Path::new("/out/.stage/app/main.py"), true)
            .unwrap();

        fs.rename(Path::new("/out/.stage"), Path::new("/out/demo"))
            .unwrap();

        assert!(!fs.exists(Path::new("/out/.stage")));
        assert!(fs.exists(Path::new("/out/demo/app/main.py")));
        assert!(fs.is_executable(Path::new("/out/demo/app/main.py")));
    }

    #[test]
    fn empty_dir_checks() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/out/demo")).unwrap();
        assert!(fs.is_empty_dir(Path::new("/out/demo")).unwrap());
        assert!(!fs.is_empty_dir(Path::new("/out")).unwrap());
        assert!(fs.remove_dir(Path::new("/out")).is_err());
        fs.remove_dir(Path::new("/out/demo")).unwrap();
        assert!(!fs.exists(Path::new("/out/demo")));
    }

    #[test]
    fn injected_failures_hit_matching_names() {
        let fs = MemoryFilesystem::new().fail_writes_to("README.md");
        fs.create_dir_all(Path::new("/p")).unwrap();

        assert!(fs.write_file(Path::new("/p/main.py"), "").is_ok());
        let err = fs.write_file(Path::new("/p/README.md"), "").unwrap_err();
        assert!(err.is_write_failure());
    }
}
