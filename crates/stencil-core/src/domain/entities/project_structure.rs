use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
};

/// Rendered project tree ready for materialization.
///
/// Output of the renderer; input to the writer and to dry-run plans.
/// Holds only data.
#[derive(Debug, Clone)]
pub struct ProjectStructure {
    pub(crate) root: PathBuf,
    pub(crate) entries: Vec<FsEntry>,
}

impl ProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn add_file(&mut self, path: RelativePath, content: String, perms: Permissions) {
        self.entries.push(FsEntry::File(FileToWrite {
            path,
            content,
            permissions: perms,
        }));
    }

    pub fn add_directory(&mut self, path: RelativePath, perms: Permissions) {
        self.entries.push(FsEntry::Directory(DirectoryToCreate {
            path,
            permissions: perms,
        }));
    }

    pub fn with_file(mut self, path: RelativePath, content: String, perms: Permissions) -> Self {
        self.add_file(path, content, perms);
        self
    }

    pub fn with_directory(mut self, path: RelativePath, perms: Permissions) -> Self {
        self.add_directory(path, perms);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.files().next().is_none() {
            return Err(DomainError::InvalidTemplate(
                "Project structure has no files".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            let path = entry.path().to_slash_string();
            if !seen.insert(path.clone()) {
                return Err(DomainError::DuplicatePath { path });
            }
        }

        Ok(())
    }

    /// Destination directory the entries are relative to.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn entries(&self) -> &[FsEntry] {
        &self.entries
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::File(f) => Some(f),
            _ => None,
        })
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryToCreate> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::Directory(d) => Some(d),
            _ => None,
        })
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(DirectoryToCreate),
}

impl FsEntry {
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileToWrite {
    pub path: RelativePath,
    pub content: String,
    pub permissions: Permissions,
}

impl FileToWrite {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryToCreate {
    pub path: RelativePath,
    pub permissions: Permissions,
}
