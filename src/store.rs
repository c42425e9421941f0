use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A single flat directory of named files.
///
/// Every name is checked to resolve to a direct child of the root, so no
/// request can reach outside it.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> FileStore {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Creates or truncates `name` and writes `content` to it.
    pub fn write(&self, name: &str, content: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name)?;
        let mut file = File::create(&path)?;
        file.write_all(content)?;
        Ok(path)
    }

    /// Names of the regular files in the store, in directory order.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let names = fs::read_dir(&self.root)?
            .filter_map(Result::ok)
            .filter(|entry| {
                fs::metadata(entry.path())
                    .map(|m| m.is_file())
                    .unwrap_or(false)
            })
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }

    /// Reads at most `limit` bytes from the start of `name`.
    pub fn read_prefix(&self, name: &str, limit: u64) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(name)?;

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return Err(StoreError::NotFound(name.to_string())),
        };
        if !file.metadata()?.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let mut content = Vec::new();
        file.take(limit).read_to_end(&mut content)?;
        Ok(content)
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let mut components = Path::new(name).components();
    let single_segment = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single_segment || name.contains(['/', '\\', ':', '\0']) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
