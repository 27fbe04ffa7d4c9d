#[allow(clippy::single_component_path_imports)]
use serde_yaml;

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create property directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write property file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read property file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to replace property file: {0}")]
    FileRename(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error(
        "property file {path} belongs to user '{found}', expected '{expected}'",
        path = path.display()
    )]
    OwnerMismatch {
        path: std::path::PathBuf,
        expected: String,
        found: String,
    },
    #[error("failed to lock property store for commit: {0}")]
    CommitLock(std::io::Error),
    #[error("property store lock poisoned")]
    LockPoisoned,
}

pub type PropertyResult<T> = std::result::Result<T, PropertyError>;
