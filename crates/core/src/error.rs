use std::path::PathBuf;

/// Per-file I/O failure. Scanner and driver misses are never errors; a file
/// either transforms or is left alone.
#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid {}", .path.display(), .encoding)]
    Decode { path: PathBuf, encoding: &'static str },

    #[error("failed to stage write for {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace {}: {}", .path.display(), .source)]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransformError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Decode { path, .. }
            | Self::Write { path, .. }
            | Self::Persist { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
