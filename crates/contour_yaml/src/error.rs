//! Loading errors.

use std::path::PathBuf;

/// Error raised while reading or parsing a document
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The text is not valid YAML
    #[error("invalid YAML in {source_name}: {error}")]
    Yaml {
        /// Source name given by the caller
        source_name: String,
        /// Parser error
        #[source]
        error: serde_yaml::Error,
    },

    /// The text is not valid JSON
    #[error("invalid JSON in {source_name}: {error}")]
    Json {
        /// Source name given by the caller
        source_name: String,
        /// Parser error
        #[source]
        error: serde_json::Error,
    },

    /// The file could not be read
    #[error("cannot read {}: {error}", path.display())]
    Io {
        /// Path of the file
        path: PathBuf,
        /// I/O error
        #[source]
        error: std::io::Error,
    },
}

impl LoadError {
    /// Name of the source that failed to load
    #[must_use]
    pub fn source_name(&self) -> String {
        match self {
            Self::Yaml { source_name, .. } | Self::Json { source_name, .. } => source_name.clone(),
            Self::Io { path, .. } => path.display().to_string(),
        }
    }
}
