//! Error type shared by generation, packaging and import.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Result type alias for mbzkit operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A question violates an invariant of its type. Raised before anything
    /// is written.
    #[error("invalid question \"{question}\": {reason}")]
    Validation { question: String, reason: String },

    /// Quiz-level metadata that cannot be written (bad grade, control
    /// characters in the title, ...).
    #[error("invalid quiz settings: {reason}")]
    Settings { reason: String },

    #[error("failed to serialize {document}: {source}")]
    Serialization {
        document: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {document}: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error at {path}: {source}")]
    Archive {
        path: Utf8PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("malformed XML in {origin}: {source}")]
    Xml {
        origin: String,
        #[source]
        source: roxmltree::Error,
    },

    #[error("cannot import {origin}: {reason}")]
    Import { origin: String, reason: String },
}

impl Error {
    pub(crate) fn validation(question: &str, reason: impl Into<String>) -> Self {
        Error::Validation {
            question: question.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn settings(reason: impl Into<String>) -> Self {
        Error::Settings { reason: reason.into() }
    }

    pub(crate) fn import(origin: &str, reason: impl Into<String>) -> Self {
        Error::Import {
            origin: origin.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_keep_their_source() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = Error::Json {
            document: "project json",
            source,
        };
        assert!(err.to_string().starts_with("failed to serialize project json"));
        let inner = std::error::Error::source(&err).unwrap();
        assert!(inner.downcast_ref::<serde_json::Error>().is_some());
    }
}
