// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the testreport renderer.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::{fmt, io};
use testreport_metadata::{Destination, OutputId, TestPath};
use thiserror::Error;

/// An error that occurred while building a [`TestTreeModel`](crate::tree::TestTreeModel).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeBuildError {
    /// A root was added more than once.
    #[error("root `{root_name}` was added more than once")]
    DuplicateRoot {
        /// The name of the root.
        root_name: String,
    },

    /// Two records for the same root share a path.
    #[error("root `{root_name}` has more than one result for path `{path}`")]
    DuplicateResult {
        /// The name of the root.
        root_name: String,
        /// The duplicated path.
        path: TestPath,
    },
}

/// An error that occurred while rendering a page.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Reading captured output from the store failed.
    #[error("error reading {destination} for output {output_id} of root `{root_name}`")]
    ReadOutput {
        /// The name of the root.
        root_name: String,
        /// The output identifier.
        output_id: OutputId,
        /// The stream being read.
        destination: Destination,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A tab was rendered for a root that has no information at this node.
    #[error("no result for root `{root_name}` at path `{path}`")]
    MissingRootInfo {
        /// The name of the root.
        root_name: String,
        /// The path of the node being rendered.
        path: TestPath,
    },

    /// The tree refers to a root for which no output reader was supplied.
    #[error("no output reader was supplied for root `{root_name}`")]
    MissingOutputReader {
        /// The name of the root.
        root_name: String,
    },
}

/// An error returned by a metadata value renderer.
///
/// These errors never escape a page render: the failing cell is replaced by a placeholder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetadataRenderError {
    /// The serialized value could not be decoded.
    #[error("failed to decode `{value_type}` value")]
    Decode {
        /// The declared value type.
        value_type: String,
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The decoded value was not acceptable to the renderer.
    #[error("invalid `{value_type}` value: {message}")]
    InvalidValue {
        /// The declared value type.
        value_type: String,
        /// A description of the problem.
        message: String,
    },

    /// No renderer is registered for the declared value type.
    #[error("no renderer registered for value type `{value_type}`")]
    UnknownType {
        /// The declared value type.
        value_type: String,
    },
}

impl MetadataRenderError {
    /// Creates a new `InvalidValue` error.
    pub fn invalid_value(value_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            value_type: value_type.into(),
            message: message.into(),
        }
    }
}

/// An error that occurred while reading a file-backed result store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultStoreReadError {
    /// The store directory does not exist.
    #[error("result store not found at `{path}`")]
    StoreNotFound {
        /// The directory that was looked up.
        path: Utf8PathBuf,
    },

    /// A file in the store could not be read.
    #[error("error reading `{path}`")]
    Read {
        /// The file being read.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The results document could not be deserialized.
    #[error("error deserializing `{path}`")]
    Deserialize {
        /// The file being read.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The results document has an unsupported format version.
    #[error(
        "`{path}` has format version {found}, but only version {supported} is supported"
    )]
    UnsupportedFormatVersion {
        /// The file being read.
        path: Utf8PathBuf,
        /// The version found in the file.
        found: u32,
        /// The version this crate supports.
        supported: u32,
    },
}

/// An error that occurred while writing a file-backed result store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultStoreWriteError {
    /// A directory could not be created.
    #[error("error creating directory `{path}`")]
    CreateDir {
        /// The directory.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A file could not be written.
    #[error("error writing `{path}`")]
    Write {
        /// The file.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The results document could not be serialized.
    #[error("error serializing results document")]
    Serialize(#[source] serde_json::Error),
}

/// An error that occurred while parsing the report config.
#[derive(Debug, Error)]
#[error("failed to parse testreport config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of [`ConfigParseError`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// The layered config sources could not be read or merged.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// The merged config could not be deserialized.
    #[error(transparent)]
    DeserializeError(Box<ConfigError>),
}

/// An error that occurred while generating a full report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportGenerateError {
    /// A directory could not be created.
    #[error("error creating directory `{path}`")]
    CreateDir {
        /// The directory.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A file could not be written.
    #[error("error writing `{path}`")]
    WriteFile {
        /// The file.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A page failed to render.
    #[error("error rendering page for `{path}`")]
    RenderPage {
        /// The path of the node whose page failed.
        path: TestPath,
        /// The underlying error.
        #[source]
        error: RenderError,
    },

    /// The rendering thread pool could not be created.
    #[error("error creating rendering thread pool")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}

/// Displays an error along with its chain of sources, one per line.
pub struct DisplayErrorChain<E>(E);

impl<E: std::error::Error> DisplayErrorChain<E> {
    /// Creates a new chain display.
    pub fn new(error: E) -> Self {
        Self(error)
    }
}

impl<E: std::error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(error) = source {
            write!(f, "\n  caused by: {error}")?;
            source = error.source();
        }
        Ok(())
    }
}
