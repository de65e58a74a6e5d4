// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed result stores.
//!
//! A store is a directory laid out as:
//!
//! ```text
//! <dir>/results.json          a ResultStoreDocument
//! <dir>/output/<id>.stdout    captured standard output
//! <dir>/output/<id>.stderr    captured standard error
//! ```
//!
//! Missing or empty output files mean that nothing was captured.

use crate::{
    errors::{ResultStoreReadError, ResultStoreWriteError},
    output::OutputReader,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
};
use testreport_metadata::{Destination, OutputId, ResultStoreDocument, TestResultRecord};
use tracing::debug;

/// The name of the results document within a store.
pub const RESULTS_FILE_NAME: &str = "results.json";

/// The name of the captured-output directory within a store.
pub const OUTPUT_DIR_NAME: &str = "output";

/// A result store read from disk.
#[derive(Clone, Debug)]
pub struct FileResultStore {
    dir: Utf8PathBuf,
    document: ResultStoreDocument,
}

impl FileResultStore {
    /// Opens the store at `dir` and reads its results document.
    pub fn open(dir: &Utf8Path) -> Result<Self, ResultStoreReadError> {
        if !dir.is_dir() {
            return Err(ResultStoreReadError::StoreNotFound {
                path: dir.to_owned(),
            });
        }

        let results_path = dir.join(RESULTS_FILE_NAME);
        let contents =
            fs::read_to_string(&results_path).map_err(|error| ResultStoreReadError::Read {
                path: results_path.clone(),
                error,
            })?;
        let document = ResultStoreDocument::from_json(&contents).map_err(|error| {
            ResultStoreReadError::Deserialize {
                path: results_path.clone(),
                error,
            }
        })?;
        if document.format_version != ResultStoreDocument::FORMAT_VERSION {
            return Err(ResultStoreReadError::UnsupportedFormatVersion {
                path: results_path,
                found: document.format_version,
                supported: ResultStoreDocument::FORMAT_VERSION,
            });
        }

        debug!(
            %dir,
            records = document.records.len(),
            "opened result store"
        );
        Ok(Self {
            dir: dir.to_owned(),
            document,
        })
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the display name recorded by the producer, if any.
    pub fn root_display_name(&self) -> Option<&str> {
        self.document.root_display_name.as_deref()
    }

    /// Returns the records in the store.
    pub fn records(&self) -> &[TestResultRecord] {
        &self.document.records
    }

    /// Returns a reader for the store's captured output.
    pub fn output_reader(&self) -> FileOutputReader {
        FileOutputReader::new(self.dir.join(OUTPUT_DIR_NAME))
    }

    /// Consumes the store, returning its document.
    pub fn into_document(self) -> ResultStoreDocument {
        self.document
    }
}

/// An [`OutputReader`] backed by one file per output identifier and destination.
#[derive(Clone, Debug)]
pub struct FileOutputReader {
    output_dir: Utf8PathBuf,
}

impl FileOutputReader {
    /// Creates a reader for the files in `output_dir`.
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the file holding output for an identifier and destination.
    pub fn output_path(&self, output_id: OutputId, destination: Destination) -> Utf8PathBuf {
        self.output_dir.join(output_file_name(output_id, destination))
    }
}

impl OutputReader for FileOutputReader {
    fn has_output(&self, output_id: OutputId, destination: Destination) -> bool {
        fs::metadata(self.output_path(output_id, destination))
            .is_ok_and(|metadata| metadata.is_file() && metadata.len() > 0)
    }

    fn get_output(
        &self,
        output_id: OutputId,
        destination: Destination,
    ) -> io::Result<Box<dyn BufRead + '_>> {
        match File::open(self.output_path(output_id, destination)) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Box::new(io::empty())),
            Err(error) => Err(error),
        }
    }
}

fn output_file_name(output_id: OutputId, destination: Destination) -> String {
    format!("{output_id}.{}", destination.as_str())
}

/// Writes a result store to disk.
#[derive(Clone, Debug)]
pub struct ResultStoreWriter {
    dir: Utf8PathBuf,
}

impl ResultStoreWriter {
    /// Creates the store directory and its output directory if they don't exist.
    pub fn create(dir: impl Into<Utf8PathBuf>) -> Result<Self, ResultStoreWriteError> {
        let dir = dir.into();
        let output_dir = dir.join(OUTPUT_DIR_NAME);
        fs::create_dir_all(&output_dir).map_err(|error| ResultStoreWriteError::CreateDir {
            path: output_dir,
            error,
        })?;
        Ok(Self { dir })
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Writes captured output for an identifier and destination.
    pub fn write_output(
        &self,
        output_id: OutputId,
        destination: Destination,
        contents: impl AsRef<[u8]>,
    ) -> Result<(), ResultStoreWriteError> {
        let path = self
            .dir
            .join(OUTPUT_DIR_NAME)
            .join(output_file_name(output_id, destination));
        fs::write(&path, contents).map_err(|error| ResultStoreWriteError::Write { path, error })
    }

    /// Writes the results document, replacing any existing one.
    pub fn write_document(
        &self,
        document: &ResultStoreDocument,
    ) -> Result<(), ResultStoreWriteError> {
        let json = document
            .to_json_pretty()
            .map_err(ResultStoreWriteError::Serialize)?;
        let path = self.dir.join(RESULTS_FILE_NAME);
        fs::write(&path, json).map_err(|error| ResultStoreWriteError::Write { path, error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use std::{io::Read, time::Duration};
    use testreport_metadata::{ResultType, TestPath};

    #[test]
    fn write_then_open() {
        let temp = Utf8TempDir::new().unwrap();
        let dir = temp.path().join("store");

        let writer = ResultStoreWriter::create(dir.clone()).unwrap();
        let mut document = ResultStoreDocument::new(vec![
            TestResultRecord::new(
                TestPath::parse("suite/a").unwrap(),
                ResultType::Success,
                Duration::from_millis(12),
            )
            .with_output_id(OutputId(3)),
        ]);
        document.root_display_name = Some("Unit tests".to_owned());
        writer.write_document(&document).unwrap();
        writer
            .write_output(OutputId(3), Destination::StdOut, "captured\n")
            .unwrap();
        writer
            .write_output(OutputId(3), Destination::StdErr, "")
            .unwrap();

        let store = FileResultStore::open(&dir).unwrap();
        assert_eq!(store.root_display_name(), Some("Unit tests"));
        assert_eq!(store.records(), &document.records[..]);

        let reader = store.output_reader();
        assert!(reader.has_output(OutputId(3), Destination::StdOut));
        assert!(!reader.has_output(OutputId(3), Destination::StdErr), "empty file");
        assert!(!reader.has_output(OutputId(4), Destination::StdOut), "missing file");

        let mut contents = String::new();
        reader
            .get_output(OutputId(3), Destination::StdOut)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "captured\n");

        contents.clear();
        reader
            .get_output(OutputId(4), Destination::StdErr)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "");
    }

    #[test]
    fn open_errors() {
        let temp = Utf8TempDir::new().unwrap();

        let missing = temp.path().join("missing");
        assert!(matches!(
            FileResultStore::open(&missing),
            Err(ResultStoreReadError::StoreNotFound { .. })
        ));

        assert!(matches!(
            FileResultStore::open(temp.path()),
            Err(ResultStoreReadError::Read { .. })
        ));

        fs::write(temp.path().join(RESULTS_FILE_NAME), "{not json").unwrap();
        assert!(matches!(
            FileResultStore::open(temp.path()),
            Err(ResultStoreReadError::Deserialize { .. })
        ));

        fs::write(
            temp.path().join(RESULTS_FILE_NAME),
            indoc! {r#"
                {
                    "format-version": 2,
                    "records": []
                }
            "#},
        )
        .unwrap();
        assert!(matches!(
            FileResultStore::open(temp.path()),
            Err(ResultStoreReadError::UnsupportedFormatVersion {
                found: 2,
                supported: 1,
                ..
            })
        ));
    }
}
