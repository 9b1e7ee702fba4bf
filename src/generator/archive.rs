//! MBZ archive reading and writing.
//!
//! An MBZ file is a ZIP archive with a fixed layout: the backup manifest and
//! the question bank at the root, and the quiz activity under
//! `activities/quiz_<module-id>/`. Entries are kept as raw bytes; the
//! importer parses the ones it needs.

use super::{DocumentSet, generate_documents};
use crate::error::{Error, Result};
use crate::model::{ExportMetadata, QuestionBank};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{BufWriter, Read, Seek, Write};
use zip::result::ZipResult;

/// Extension Moodle expects on backup files.
pub const MBZ_EXTENSION: &str = "mbz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MbzEntry {
    pub path: String,
    pub data: Vec<u8>,
}

/// In-memory `.mbz` archive: entries in the order they are (or were) stored.
#[derive(Debug, Clone, Default)]
pub struct MbzArchive {
    pub entries: Vec<MbzEntry>,
}

impl MbzArchive {
    /// Lay out a generated document set as archive entries.
    pub fn from_documents(documents: &DocumentSet) -> Result<Self> {
        let entries = documents
            .entries()?
            .into_iter()
            .map(|(path, content)| MbzEntry {
                path,
                data: content.into_bytes(),
            })
            .collect();
        Ok(Self { entries })
    }

    /// Read an archive from a reader (ZIP format).
    pub fn from_reader<R: Read + Seek>(reader: R, origin: &Utf8Path) -> Result<Self> {
        let archive_err = |source: zip::result::ZipError| Error::Archive {
            path: origin.to_path_buf(),
            source,
        };
        let mut zip = zip::ZipArchive::new(reader).map_err(archive_err)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).map_err(archive_err)?;
            if file.is_dir() {
                continue;
            }
            let path = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data).map_err(|e| Error::io(origin, e))?;
            entries.push(MbzEntry { path, data });
        }
        Ok(Self { entries })
    }

    /// Read an archive from disk.
    pub fn from_file(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
        Self::from_reader(std::io::BufReader::new(file), path)
    }

    fn write_zip<W: Write + Seek>(&self, writer: W) -> ZipResult<W> {
        let mut zip = zip::ZipWriter::new(writer);
        let options =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for entry in &self.entries {
            zip.start_file(entry.path.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }
        zip.finish()
    }

    /// Write the archive to a writer in ZIP format.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        self.write_zip(writer).map_err(|source| Error::Archive {
            path: Utf8PathBuf::from("<stream>"),
            source,
        })?;
        Ok(())
    }

    /// Write the archive to `path`.
    ///
    /// The data goes to a temporary file next to `path` first, which is
    /// renamed over `path` only once it is complete. On failure no file is
    /// left behind.
    pub fn write_to_file(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let tmp = tempfile::Builder::new()
            .prefix(".mbzkit-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| Error::io(dir, e))?;

        let buffered = self
            .write_zip(BufWriter::new(tmp.as_file()))
            .map_err(|source| Error::Archive {
                path: path.to_path_buf(),
                source,
            })?;
        buffered
            .into_inner()
            .map_err(|e| Error::io(path, e.into_error()))?
            .sync_all()
            .map_err(|e| Error::io(path, e))?;

        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
        Ok(())
    }

    pub fn entry(&self, path: &str) -> Option<&[u8]> {
        let wanted = path.trim_start_matches("./").trim_start_matches('/');
        self.entries
            .iter()
            .find(|e| e.path == wanted)
            .map(|e| e.data.as_slice())
    }

    /// Entry content as UTF-8 text.
    pub fn entry_str(&self, path: &str) -> Option<&str> {
        self.entry(path).and_then(|d| std::str::from_utf8(d).ok())
    }

    /// List all entry paths in the archive.
    pub fn entry_paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }
}

/// `path` with its extension forced to `.mbz`.
pub fn mbz_path(path: impl AsRef<Utf8Path>) -> Utf8PathBuf {
    let path = path.as_ref();
    if path.extension() == Some(MBZ_EXTENSION) {
        path.to_path_buf()
    } else {
        path.with_extension(MBZ_EXTENSION)
    }
}

/// Generate all documents for `bank` and save them as a `.mbz` archive.
///
/// Returns the path actually written (with the `.mbz` extension applied).
/// Validation happens before anything touches the filesystem.
pub fn export_mbz(bank: &QuestionBank, meta: &ExportMetadata, path: impl AsRef<Utf8Path>) -> Result<Utf8PathBuf> {
    let documents = generate_documents(bank, meta)?;
    let archive = MbzArchive::from_documents(&documents)?;
    let target = mbz_path(path);
    archive.write_to_file(&target)?;
    tracing::info!(
        path = %target,
        questions = bank.questions.len(),
        entries = archive.entries.len(),
        "wrote backup archive"
    );
    Ok(target)
}
