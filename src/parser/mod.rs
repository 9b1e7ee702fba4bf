//! Moodle question importer.
//!
//! Reads questions back into a [`QuestionBank`] from any of:
//!
//! - [`backup`] – a backup `questions.xml` (`<question_categories>` root),
//!   either standalone or inside a `.mbz` archive
//! - [`moodle_xml`] – a Moodle XML question file (`<quiz>` root)
//!
//! Only the four supported plain-text question types are reconstructed;
//! other types are skipped with a warning.

pub mod backup;
pub mod helpers;
pub mod moodle_xml;

use crate::error::{Error, Result};
use crate::generator::archive::MbzArchive;
use crate::model::QuestionBank;
use camino::Utf8Path;
use roxmltree::Document;

/// Local file header signature of a ZIP archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Parse XML text. `origin` names the source in error messages.
pub fn import_str(text: &str, origin: &str) -> Result<QuestionBank> {
    let doc = Document::parse(text).map_err(|source| Error::Xml {
        origin: origin.to_string(),
        source,
    })?;
    let root = doc.root_element();
    let bank = match root.tag_name().name() {
        "question_categories" => backup::parse_question_categories(root, origin)?,
        "quiz" => moodle_xml::parse_quiz(root, origin)?,
        other => {
            return Err(Error::import(
                origin,
                format!("unexpected root element <{}>; expected <question_categories> or <quiz>", other),
            ));
        }
    };
    tracing::info!(
        origin,
        category = %bank.category,
        questions = bank.questions.len(),
        "imported question bank"
    );
    Ok(bank)
}

/// Import the question bank stored in an archive's `questions.xml`.
pub fn import_archive(archive: &MbzArchive, origin: &str) -> Result<QuestionBank> {
    let text = archive
        .entry_str("questions.xml")
        .ok_or_else(|| Error::import(origin, "archive has no UTF-8 questions.xml at its root"))?;
    import_str(text, &format!("{}:questions.xml", origin))
}

/// Import a `.mbz` archive, a backup `questions.xml`, or a Moodle XML file.
/// The format is detected from the content, not the extension.
pub fn import_path(path: impl AsRef<Utf8Path>) -> Result<QuestionBank> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    if bytes.starts_with(ZIP_MAGIC) {
        let archive = MbzArchive::from_reader(std::io::Cursor::new(bytes), path)?;
        return import_archive(&archive, path.as_str());
    }
    let text = String::from_utf8(bytes).map_err(|_| Error::import(path.as_str(), "file is not valid UTF-8"))?;
    import_str(&text, path.as_str())
}
