//! Moodle backup generator – build the documents of a `.mbz` archive.
//!
//! This module provides:
//! - [`questions_xml`], [`quiz_xml`], [`module_xml`], [`backup_xml`] – the
//!   four cross-referencing documents of a quiz backup.
//! - [`stubs`] – empty manifests the restore process expects.
//! - [`archive`] – Package documents into (and read them back from) a `.mbz`.
//! - [`moodle_xml`] – The standalone Moodle XML question format.

pub mod archive;
pub mod backup_xml;
pub mod module_xml;
pub mod moodle_xml;
pub mod questions_xml;
pub mod quiz_xml;
pub mod stubs;
pub mod xml_writer;

use crate::error::Result;
use crate::ids::ExportIds;
use crate::model::{ExportMetadata, QuestionBank};

/// The generated documents of one export, before packaging.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    pub ids: ExportIds,
    pub questions: String,
    pub quiz: String,
    pub module: String,
    pub backup: String,
}

impl DocumentSet {
    /// Every archive entry as `(path, content)` in the order it is written.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let dir = self.ids.activity_dir();
        let mut entries = vec![
            ("moodle_backup.xml".to_string(), self.backup.clone()),
            ("questions.xml".to_string(), self.questions.clone()),
        ];
        for (path, root) in stubs::ROOT_STUBS {
            entries.push((path.to_string(), stubs::generate_empty(path, root)?));
        }
        entries.push((format!("{}/module.xml", dir), self.module.clone()));
        entries.push((format!("{}/quiz.xml", dir), self.quiz.clone()));
        entries.push((format!("{}/roles.xml", dir), stubs::generate_activity_roles()?));
        entries.push((format!("{}/grades.xml", dir), stubs::generate_activity_grades()?));
        Ok(entries)
    }
}

/// Validate `bank` and `meta`, then build all four documents.
///
/// Nothing is generated when validation fails; question errors name the
/// first offending question.
pub fn generate_documents(bank: &QuestionBank, meta: &ExportMetadata) -> Result<DocumentSet> {
    bank.validate()?;
    meta.validate()?;
    let ids = ExportIds::allocate(bank);

    let questions = questions_xml::generate_questions_xml(bank, meta, &ids)?;
    let quiz = quiz_xml::generate_quiz_xml(bank, meta, &ids)?;
    let module = module_xml::generate_module_xml(meta, &ids)?;
    let backup = backup_xml::generate_backup_xml(meta, &ids)?;

    tracing::debug!(
        questions_bytes = questions.len(),
        quiz_bytes = quiz.len(),
        module_bytes = module.len(),
        backup_bytes = backup.len(),
        "generated backup documents"
    );

    Ok(DocumentSet {
        ids,
        questions,
        quiz,
        module,
        backup,
    })
}
