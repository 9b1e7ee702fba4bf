//! Moodle quiz backup generator.
//!
//! This crate turns a [`QuestionBank`] of authored questions into a Moodle
//! course backup (`.mbz`) holding a quiz activity and its question bank, and
//! reads such files (or Moodle XML question files) back into a bank.
//!
//! The binary `mbzkit` drives it from JSON project files.

pub mod error;
pub mod generator;
pub mod ids;
pub mod model;
pub mod parser;
pub mod project;

pub use error::{Error, Result};
pub use generator::archive::{MbzArchive, export_mbz};
pub use generator::moodle_xml::generate_moodle_xml;
pub use generator::{DocumentSet, generate_documents};
pub use model::{ExportMetadata, Question, QuestionBank, QuestionKind, QuizSettings};
pub use parser::{import_path, import_str};
