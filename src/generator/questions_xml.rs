//! Generate the question bank document (`questions.xml`).
//!
//! Layout follows Moodle 4.5 backups: a `top` category plus the author's
//! category, which holds one `question_bank_entry` per question. Each entry
//! has a single `question_version` wrapping the `<question>` itself.

use super::xml_writer::{NULL, XmlDoc, flag, fraction};
use crate::error::Result;
use crate::ids::{ExportIds, QuestionIds, true_false_answers};
use crate::model::{ExportMetadata, Question, QuestionBank, QuestionKind};
use std::io;

/// Context level of a course in Moodle's `context` table.
const CONTEXT_COURSE: &str = "50";

pub fn generate_questions_xml(bank: &QuestionBank, meta: &ExportMetadata, ids: &ExportIds) -> Result<String> {
    let mut doc = XmlDoc::new("questions.xml")?;
    let now = meta.timestamp().to_string();
    doc.build(|d| {
        d.open("question_categories", &[])?;
        write_top_category(d, ids, &now)?;
        write_bank_category(d, bank, ids, &now)?;
        d.close("question_categories")
    })?;
    doc.finish()
}

fn write_category_header(
    d: &mut XmlDoc,
    ids: &ExportIds,
    name: &str,
    info: &str,
    stamp: &str,
    parent: u32,
    sortorder: u32,
) -> io::Result<()> {
    d.leaf("name", name)?;
    d.value("contextid", ids.context)?;
    d.leaf("contextlevel", CONTEXT_COURSE)?;
    d.value("contextinstanceid", ids.context)?;
    d.leaf("info", info)?;
    d.leaf("infoformat", "0")?;
    d.leaf("stamp", stamp)?;
    d.value("parent", parent)?;
    d.value("sortorder", sortorder)?;
    d.leaf("idnumber", NULL)
}

fn write_top_category(d: &mut XmlDoc, ids: &ExportIds, now: &str) -> io::Result<()> {
    let id = ids.top_category.to_string();
    d.open("question_category", &[("id", &id)])?;
    write_category_header(d, ids, "top", "", &format!("generated+{}+top", now), 0, 0)?;
    d.empty("question_bank_entries")?;
    d.close("question_category")
}

fn write_bank_category(d: &mut XmlDoc, bank: &QuestionBank, ids: &ExportIds, now: &str) -> io::Result<()> {
    let name = bank.category_name();
    let id = ids.category.to_string();
    d.open("question_category", &[("id", &id)])?;
    write_category_header(
        d,
        ids,
        name,
        &format!("The default category for questions shared in context '{}'.", name),
        &format!("generated+{}+default", now),
        ids.top_category,
        999,
    )?;
    d.open("question_bank_entries", &[])?;
    for (idx, (question, qids)) in bank.questions.iter().zip(&ids.questions).enumerate() {
        write_entry(d, question, qids, ids.category, idx, now)?;
    }
    d.close("question_bank_entries")?;
    d.close("question_category")
}

fn write_entry(
    d: &mut XmlDoc,
    question: &Question,
    qids: &QuestionIds,
    category: u32,
    idx: usize,
    now: &str,
) -> io::Result<()> {
    let entry_id = qids.entry.to_string();
    d.open("question_bank_entry", &[("id", &entry_id)])?;
    d.value("questioncategoryid", category)?;
    d.leaf("idnumber", NULL)?;
    d.leaf("ownerid", NULL)?;

    let version_id = qids.version.to_string();
    d.open("question_versions", &[])?;
    d.open("question_version", &[("id", &version_id)])?;
    d.leaf("version", "1")?;
    d.leaf("status", "ready")?;
    write_question(d, question, qids, idx, now)?;
    d.close("question_version")?;
    d.close("question_versions")?;

    d.close("question_bank_entry")
}

fn penalty(kind: &QuestionKind) -> &'static str {
    match kind {
        QuestionKind::TrueFalse { .. } => "1.0000000",
        QuestionKind::Essay => "0.0000000",
        _ => "0.3333333",
    }
}

fn write_question(d: &mut XmlDoc, q: &Question, qids: &QuestionIds, idx: usize, now: &str) -> io::Result<()> {
    let qtype = q.kind.qtype();
    let id = qids.question.to_string();
    d.open("question", &[("id", &id)])?;
    d.leaf("parent", "0")?;
    d.leaf("name", &q.name)?;
    d.leaf("questiontext", &q.text)?;
    d.leaf("questiontextformat", "1")?;
    d.leaf("generalfeedback", "")?;
    d.leaf("generalfeedbackformat", "1")?;
    d.leaf("defaultmark", &fraction(q.points))?;
    d.leaf("penalty", penalty(&q.kind))?;
    d.leaf("qtype", qtype)?;
    d.leaf("length", "1")?;
    d.leaf("stamp", &format!("generated+{}+{}+{}", now, qtype, idx))?;
    d.leaf("timecreated", now)?;
    d.leaf("timemodified", now)?;
    d.leaf("createdby", NULL)?;
    d.leaf("modifiedby", NULL)?;

    let plugin = format!("plugin_qtype_{}_question", qtype);
    d.open(&plugin, &[])?;
    match &q.kind {
        QuestionKind::MultipleChoice { options, correct } => {
            write_multichoice(d, options, correct, qids)?;
        }
        QuestionKind::TrueFalse { correct } => {
            write_truefalse(d, &q.kind, *correct, qids)?;
        }
        QuestionKind::ShortAnswer { answer } => {
            write_shortanswer(d, answer, qids)?;
        }
        QuestionKind::Essay => write_essay(d, qids)?,
    }
    d.close(&plugin)?;

    d.open("plugin_qbank_comment_question", &[])?;
    d.empty("comments")?;
    d.close("plugin_qbank_comment_question")?;
    d.open("plugin_qbank_customfields_question", &[])?;
    d.empty("customfields")?;
    d.close("plugin_qbank_customfields_question")?;
    d.open("plugin_outcomesupport_qtype_question", &[])?;
    d.empty("outcome_areas")?;
    d.close("plugin_outcomesupport_qtype_question")?;
    d.empty("question_hints")?;

    d.close("question")
}

fn write_answer(d: &mut XmlDoc, id: u32, text: &str, format: &str, frac: f64) -> io::Result<()> {
    let id = id.to_string();
    d.open("answer", &[("id", &id)])?;
    d.leaf("answertext", text)?;
    d.leaf("answerformat", format)?;
    d.leaf("fraction", &fraction(frac))?;
    d.leaf("feedback", "")?;
    d.leaf("feedbackformat", "1")?;
    d.close("answer")
}

/// Grade fraction of each correct option. With several correct options the
/// full mark is split evenly, which Moodle requires for multi-answer items.
pub fn correct_fraction(correct_count: usize) -> f64 {
    if correct_count <= 1 { 1.0 } else { 1.0 / correct_count as f64 }
}

fn write_multichoice(d: &mut XmlDoc, options: &[String], correct: &[usize], qids: &QuestionIds) -> io::Result<()> {
    let per_correct = correct_fraction(correct.len());
    d.open("answers", &[])?;
    for (pos, (text, answer_id)) in options.iter().zip(&qids.answers).enumerate() {
        let frac = if correct.contains(&(pos + 1)) { per_correct } else { 0.0 };
        write_answer(d, *answer_id, text, "1", frac)?;
    }
    d.close("answers")?;

    let id = qids.options.to_string();
    d.open("multichoice", &[("id", &id)])?;
    d.leaf("layout", "0")?;
    d.leaf("single", flag(correct.len() <= 1))?;
    d.leaf("shuffleanswers", "1")?;
    d.leaf("correctfeedback", "Your answer is correct.")?;
    d.leaf("correctfeedbackformat", "1")?;
    d.leaf("partiallycorrectfeedback", "Your answer is partially correct.")?;
    d.leaf("partiallycorrectfeedbackformat", "1")?;
    d.leaf("incorrectfeedback", "Your answer is incorrect.")?;
    d.leaf("incorrectfeedbackformat", "1")?;
    d.leaf("answernumbering", "abc")?;
    d.leaf("shownumcorrect", "0")?;
    d.leaf("showstandardinstruction", "0")?;
    d.close("multichoice")
}

fn write_truefalse(d: &mut XmlDoc, kind: &QuestionKind, correct: bool, qids: &QuestionIds) -> io::Result<()> {
    let (true_id, false_id) = true_false_answers(kind, qids).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "true/false question without two answer ids")
    })?;
    d.open("answers", &[])?;
    write_answer(d, true_id, "True", "0", if correct { 1.0 } else { 0.0 })?;
    write_answer(d, false_id, "False", "0", if correct { 0.0 } else { 1.0 })?;
    d.close("answers")?;

    let id = qids.options.to_string();
    d.open("truefalse", &[("id", &id)])?;
    d.value("trueanswer", true_id)?;
    d.value("falseanswer", false_id)?;
    d.leaf("showstandardinstruction", "0")?;
    d.close("truefalse")
}

fn write_shortanswer(d: &mut XmlDoc, answer: &str, qids: &QuestionIds) -> io::Result<()> {
    let answer_id = qids.answers.first().copied().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "short answer question without an answer id")
    })?;
    d.open("answers", &[])?;
    write_answer(d, answer_id, answer, "0", 1.0)?;
    d.close("answers")?;

    let id = qids.options.to_string();
    d.open("shortanswer", &[("id", &id)])?;
    d.leaf("usecase", "0")?;
    d.close("shortanswer")
}

fn write_essay(d: &mut XmlDoc, qids: &QuestionIds) -> io::Result<()> {
    let id = qids.options.to_string();
    d.open("essay", &[("id", &id)])?;
    d.leaf("responseformat", "editor")?;
    d.leaf("responserequired", "1")?;
    d.leaf("responsefieldlines", "15")?;
    d.leaf("minwordlimit", NULL)?;
    d.leaf("maxwordlimit", NULL)?;
    d.leaf("attachments", "0")?;
    d.leaf("attachmentsrequired", "0")?;
    d.leaf("graderinfo", "")?;
    d.leaf("graderinfoformat", "1")?;
    d.leaf("responsetemplate", "")?;
    d.leaf("responsetemplateformat", "1")?;
    d.leaf("maxbytes", "0")?;
    d.leaf("filetypeslist", NULL)?;
    d.close("essay")
}
