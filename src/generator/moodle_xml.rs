//! Generate a Moodle XML question file (`<quiz>` root).
//!
//! This is the plain question-import format accepted by Moodle's question
//! bank "Import" page, independent of course backups.

use super::questions_xml::correct_fraction;
use super::xml_writer::{XmlDoc, fraction};
use crate::error::Result;
use crate::model::{Question, QuestionBank, QuestionKind};
use std::io;

/// Prefix Moodle uses for course-level category paths.
pub const COURSE_CATEGORY_PREFIX: &str = "$course$/";

pub fn generate_moodle_xml(bank: &QuestionBank) -> Result<String> {
    bank.validate()?;
    let mut doc = XmlDoc::new("moodle xml")?;
    doc.build(|d| {
        d.open("quiz", &[])?;
        if !bank.category.trim().is_empty() {
            d.open("question", &[("type", "category")])?;
            d.open("category", &[])?;
            d.leaf("text", &format!("{}{}", COURSE_CATEGORY_PREFIX, bank.category.trim()))?;
            d.close("category")?;
            d.close("question")?;
        }
        for q in &bank.questions {
            write_question(d, q)?;
        }
        d.close("quiz")
    })?;
    doc.finish()
}

/// Percentage string for an `answer fraction` attribute.
fn percent(value: f64) -> String {
    let pct = value * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{}", pct.round() as i64)
    } else {
        format!("{:.5}", pct)
    }
}

fn text_block(d: &mut XmlDoc, tag: &str, attrs: &[(&str, &str)], text: &str) -> io::Result<()> {
    d.open(tag, attrs)?;
    d.leaf("text", text)?;
    d.close(tag)
}

fn write_answer(d: &mut XmlDoc, frac: f64, text: &str) -> io::Result<()> {
    let pct = percent(frac);
    d.open("answer", &[("fraction", &pct), ("format", "html")])?;
    d.leaf("text", text)?;
    text_block(d, "feedback", &[("format", "html")], "")?;
    d.close("answer")
}

fn write_question(d: &mut XmlDoc, q: &Question) -> io::Result<()> {
    d.open("question", &[("type", q.kind.qtype())])?;
    text_block(d, "name", &[], &q.name)?;
    text_block(d, "questiontext", &[("format", "html")], &q.text)?;
    text_block(d, "generalfeedback", &[("format", "html")], "")?;
    d.leaf("defaultgrade", &fraction(q.points))?;
    d.leaf("hidden", "0")?;

    match &q.kind {
        QuestionKind::MultipleChoice { options, correct } => {
            let per_correct = correct_fraction(correct.len());
            d.leaf("single", if correct.len() <= 1 { "true" } else { "false" })?;
            d.leaf("shuffleanswers", "true")?;
            d.leaf("answernumbering", "abc")?;
            for (pos, option) in options.iter().enumerate() {
                let frac = if correct.contains(&(pos + 1)) { per_correct } else { 0.0 };
                write_answer(d, frac, option)?;
            }
        }
        QuestionKind::TrueFalse { correct } => {
            write_answer(d, if *correct { 1.0 } else { 0.0 }, "true")?;
            write_answer(d, if *correct { 0.0 } else { 1.0 }, "false")?;
        }
        QuestionKind::ShortAnswer { answer } => {
            d.leaf("usecase", "0")?;
            write_answer(d, 1.0, answer)?;
        }
        QuestionKind::Essay => {
            d.leaf("responseformat", "editor")?;
            d.leaf("responserequired", "1")?;
            d.leaf("responsefieldlines", "15")?;
            d.leaf("attachments", "0")?;
            d.leaf("attachmentsrequired", "0")?;
        }
    }
    d.close("question")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages() {
        assert_eq!(percent(1.0), "100");
        assert_eq!(percent(0.0), "0");
        assert_eq!(percent(0.5), "50");
        assert_eq!(percent(1.0 / 3.0), "33.33333");
    }
}
