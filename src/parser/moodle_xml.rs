//! Read a Moodle XML question file (`<quiz>` root).

use super::helpers::{children, is_credit, parse_decimal, text_at};
use crate::error::{Error, Result};
use crate::generator::moodle_xml::COURSE_CATEGORY_PREFIX;
use crate::model::{Question, QuestionBank, QuestionKind};
use roxmltree::Node;

pub fn parse_quiz(root: Node, origin: &str) -> Result<QuestionBank> {
    let mut bank = QuestionBank::default();

    for node in children(root, "question") {
        let qtype = node.attribute("type").unwrap_or("");
        if qtype == "category" {
            // Only the first category is kept; the bank holds a single one.
            if bank.category.is_empty() {
                let path = text_at(node, &["category", "text"]).trim();
                bank.category = path.strip_prefix(COURSE_CATEGORY_PREFIX).unwrap_or(path).to_string();
            }
            continue;
        }

        let name = text_at(node, &["name", "text"]);
        if name.is_empty() {
            return Err(Error::import(origin, "question without a name"));
        }
        let points = parse_decimal(
            node.children()
                .find(|c| c.has_tag_name("defaultgrade"))
                .and_then(|n| n.text()),
            "defaultgrade",
            origin,
        )?
        .unwrap_or(1.0);

        let mut answers = Vec::new();
        for a in children(node, "answer") {
            let fraction = parse_decimal(a.attribute("fraction"), "answer fraction", origin)?;
            answers.push((text_at(a, &["text"]), fraction));
        }

        let kind = match qtype {
            "multichoice" => QuestionKind::MultipleChoice {
                options: answers.iter().map(|(text, _)| text.to_string()).collect(),
                correct: answers
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, fraction))| is_credit(*fraction))
                    .map(|(i, _)| i + 1)
                    .collect(),
            },
            "truefalse" => {
                let correct = answers
                    .iter()
                    .find(|(_, fraction)| is_credit(*fraction))
                    .map(|(text, _)| text.trim().eq_ignore_ascii_case("true"))
                    .ok_or_else(|| {
                        Error::import(origin, format!("true/false question {:?} has no correct answer", name))
                    })?;
                QuestionKind::TrueFalse { correct }
            }
            "shortanswer" => {
                let answer = answers
                    .iter()
                    .find(|(_, fraction)| is_credit(*fraction))
                    .or(answers.first())
                    .map(|(text, _)| text.to_string())
                    .ok_or_else(|| Error::import(origin, format!("short answer question {:?} has no answer", name)))?;
                QuestionKind::ShortAnswer { answer }
            }
            "essay" => QuestionKind::Essay,
            other => {
                tracing::warn!(question = name, qtype = other, "skipping unsupported question type");
                continue;
            }
        };

        bank.questions.push(Question {
            name: name.to_string(),
            text: text_at(node, &["questiontext", "text"]).to_string(),
            points,
            kind,
        });
    }

    Ok(bank)
}
