//! Read the question bank document of a Moodle backup (`questions.xml`).

use super::helpers::{child, children, descend, is_credit, parse_decimal, text_at};
use crate::error::{Error, Result};
use crate::model::{Question, QuestionBank, QuestionKind};
use roxmltree::Node;

/// One `<answer>` row of a `plugin_qtype_*` payload.
struct AnswerRow<'a> {
    id: Option<&'a str>,
    text: &'a str,
    fraction: Option<f64>,
}

/// Parse a `question_categories` root into a bank.
///
/// Questions are collected from every category in document order. The bank
/// takes its category name from the first category that holds questions,
/// falling back to the first category that is not Moodle's implicit `top`.
pub fn parse_question_categories(root: Node, origin: &str) -> Result<QuestionBank> {
    let mut bank = QuestionBank::default();
    let mut fallback_category = None;

    for category in children(root, "question_category") {
        let name = text_at(category, &["name"]);
        if fallback_category.is_none() && name != "top" {
            fallback_category = Some(name.to_string());
        }
        let Some(entries) = child(category, "question_bank_entries") else {
            continue;
        };
        let before = bank.questions.len();
        for entry in children(entries, "question_bank_entry") {
            if let Some(question_node) = latest_version(entry) {
                if let Some(q) = parse_question(question_node, origin)? {
                    bank.questions.push(q);
                }
            }
        }
        if bank.questions.len() > before && bank.category.is_empty() {
            bank.category = name.to_string();
        }
    }

    if bank.category.is_empty() {
        bank.category = fallback_category.unwrap_or_default();
    }
    Ok(bank)
}

/// `<question>` of the highest `question_version` of an entry.
fn latest_version<'a, 'input>(entry: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    let versions = child(entry, "question_versions")?;
    children(versions, "question_version")
        .filter_map(|v| {
            let number = text_at(v, &["version"]).trim().parse::<u32>().unwrap_or(0);
            child(v, "question").map(|q| (number, q))
        })
        .max_by_key(|(number, _)| *number)
        .map(|(_, q)| q)
}

fn answer_rows<'a>(plugin: Option<Node<'a, '_>>, origin: &str) -> Result<Vec<AnswerRow<'a>>> {
    let Some(answers) = plugin.and_then(|p| child(p, "answers")) else {
        return Ok(Vec::new());
    };
    children(answers, "answer")
        .map(|a| -> Result<AnswerRow<'a>> {
            Ok(AnswerRow {
                id: a.attribute("id"),
                text: text_at(a, &["answertext"]),
                fraction: parse_decimal(descend(a, &["fraction"]).and_then(|n| n.text()), "answer fraction", origin)?,
            })
        })
        .collect()
}

/// Parse one `<question>`. Unsupported question types yield `Ok(None)`.
pub fn parse_question(node: Node, origin: &str) -> Result<Option<Question>> {
    let name = text_at(node, &["name"]);
    if name.is_empty() {
        return Err(Error::import(origin, "question without a name"));
    }
    let qtype = text_at(node, &["qtype"]).trim();
    let points = parse_decimal(descend(node, &["defaultmark"]).and_then(|n| n.text()), "defaultmark", origin)?
        .unwrap_or(1.0);
    let plugin = child(node, &format!("plugin_qtype_{}_question", qtype));
    let answers = answer_rows(plugin, origin)?;

    let kind = match qtype {
        "multichoice" => QuestionKind::MultipleChoice {
            options: answers.iter().map(|a| a.text.to_string()).collect(),
            correct: answers
                .iter()
                .enumerate()
                .filter(|(_, a)| is_credit(a.fraction))
                .map(|(i, _)| i + 1)
                .collect(),
        },
        "truefalse" => {
            let true_id = plugin
                .and_then(|p| descend(p, &["truefalse", "trueanswer"]))
                .and_then(|n| n.text())
                .map(str::trim);
            let true_row = answers
                .iter()
                .find(|a| true_id.is_some() && a.id == true_id)
                .or_else(|| answers.iter().find(|a| a.text.eq_ignore_ascii_case("true")))
                .ok_or_else(|| Error::import(origin, format!("true/false question {:?} has no True answer", name)))?;
            QuestionKind::TrueFalse {
                correct: is_credit(true_row.fraction),
            }
        }
        "shortanswer" => {
            let best = answers
                .iter()
                .filter(|a| is_credit(a.fraction))
                .max_by(|x, y| x.fraction.partial_cmp(&y.fraction).unwrap_or(std::cmp::Ordering::Equal))
                .or(answers.first())
                .ok_or_else(|| Error::import(origin, format!("short answer question {:?} has no answer", name)))?;
            QuestionKind::ShortAnswer {
                answer: best.text.to_string(),
            }
        }
        "essay" => QuestionKind::Essay,
        other => {
            tracing::warn!(question = name, qtype = other, "skipping unsupported question type");
            return Ok(None);
        }
    };

    Ok(Some(Question {
        name: name.to_string(),
        text: text_at(node, &["questiontext"]).to_string(),
        points,
        kind,
    }))
}
