use anyhow::Result;
use mbzkit::model::{ExportMetadata, Question, QuestionBank, QuestionKind};
use mbzkit::{generate_documents, generate_moodle_xml, import_str};
use roxmltree::Document;

fn all_types_bank() -> QuestionBank {
    let mut bank = QuestionBank::new("Mixed bag");
    bank.push(Question::new(
        "Capitals",
        "<p>Which are <b>capitals</b>?</p>",
        2.0,
        QuestionKind::MultipleChoice {
            options: vec!["Paris".into(), "Lyon".into(), "Rome".into(), "Milan".into()],
            correct: vec![1, 3],
        },
    ))
    .push(Question::new(
        "Single pick",
        "2 + 2 = ?",
        1.0,
        QuestionKind::MultipleChoice {
            options: vec!["3".into(), "4".into(), "5".into()],
            correct: vec![2],
        },
    ))
    .push(Question::new(
        "Water is wet",
        "True or false?",
        0.5,
        QuestionKind::TrueFalse { correct: false },
    ))
    .push(Question::new(
        "Chemistry",
        "Symbol for gold?",
        1.5,
        QuestionKind::ShortAnswer { answer: "Au".into() },
    ))
    .push(Question::new(
        "Reflection",
        "Describe your week.",
        10.0,
        QuestionKind::Essay,
    ));
    bank
}

#[test]
fn backup_questions_xml_roundtrips_all_types() -> Result<()> {
    let bank = all_types_bank();
    let docs = generate_documents(&bank, &ExportMetadata::default())?;
    let imported = import_str(&docs.questions, "questions.xml")?;
    assert_eq!(imported, bank);
    Ok(())
}

#[test]
fn moodle_xml_roundtrips_all_types() -> Result<()> {
    let bank = all_types_bank();
    let xml = generate_moodle_xml(&bank)?;
    let imported = import_str(&xml, "bank.xml")?;
    assert_eq!(imported, bank);
    Ok(())
}

#[test]
fn one_question_element_per_record_in_order() -> Result<()> {
    let bank = all_types_bank();
    let docs = generate_documents(&bank, &ExportMetadata::default())?;
    let doc = Document::parse(&docs.questions)?;
    let names: Vec<&str> = doc
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name("question"))
        .map(|q| {
            q.children()
                .find(|c| c.has_tag_name("name"))
                .and_then(|n| n.text())
                .unwrap_or("")
        })
        .collect();
    let expected: Vec<&str> = bank.questions.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, expected);
    Ok(())
}

#[test]
fn special_characters_are_escaped_and_preserved() -> Result<()> {
    let mut bank = QuestionBank::new("Logic & <Sets>");
    bank.push(Question::new(
        "Escapes \"quoted\"",
        "A & B < C",
        1.0,
        QuestionKind::ShortAnswer {
            answer: "x > y & 'z'".into(),
        },
    ));
    let docs = generate_documents(&bank, &ExportMetadata::default())?;
    assert!(docs.questions.contains("A &amp; B &lt; C"));
    assert!(!docs.questions.contains("A & B < C"));
    Document::parse(&docs.questions)?;

    let imported = import_str(&docs.questions, "questions.xml")?;
    assert_eq!(imported, bank);

    let xml = generate_moodle_xml(&bank)?;
    assert_eq!(import_str(&xml, "bank.xml")?, bank);
    Ok(())
}

#[test]
fn multi_answer_fractions_split_the_mark() -> Result<()> {
    let bank = all_types_bank();
    let docs = generate_documents(&bank, &ExportMetadata::default())?;
    let doc = Document::parse(&docs.questions)?;
    let fractions: Vec<&str> = doc
        .descendants()
        .find(|n| n.has_tag_name("plugin_qtype_multichoice_question"))
        .expect("multichoice payload")
        .descendants()
        .filter(|n| n.has_tag_name("fraction"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(fractions, vec!["0.5000000", "0.0000000", "0.5000000", "0.0000000"]);

    let single = doc
        .descendants()
        .filter(|n| n.has_tag_name("single"))
        .filter_map(|n| n.text())
        .collect::<Vec<_>>();
    assert_eq!(single, vec!["0", "1"]);
    Ok(())
}

#[test]
fn essay_has_no_answers() -> Result<()> {
    let mut bank = QuestionBank::new("Essays");
    bank.push(Question::new("E1", "Write", 3.0, QuestionKind::Essay));
    let docs = generate_documents(&bank, &ExportMetadata::default())?;
    let doc = Document::parse(&docs.questions)?;
    let payload = doc
        .descendants()
        .find(|n| n.has_tag_name("plugin_qtype_essay_question"))
        .expect("essay payload");
    assert!(!payload.descendants().any(|n| n.has_tag_name("answer")));
    assert!(payload.descendants().any(|n| n.has_tag_name("responseformat")));
    Ok(())
}

#[test]
fn unknown_question_types_are_skipped() -> Result<()> {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<quiz>
  <question type="category"><category><text>$course$/Imported</text></category></question>
  <question type="cloze">
    <name><text>Gap fill</text></name>
    <questiontext format="html"><text>{1:SHORTANSWER:=x}</text></questiontext>
  </question>
  <question type="truefalse">
    <name><text>TF</text></name>
    <questiontext format="html"><text>Yes?</text></questiontext>
    <defaultgrade>2</defaultgrade>
    <answer fraction="100"><text>true</text></answer>
    <answer fraction="0"><text>false</text></answer>
  </question>
</quiz>
"#;
    let bank = import_str(xml, "mixed.xml")?;
    assert_eq!(bank.category, "Imported");
    assert_eq!(bank.questions.len(), 1);
    assert_eq!(bank.questions[0].name, "TF");
    assert_eq!(bank.questions[0].points, 2.0);
    assert_eq!(bank.questions[0].kind, QuestionKind::TrueFalse { correct: true });
    Ok(())
}

#[test]
fn unexpected_root_is_rejected() {
    let err = import_str("<course/>", "course.xml").unwrap_err();
    assert!(err.to_string().contains("course"));
    assert!(import_str("<quiz>", "broken.xml").is_err());
}

#[test]
fn windows_line_endings_roundtrip() -> Result<()> {
    let mut bank = QuestionBank::new("Pasted");
    bank.push(Question::new(
        "From a form",
        "line1\r\nline2",
        1.0,
        QuestionKind::MultipleChoice {
            options: vec!["a\r\nb".into(), "c".into()],
            correct: vec![1],
        },
    ))
    .push(Question::new("Essay", "first\rsecond", 1.0, QuestionKind::Essay));

    let docs = generate_documents(&bank, &ExportMetadata::default())?;
    assert_eq!(import_str(&docs.questions, "questions.xml")?, bank);

    let xml = generate_moodle_xml(&bank)?;
    assert_eq!(import_str(&xml, "bank.xml")?, bank);
    Ok(())
}
