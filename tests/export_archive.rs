use anyhow::Result;
use camino::Utf8PathBuf;
use mbzkit::model::{ExportMetadata, Question, QuestionBank, QuestionKind};
use mbzkit::{Error, MbzArchive, export_mbz, import_path};
use roxmltree::Document;

fn sample_bank() -> QuestionBank {
    let mut bank = QuestionBank::new("Geography");
    bank.push(Question::new(
        "Q1",
        "What is the capital of France?",
        1.0,
        QuestionKind::MultipleChoice {
            options: vec!["Paris".into(), "London".into()],
            correct: vec![1],
        },
    ))
    .push(Question::new(
        "Q2",
        "The sky is blue.",
        1.0,
        QuestionKind::TrueFalse { correct: true },
    ));
    bank
}

fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir")
}

#[test]
fn export_then_import_reconstructs_both_records() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = utf8_dir(&dir).join("bank.mbz");
    let bank = sample_bank();

    let written = export_mbz(&bank, &ExportMetadata::default(), &out)?;
    assert_eq!(written, out);

    let archive = MbzArchive::from_file(&out)?;
    let questions_xml = archive.entry_str("questions.xml").expect("questions.xml present");
    let doc = Document::parse(questions_xml)?;
    let count = doc
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name("question"))
        .count();
    assert_eq!(count, 2);

    let imported = import_path(&out)?;
    assert_eq!(imported, bank);
    Ok(())
}

#[test]
fn archive_uses_moodle_layout() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = utf8_dir(&dir).join("quiz.mbz");
    export_mbz(&sample_bank(), &ExportMetadata::default(), &out)?;

    let archive = MbzArchive::from_file(&out)?;
    let paths = archive.entry_paths();
    for expected in [
        "moodle_backup.xml",
        "questions.xml",
        "roles.xml",
        "users.xml",
        "files.xml",
        "activities/quiz_1/module.xml",
        "activities/quiz_1/quiz.xml",
        "activities/quiz_1/roles.xml",
        "activities/quiz_1/grades.xml",
    ] {
        assert!(paths.contains(&expected), "missing {} in {:?}", expected, paths);
    }
    assert_eq!(paths[0], "moodle_backup.xml");

    for entry in &archive.entries {
        let text = std::str::from_utf8(&entry.data)?;
        Document::parse(text).map_err(|e| anyhow::anyhow!("{} is malformed: {}", entry.path, e))?;
    }
    Ok(())
}

#[test]
fn output_extension_is_forced_to_mbz() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = utf8_dir(&dir).join("bank.zip");
    let written = export_mbz(&sample_bank(), &ExportMetadata::default(), &out)?;
    assert_eq!(written.extension(), Some("mbz"));
    assert!(written.exists());
    assert!(!out.exists());
    Ok(())
}

#[test]
fn invalid_bank_writes_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = utf8_dir(&dir);
    let out = root.join("bank.mbz");

    let mut bank = QuestionBank::new("Geography");
    bank.push(Question::new(
        "Broken",
        "Pick one",
        1.0,
        QuestionKind::MultipleChoice {
            options: vec!["a".into(), "b".into(), "c".into()],
            correct: vec![5],
        },
    ));

    let err = export_mbz(&bank, &ExportMetadata::default(), &out).unwrap_err();
    match &err {
        Error::Validation { question, .. } => assert_eq!(question, "Broken"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(err.to_string().contains("Broken"));
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(&root)?.count(), 0, "no temp files left behind");
    Ok(())
}

#[test]
fn unwritable_destination_is_an_io_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = utf8_dir(&dir).join("missing").join("bank.mbz");
    let err = export_mbz(&sample_bank(), &ExportMetadata::default(), &out).unwrap_err();
    match err {
        Error::Io { path, .. } => assert!(path.as_str().contains("missing")),
        other => panic!("expected I/O error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn repeated_exports_are_identical() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = utf8_dir(&dir);
    let meta = ExportMetadata::default();
    let a = export_mbz(&sample_bank(), &meta, root.join("a.mbz"))?;
    let b = export_mbz(&sample_bank(), &meta, root.join("b.mbz"))?;
    let a = MbzArchive::from_file(&a)?;
    let b = MbzArchive::from_file(&b)?;
    assert_eq!(a.entries, b.entries);
    Ok(())
}
