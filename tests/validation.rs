use mbzkit::model::{ExportMetadata, Question, QuestionBank, QuestionKind};
use mbzkit::{Error, generate_documents, generate_moodle_xml};

fn mc(name: &str, options: &[&str], correct: Vec<usize>) -> Question {
    Question::new(
        name,
        "Pick",
        1.0,
        QuestionKind::MultipleChoice {
            options: options.iter().map(|s| s.to_string()).collect(),
            correct,
        },
    )
}

fn rejected(question: Question) -> (String, String) {
    let mut bank = QuestionBank::new("Checks");
    bank.push(question);
    match generate_documents(&bank, &ExportMetadata::default()) {
        Err(Error::Validation { question, reason }) => (question, reason),
        Err(other) => panic!("expected validation error, got {:?}", other),
        Ok(_) => panic!("expected validation error, got documents"),
    }
}

#[test]
fn out_of_range_correct_index_names_the_record() {
    let (question, reason) = rejected(mc("Q5", &["a", "b", "c"], vec![5]));
    assert_eq!(question, "Q5");
    assert!(reason.contains("out of range"), "{}", reason);
}

#[test]
fn multiple_choice_invariants() {
    assert!(rejected(mc("zero", &["a", "b"], vec![0])).1.contains("out of range"));
    assert!(rejected(mc("dup", &["a", "b"], vec![1, 1])).1.contains("twice"));
    assert!(rejected(mc("none", &["a", "b"], vec![])).1.contains("no correct"));
    assert!(rejected(mc("one", &["a"], vec![1])).1.contains("at least 2"));
    assert!(rejected(mc("blank", &["a", " "], vec![1])).1.contains("option 2"));
}

#[test]
fn points_must_be_positive() {
    for points in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let q = Question::new("P", "t", points, QuestionKind::Essay);
        let (question, reason) = rejected(q);
        assert_eq!(question, "P");
        assert!(reason.contains("points"));
    }
}

#[test]
fn empty_name_and_missing_short_answer() {
    let (_, reason) = rejected(Question::new("  ", "t", 1.0, QuestionKind::Essay));
    assert!(reason.contains("name"));
    let (question, reason) = rejected(Question::new(
        "SA",
        "t",
        1.0,
        QuestionKind::ShortAnswer { answer: String::new() },
    ));
    assert_eq!(question, "SA");
    assert!(reason.contains("expected answer"));
}

#[test]
fn duplicate_names_are_rejected() {
    let mut bank = QuestionBank::new("Dups");
    bank.push(Question::new("Same", "a", 1.0, QuestionKind::Essay))
        .push(Question::new("Same", "b", 1.0, QuestionKind::TrueFalse { correct: true }));
    let err = generate_moodle_xml(&bank).unwrap_err();
    match err {
        Error::Validation { question, reason } => {
            assert_eq!(question, "Same");
            assert!(reason.contains("same name"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn empty_category_uses_default_name() {
    let mut bank = QuestionBank::new("");
    bank.push(Question::new("Only", "t", 1.0, QuestionKind::Essay));
    let docs = generate_documents(&bank, &ExportMetadata::default()).expect("valid bank");
    assert!(docs.questions.contains(mbzkit::model::DEFAULT_CATEGORY));
}

#[test]
fn control_characters_are_rejected_per_field() {
    let (question, reason) = rejected(Question::new("Bell", "bell\u{7}here", 1.0, QuestionKind::Essay));
    assert_eq!(question, "Bell");
    assert!(reason.contains("text") && reason.contains("U+0007"), "{}", reason);

    let (_, reason) = rejected(mc("Opts", &["fine", "nul\u{0}"], vec![1]));
    assert!(reason.contains("option 2"), "{}", reason);

    let (_, reason) = rejected(Question::new(
        "SA",
        "t",
        1.0,
        QuestionKind::ShortAnswer { answer: "esc\u{1b}".into() },
    ));
    assert!(reason.contains("answer"), "{}", reason);

    // Tabs, newlines and carriage returns are legal XML.
    let mut bank = QuestionBank::new("Checks");
    bank.push(Question::new("Ok", "a\tb\r\nc", 1.0, QuestionKind::Essay));
    assert!(generate_documents(&bank, &ExportMetadata::default()).is_ok());
}

#[test]
fn control_characters_in_category_are_rejected() {
    let mut bank = QuestionBank::new("Week\u{8}1");
    bank.push(Question::new("Q", "t", 1.0, QuestionKind::Essay));
    let err = generate_documents(&bank, &ExportMetadata::default()).unwrap_err();
    assert!(matches!(err, Error::Settings { ref reason } if reason.contains("category")), "{:?}", err);
}

#[test]
fn points_must_survive_written_precision() {
    for points in [1e-8, 0.000001, 1.0 / 3.0] {
        let (question, reason) = rejected(Question::new("Tiny", "t", points, QuestionKind::Essay));
        assert_eq!(question, "Tiny");
        assert!(reason.contains("decimal places"), "{}", reason);
    }
    for points in [0.00001, 0.5, 2.25, 12.34567] {
        let mut bank = QuestionBank::new("Checks");
        bank.push(Question::new("Fine", "t", points, QuestionKind::Essay));
        assert!(generate_documents(&bank, &ExportMetadata::default()).is_ok(), "{}", points);
    }
}

fn settings_error(meta: ExportMetadata) -> String {
    let mut bank = QuestionBank::new("Checks");
    bank.push(Question::new("Q", "t", 1.0, QuestionKind::Essay));
    match generate_documents(&bank, &meta) {
        Err(Error::Settings { reason }) => reason,
        Err(other) => panic!("expected settings error, got {:?}", other),
        Ok(_) => panic!("expected settings error, got documents"),
    }
}

#[test]
fn quiz_settings_are_checked_before_generation() {
    use mbzkit::model::QuizSettings;

    for grade in [f64::NAN, f64::INFINITY, -3.0, 0.0] {
        let meta = ExportMetadata {
            settings: QuizSettings {
                max_grade: Some(grade),
                ..QuizSettings::default()
            },
            ..ExportMetadata::default()
        };
        assert!(settings_error(meta).contains("maximum grade"));
    }

    let meta = ExportMetadata {
        settings: QuizSettings {
            decimal_points: 6,
            ..QuizSettings::default()
        },
        ..ExportMetadata::default()
    };
    assert!(settings_error(meta).contains("decimal points"));

    let meta = ExportMetadata::new("Mid\u{1}term", chrono::DateTime::UNIX_EPOCH);
    assert!(settings_error(meta).contains("quiz title"));

    let meta = ExportMetadata {
        settings: QuizSettings {
            decimal_points: 5,
            max_grade: Some(10.5),
            ..QuizSettings::default()
        },
        ..ExportMetadata::default()
    };
    let mut bank = QuestionBank::new("Checks");
    bank.push(Question::new("Q", "t", 1.0, QuestionKind::Essay));
    assert!(generate_documents(&bank, &meta).is_ok());
}
