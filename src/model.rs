use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::collections::HashSet;

/// Category name used when the author leaves the category blank.
pub const DEFAULT_CATEGORY: &str = "Default for Generated Course";

// ────────────────────────────────────────────────────────────────────────────
// Question
// ────────────────────────────────────────────────────────────────────────────

/// One authored question.
///
/// `name` is the title shown to instructors in the question bank, `text` is
/// the body shown to students (HTML is passed through untouched).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_points() -> f64 {
    1.0
}

/// Characters XML 1.0 can carry, escaped or not.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Describe the first character of `value` that XML cannot carry.
fn non_xml_char(field: &str, value: &str) -> Option<String> {
    value
        .chars()
        .find(|&c| !is_xml_char(c))
        .map(|c| format!("{} contains U+{:04X}, which XML cannot represent", field, c as u32))
}

/// Marks are written with 5 decimals; `value` must come back unchanged.
pub fn survives_mark_precision(value: f64) -> bool {
    format!("{:.5}", value).parse::<f64>().is_ok_and(|written| written == value)
}

/// Type-specific answer key of a [`Question`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        /// 1-based indices into `options`.
        correct: Vec<usize>,
    },
    TrueFalse {
        #[serde(deserialize_with = "true_false_key")]
        correct: bool,
    },
    ShortAnswer {
        answer: String,
    },
    Essay,
}

/// Accepts either `true`/`false` or a 1-based index (1 = True, 2 = False).
fn true_false_key<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Flag(bool),
        Index(u64),
    }
    match Key::deserialize(deserializer)? {
        Key::Flag(flag) => Ok(flag),
        Key::Index(1) => Ok(true),
        Key::Index(2) => Ok(false),
        Key::Index(other) => Err(de::Error::custom(format!(
            "true/false answer index must be 1 (True) or 2 (False), got {}",
            other
        ))),
    }
}

impl QuestionKind {
    /// Moodle's `qtype` identifier.
    pub fn qtype(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multichoice",
            QuestionKind::TrueFalse { .. } => "truefalse",
            QuestionKind::ShortAnswer { .. } => "shortanswer",
            QuestionKind::Essay => "essay",
        }
    }

    /// Number of `<answer>` rows this question stores in the question bank.
    pub fn answer_count(&self) -> usize {
        match self {
            QuestionKind::MultipleChoice { options, .. } => options.len(),
            QuestionKind::TrueFalse { .. } => 2,
            QuestionKind::ShortAnswer { .. } => 1,
            QuestionKind::Essay => 0,
        }
    }
}

impl Question {
    pub fn new(name: impl Into<String>, text: impl Into<String>, points: f64, kind: QuestionKind) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            points,
            kind,
        }
    }

    /// Check the invariants of this question in isolation.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation(&self.name, "question name is empty"));
        }
        for (field, value) in self.texts() {
            if let Some(reason) = non_xml_char(&field, value) {
                return Err(Error::validation(&self.name, reason));
            }
        }
        if !self.points.is_finite() || self.points <= 0.0 {
            return Err(Error::validation(
                &self.name,
                format!("points must be a positive number, got {}", self.points),
            ));
        }
        if !survives_mark_precision(self.points) {
            return Err(Error::validation(
                &self.name,
                format!("points {} have more than 5 decimal places", self.points),
            ));
        }
        match &self.kind {
            QuestionKind::MultipleChoice { options, correct } => {
                if options.len() < 2 {
                    return Err(Error::validation(
                        &self.name,
                        format!("multiple choice needs at least 2 options, got {}", options.len()),
                    ));
                }
                if let Some(pos) = options.iter().position(|o| o.trim().is_empty()) {
                    return Err(Error::validation(&self.name, format!("option {} is empty", pos + 1)));
                }
                if correct.is_empty() {
                    return Err(Error::validation(&self.name, "no correct option selected"));
                }
                let mut seen = HashSet::new();
                for &idx in correct {
                    if idx == 0 || idx > options.len() {
                        return Err(Error::validation(
                            &self.name,
                            format!(
                                "correct option {} is out of range (1..={})",
                                idx,
                                options.len()
                            ),
                        ));
                    }
                    if !seen.insert(idx) {
                        return Err(Error::validation(
                            &self.name,
                            format!("correct option {} is listed twice", idx),
                        ));
                    }
                }
            }
            QuestionKind::ShortAnswer { answer } => {
                if answer.trim().is_empty() {
                    return Err(Error::validation(&self.name, "short answer has no expected answer"));
                }
            }
            QuestionKind::TrueFalse { .. } | QuestionKind::Essay => {}
        }
        Ok(())
    }

    /// Every authored string of the question, labelled for error messages.
    fn texts(&self) -> Vec<(String, &str)> {
        let mut texts = vec![("name".to_string(), self.name.as_str()), ("text".to_string(), self.text.as_str())];
        match &self.kind {
            QuestionKind::MultipleChoice { options, .. } => {
                texts.extend(options.iter().enumerate().map(|(i, o)| (format!("option {}", i + 1), o.as_str())));
            }
            QuestionKind::ShortAnswer { answer } => texts.push(("answer".to_string(), answer.as_str())),
            QuestionKind::TrueFalse { .. } | QuestionKind::Essay => {}
        }
        texts
    }
}

// ────────────────────────────────────────────────────────────────────────────
// QuestionBank
// ────────────────────────────────────────────────────────────────────────────

/// Ordered collection of questions exported together into one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            questions: Vec::new(),
        }
    }

    pub fn push(&mut self, question: Question) -> &mut Self {
        self.questions.push(question);
        self
    }

    /// Category name as written to the archive.
    pub fn category_name(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() { DEFAULT_CATEGORY } else { trimmed }
    }

    /// Validate every question and the bank-wide name uniqueness rule.
    pub fn validate(&self) -> Result<()> {
        if let Some(reason) = non_xml_char("category", &self.category) {
            return Err(Error::settings(reason));
        }
        let mut names = HashSet::new();
        for q in &self.questions {
            q.validate()?;
            if !names.insert(q.name.as_str()) {
                return Err(Error::validation(&q.name, "another question has the same name"));
            }
        }
        Ok(())
    }

    /// Sum of all question points; the quiz's total mark.
    pub fn total_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quiz metadata
// ────────────────────────────────────────────────────────────────────────────

/// How Moodle combines several attempts into one grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeMethod {
    #[default]
    Highest,
    Average,
    First,
    Last,
}

impl GradeMethod {
    pub fn code(self) -> u8 {
        match self {
            GradeMethod::Highest => 1,
            GradeMethod::Average => 2,
            GradeMethod::First => 3,
            GradeMethod::Last => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    #[default]
    Free,
    Sequential,
}

impl Navigation {
    pub fn as_str(self) -> &'static str {
        match self {
            Navigation::Free => "free",
            Navigation::Sequential => "sequential",
        }
    }
}

/// Quiz-level settings. Every field falls back to a sensible default when
/// absent from the project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Seconds; 0 disables the time limit.
    pub time_limit_secs: u32,
    pub grade_method: GradeMethod,
    /// 0 means unlimited attempts.
    pub attempts: u32,
    pub questions_per_page: u32,
    pub navigation: Navigation,
    pub preferred_behaviour: String,
    pub shuffle_answers: bool,
    pub decimal_points: u8,
    /// Maximum quiz grade. `None` uses the sum of question points.
    pub max_grade: Option<f64>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: 0,
            grade_method: GradeMethod::Highest,
            attempts: 1,
            questions_per_page: 5,
            navigation: Navigation::Free,
            preferred_behaviour: "deferredfeedback".to_string(),
            shuffle_answers: false,
            decimal_points: 2,
            max_grade: None,
        }
    }
}

impl QuizSettings {
    pub fn validate(&self) -> Result<()> {
        if self.decimal_points > 5 {
            return Err(Error::settings(format!(
                "decimal points must be between 0 and 5, got {}",
                self.decimal_points
            )));
        }
        if let Some(grade) = self.max_grade {
            if !grade.is_finite() || grade <= 0.0 {
                return Err(Error::settings(format!("maximum grade must be a positive number, got {}", grade)));
            }
            if !survives_mark_precision(grade) {
                return Err(Error::settings(format!("maximum grade {} has more than 5 decimal places", grade)));
            }
        }
        if let Some(reason) = non_xml_char("preferred behaviour", &self.preferred_behaviour) {
            return Err(Error::settings(reason));
        }
        Ok(())
    }
}

/// Everything besides the questions that goes into an export.
///
/// `created` is supplied by the caller so that generation stays a pure
/// function of its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub title: String,
    pub intro: String,
    pub settings: QuizSettings,
    pub created: DateTime<Utc>,
    pub original_wwwroot: String,
}

impl Default for ExportMetadata {
    fn default() -> Self {
        Self {
            title: "Quiz".to_string(),
            intro: String::new(),
            settings: QuizSettings::default(),
            created: DateTime::<Utc>::UNIX_EPOCH,
            original_wwwroot: "https://example.invalid".to_string(),
        }
    }
}

impl ExportMetadata {
    pub fn new(title: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            created,
            ..Self::default()
        }
    }

    pub fn quiz_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() { "Quiz" } else { trimmed }
    }

    /// Check the quiz title, intro and settings before anything is generated.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("quiz title", &self.title),
            ("quiz intro", &self.intro),
            ("site url", &self.original_wwwroot),
        ] {
            if let Some(reason) = non_xml_char(field, value) {
                return Err(Error::settings(reason));
            }
        }
        self.settings.validate()
    }

    pub fn timestamp(&self) -> i64 {
        self.created.timestamp()
    }
}
