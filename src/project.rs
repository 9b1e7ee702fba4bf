//! JSON project files: a question bank plus quiz configuration.
//!
//! ```json
//! {
//!   "category": "Geography",
//!   "quiz": { "title": "Week 1", "settings": { "time_limit_secs": 600 } },
//!   "questions": [
//!     { "type": "multiple_choice", "name": "Q1", "text": "Capital of France?",
//!       "options": ["Paris", "London"], "correct": [1] }
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::model::{ExportMetadata, Question, QuestionBank, QuizSettings};
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub title: String,
    pub intro: String,
    pub settings: QuizSettings,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            title: "Quiz".to_string(),
            intro: String::new(),
            settings: QuizSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Project {
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::import(origin, e.to_string()))
    }

    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text, path.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            document: "project json",
            source,
        })
    }

    /// Wrap an imported bank with default quiz settings.
    pub fn from_bank(bank: QuestionBank) -> Self {
        Self {
            category: bank.category,
            quiz: QuizConfig::default(),
            questions: bank.questions,
        }
    }

    pub fn bank(&self) -> QuestionBank {
        QuestionBank {
            category: self.category.clone(),
            questions: self.questions.clone(),
        }
    }

    pub fn metadata(&self, created: DateTime<Utc>) -> ExportMetadata {
        ExportMetadata {
            title: self.quiz.title.clone(),
            intro: self.quiz.intro.clone(),
            settings: self.quiz.settings.clone(),
            created,
            ..ExportMetadata::default()
        }
    }
}
