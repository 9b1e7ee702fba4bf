//! Identifier allocation for one export.
//!
//! Every numeric id written to any of the generated documents comes from a
//! single [`ExportIds`] plan. The plan is computed once from the question
//! bank, so documents built independently still agree on every
//! cross-reference.

use crate::model::{QuestionBank, QuestionKind};

/// Entity classes with their own id counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Category,
    Entry,
    Version,
    Question,
    Answer,
    /// The per-qtype options row (`<multichoice id>`, `<truefalse id>`, ...).
    Options,
    Module,
    Context,
    Activity,
    Quiz,
    Section,
    Instance,
    Slot,
}

impl IdKind {
    const COUNT: usize = 13;

    fn slot(self) -> usize {
        self as usize
    }
}

/// Hands out strictly increasing ids per [`IdKind`], starting at 1.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: [u32; IdKind::COUNT],
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next: [1; IdKind::COUNT],
        }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, kind: IdKind) -> u32 {
        let slot = &mut self.next[kind.slot()];
        let id = *slot;
        *slot += 1;
        id
    }

    /// Number of ids handed out so far for `kind`.
    pub fn issued(&self, kind: IdKind) -> u32 {
        self.next[kind.slot()] - 1
    }
}

/// Ids of one question and everything nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionIds {
    pub entry: u32,
    pub version: u32,
    pub question: u32,
    /// One per `<answer>` row, in option order. For true/false the first id
    /// is the `True` answer and the second the `False` answer.
    pub answers: Vec<u32>,
    pub options: u32,
    pub instance: u32,
    pub slot: u32,
}

/// Complete id plan shared by all documents of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportIds {
    pub top_category: u32,
    pub category: u32,
    pub module: u32,
    pub context: u32,
    pub activity: u32,
    pub quiz: u32,
    pub section: u32,
    pub questions: Vec<QuestionIds>,
}

impl ExportIds {
    /// Allocate every id used by the export of `bank`.
    pub fn allocate(bank: &QuestionBank) -> Self {
        let mut alloc = IdAllocator::new();
        let top_category = alloc.next(IdKind::Category);
        let category = alloc.next(IdKind::Category);
        let module = alloc.next(IdKind::Module);
        let context = alloc.next(IdKind::Context);
        let activity = alloc.next(IdKind::Activity);
        let quiz = alloc.next(IdKind::Quiz);
        let section = alloc.next(IdKind::Section);

        let questions = bank
            .questions
            .iter()
            .map(|q| QuestionIds {
                entry: alloc.next(IdKind::Entry),
                version: alloc.next(IdKind::Version),
                question: alloc.next(IdKind::Question),
                answers: (0..q.kind.answer_count())
                    .map(|_| alloc.next(IdKind::Answer))
                    .collect(),
                options: alloc.next(IdKind::Options),
                instance: alloc.next(IdKind::Instance),
                slot: alloc.next(IdKind::Slot),
            })
            .collect();

        tracing::debug!(
            questions = alloc.issued(IdKind::Question),
            answers = alloc.issued(IdKind::Answer),
            "allocated export ids"
        );

        Self {
            top_category,
            category,
            module,
            context,
            activity,
            quiz,
            section,
            questions,
        }
    }

    /// Directory of the quiz activity inside the archive.
    pub fn activity_dir(&self) -> String {
        format!("activities/quiz_{}", self.module)
    }

    /// Key used by `moodle_backup.xml` activity-level settings.
    pub fn activity_key(&self) -> String {
        format!("quiz_{}", self.module)
    }
}

/// Answer ids of a true/false question as `(true_id, false_id)`.
pub fn true_false_answers(kind: &QuestionKind, ids: &QuestionIds) -> Option<(u32, u32)> {
    match (kind, ids.answers.as_slice()) {
        (QuestionKind::TrueFalse { .. }, [t, f]) => Some((*t, *f)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionKind};

    fn bank() -> QuestionBank {
        let mut bank = QuestionBank::new("Geography");
        bank.push(Question::new(
            "Q1",
            "Capital of France?",
            1.0,
            QuestionKind::MultipleChoice {
                options: vec!["Paris".into(), "London".into(), "Rome".into()],
                correct: vec![1],
            },
        ))
        .push(Question::new("Q2", "Sky is blue", 1.0, QuestionKind::TrueFalse { correct: true }))
        .push(Question::new("Q3", "Discuss", 5.0, QuestionKind::Essay));
        bank
    }

    #[test]
    fn counters_are_independent_and_start_at_one() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.next(IdKind::Question), 1);
        assert_eq!(alloc.next(IdKind::Question), 2);
        assert_eq!(alloc.next(IdKind::Answer), 1);
        assert_eq!(alloc.next(IdKind::Question), 3);
        assert_eq!(alloc.issued(IdKind::Question), 3);
        assert_eq!(alloc.issued(IdKind::Slot), 0);
    }

    #[test]
    fn plan_is_deterministic() {
        let b = bank();
        assert_eq!(ExportIds::allocate(&b), ExportIds::allocate(&b));
    }

    #[test]
    fn answers_are_allocated_per_row() {
        let ids = ExportIds::allocate(&bank());
        assert_eq!(ids.questions[0].answers, vec![1, 2, 3]);
        assert_eq!(ids.questions[1].answers, vec![4, 5]);
        assert!(ids.questions[2].answers.is_empty());
        let qids: Vec<u32> = ids.questions.iter().map(|q| q.question).collect();
        assert_eq!(qids, vec![1, 2, 3]);
        assert_eq!(ids.top_category, 1);
        assert_eq!(ids.category, 2);
        assert_eq!(ids.activity_dir(), "activities/quiz_1");
    }
}
