//! Generate the quiz activity document (`activities/quiz_<id>/quiz.xml`).

use super::xml_writer::{XmlDoc, flag, mark};
use crate::error::Result;
use crate::ids::ExportIds;
use crate::model::{ExportMetadata, QuestionBank};
use std::io;

/// Review option bitmasks (during / immediately after / later / closed).
const REVIEW_FLAGS: [(&str, &str); 7] = [
    ("reviewattempt", "65536"),
    ("reviewcorrectness", "4096"),
    ("reviewmarks", "4096"),
    ("reviewspecificfeedback", "4096"),
    ("reviewgeneralfeedback", "4096"),
    ("reviewrightanswer", "4096"),
    ("reviewoverallfeedback", "4096"),
];

pub fn generate_quiz_xml(bank: &QuestionBank, meta: &ExportMetadata, ids: &ExportIds) -> Result<String> {
    let mut doc = XmlDoc::new("quiz.xml")?;
    doc.build(|d| write_activity(d, bank, meta, ids))?;
    doc.finish()
}

fn write_activity(d: &mut XmlDoc, bank: &QuestionBank, meta: &ExportMetadata, ids: &ExportIds) -> io::Result<()> {
    let settings = &meta.settings;
    let now = meta.timestamp().to_string();
    let total = bank.total_points();
    let grade = settings.max_grade.unwrap_or(total);

    let activity_id = ids.activity.to_string();
    let module_id = ids.module.to_string();
    let context_id = ids.context.to_string();
    d.open(
        "activity",
        &[
            ("id", &activity_id),
            ("moduleid", &module_id),
            ("modulename", "quiz"),
            ("contextid", &context_id),
        ],
    )?;

    let quiz_id = ids.quiz.to_string();
    d.open("quiz", &[("id", &quiz_id)])?;
    d.leaf("name", meta.quiz_title())?;
    d.leaf("intro", &meta.intro)?;
    d.leaf("introformat", "1")?;
    d.leaf("timeopen", "0")?;
    d.leaf("timeclose", "0")?;
    d.value("timelimit", settings.time_limit_secs)?;
    d.leaf("overduehandling", "autosubmit")?;
    d.leaf("graceperiod", "0")?;
    d.leaf("preferredbehaviour", &settings.preferred_behaviour)?;
    d.leaf("canredoquestions", "0")?;
    d.value("attempts_number", settings.attempts)?;
    d.leaf("attemptonlast", "0")?;
    d.value("grademethod", settings.grade_method.code())?;
    d.value("decimalpoints", settings.decimal_points)?;
    d.leaf("questiondecimalpoints", "-1")?;
    for (tag, value) in REVIEW_FLAGS {
        d.leaf(tag, value)?;
    }
    d.value("questionsperpage", settings.questions_per_page)?;
    d.leaf("navmethod", settings.navigation.as_str())?;
    d.leaf("shuffleanswers", flag(settings.shuffle_answers))?;

    write_slots(d, bank, ids, settings.questions_per_page)?;

    d.leaf("sumgrades", &mark(total))?;
    d.leaf("grade", &mark(grade))?;
    d.leaf("timecreated", &now)?;
    d.leaf("timemodified", &now)?;
    d.leaf("password", "")?;
    d.leaf("subnet", "")?;
    d.leaf("browsersecurity", "-")?;
    d.leaf("delay1", "0")?;
    d.leaf("delay2", "0")?;
    d.leaf("showuserpicture", "0")?;
    d.leaf("showblocks", "0")?;
    d.leaf("completionattemptsexhausted", "0")?;
    d.leaf("completionminattempts", "0")?;
    d.leaf("allowofflineattempts", "0")?;
    for container in [
        "subplugin_quizaccess_seb_quiz",
        "quiz_grade_items",
        "feedbacks",
        "overrides",
        "grades",
        "attempts",
    ] {
        d.empty(container)?;
    }
    d.close("quiz")?;
    d.close("activity")
}

/// Page of a 1-based slot. `per_page` 0 keeps every slot on page 1.
pub fn quiz_page(slot_number: usize, per_page: u32) -> usize {
    match per_page {
        0 => 1,
        n => slot_number.saturating_sub(1) / n as usize + 1,
    }
}

fn write_slots(d: &mut XmlDoc, bank: &QuestionBank, ids: &ExportIds, per_page: u32) -> io::Result<()> {
    let pairs = || bank.questions.iter().zip(&ids.questions);

    d.open("question_instances", &[])?;
    for (slot_number, (q, qids)) in pairs().enumerate().map(|(i, p)| (i + 1, p)) {
        let id = qids.instance.to_string();
        d.open("question_instance", &[("id", &id)])?;
        d.value("slot", slot_number)?;
        d.value("questionid", qids.question)?;
        d.leaf("maxmark", &mark(q.points))?;
        d.close("question_instance")?;
    }
    d.close("question_instances")?;

    d.open("slots", &[])?;
    for (slot_number, (q, qids)) in pairs().enumerate().map(|(i, p)| (i + 1, p)) {
        let id = qids.slot.to_string();
        d.open("slot", &[("id", &id)])?;
        d.value("slotnumber", slot_number)?;
        d.value("quizpage", quiz_page(slot_number, per_page))?;
        d.leaf("requireprevious", "0")?;
        d.value("questionid", qids.question)?;
        d.value("questioninstanceid", qids.instance)?;
        d.leaf("maxmark", &mark(q.points))?;
        d.leaf("minmark", "0.00000")?;
        d.close("slot")?;
    }
    d.close("slots")?;

    d.open("sections", &[])?;
    if !bank.questions.is_empty() {
        let id = ids.section.to_string();
        d.open("section", &[("id", &id)])?;
        d.leaf("firstslot", "1")?;
        d.leaf("shufflequestions", "0")?;
        d.value("slotcount", bank.questions.len())?;
        d.close("section")?;
    }
    d.close("sections")
}
