//! Generate the backup manifest (`moodle_backup.xml`).
//!
//! The manifest tells Moodle's restore which format and version the archive
//! uses, where the quiz activity lives, and which restore options to offer.

use super::xml_writer::{NULL, XmlDoc};
use crate::error::Result;
use crate::ids::ExportIds;
use crate::model::ExportMetadata;
use std::io;

/// Oldest Moodle release that can restore the archive (4.5).
pub const MOODLE_VERSION: &str = "2024100705";
pub const MOODLE_RELEASE: &str = "4.5.5 (Build: 20250609)";
pub const BACKUP_VERSION: &str = "2024100700";
pub const BACKUP_RELEASE: &str = "4.5";

/// Root-level restore settings, in the order Moodle writes them.
const ROOT_SETTINGS: [(&str, &str); 20] = [
    ("users", "0"),
    ("anonymize", "0"),
    ("role_assignments", "0"),
    ("activities", "1"),
    ("blocks", "0"),
    ("filters", "0"),
    ("comments", "0"),
    ("badges", "0"),
    ("calendarevents", "0"),
    ("userscompletion", "0"),
    ("logs", "0"),
    ("grade_histories", "0"),
    ("files", "0"),
    ("legacyfiles", "0"),
    ("questionbank", "1"),
    ("groups", "0"),
    ("competencies", "0"),
    ("customfield", "0"),
    ("contentbankcontent", "0"),
    ("xapistate", "0"),
];

/// File name Moodle would give this backup.
pub fn backup_name(meta: &ExportMetadata, ids: &ExportIds) -> String {
    format!(
        "backup-moodle2-activity-{}-quiz{}-{}.mbz",
        ids.module,
        ids.module,
        meta.created.format("%Y%m%d-%H%M")
    )
}

/// Deterministic 32-hex-digit backup id.
fn backup_id(meta: &ExportMetadata, ids: &ExportIds) -> String {
    let seconds = u64::try_from(meta.timestamp()).unwrap_or(0);
    format!("{:016x}{:016x}", seconds, u64::from(ids.module))
}

pub fn generate_backup_xml(meta: &ExportMetadata, ids: &ExportIds) -> Result<String> {
    let mut doc = XmlDoc::new("moodle_backup.xml")?;
    let name = backup_name(meta, ids);
    doc.build(|d| {
        d.open("moodle_backup", &[])?;
        d.open("information", &[])?;
        d.leaf("name", &name)?;
        d.leaf("moodle_version", MOODLE_VERSION)?;
        d.leaf("moodle_release", MOODLE_RELEASE)?;
        d.leaf("backup_version", BACKUP_VERSION)?;
        d.leaf("backup_release", BACKUP_RELEASE)?;
        d.value("backup_date", meta.timestamp())?;
        d.leaf("mnet_remoteusers", "0")?;
        d.leaf("include_files", "0")?;
        d.leaf("include_file_references_to_external_content", "0")?;
        d.leaf("original_wwwroot", &meta.original_wwwroot)?;
        d.leaf("original_site_identifier_hash", "generated")?;
        d.leaf("original_course_id", "1")?;
        d.leaf("original_course_format", "topics")?;
        d.leaf("original_course_fullname", "Generated by mbzkit")?;
        d.leaf("original_course_shortname", "MBZKIT")?;
        d.leaf("original_course_startdate", "0")?;
        d.leaf("original_course_enddate", "0")?;
        d.leaf("original_course_contextid", "1")?;
        d.leaf("original_system_contextid", "1")?;

        write_details(d, meta, ids)?;
        write_contents(d, meta, ids)?;
        write_settings(d, ids, &name)?;

        d.close("information")?;
        d.close("moodle_backup")
    })?;
    doc.finish()
}

fn write_details(d: &mut XmlDoc, meta: &ExportMetadata, ids: &ExportIds) -> io::Result<()> {
    let id = backup_id(meta, ids);
    d.open("details", &[])?;
    d.open("detail", &[("backup_id", &id)])?;
    d.leaf("type", "activity")?;
    d.leaf("format", "moodle2")?;
    d.leaf("interactive", "1")?;
    d.leaf("mode", "10")?;
    d.leaf("execution", "1")?;
    d.leaf("executiontime", "0")?;
    d.close("detail")?;
    d.close("details")
}

fn write_contents(d: &mut XmlDoc, meta: &ExportMetadata, ids: &ExportIds) -> io::Result<()> {
    d.open("contents", &[])?;
    d.open("activities", &[])?;
    d.open("activity", &[])?;
    d.value("moduleid", ids.module)?;
    d.leaf("sectionid", NULL)?;
    d.leaf("modulename", "quiz")?;
    d.leaf("title", meta.quiz_title())?;
    d.leaf("directory", &ids.activity_dir())?;
    d.leaf("insubsection", "")?;
    d.close("activity")?;
    d.close("activities")?;
    d.close("contents")
}

fn write_settings(d: &mut XmlDoc, ids: &ExportIds, name: &str) -> io::Result<()> {
    d.open("settings", &[])?;
    write_root_setting(d, "filename", name)?;
    for (setting, value) in ROOT_SETTINGS {
        write_root_setting(d, setting, value)?;
    }
    let key = ids.activity_key();
    write_activity_setting(d, &key, &format!("{}_included", key), "1")?;
    write_activity_setting(d, &key, &format!("{}_userinfo", key), "0")?;
    d.close("settings")
}

fn write_root_setting(d: &mut XmlDoc, name: &str, value: &str) -> io::Result<()> {
    d.open("setting", &[])?;
    d.leaf("level", "root")?;
    d.leaf("name", name)?;
    d.leaf("value", value)?;
    d.close("setting")
}

fn write_activity_setting(d: &mut XmlDoc, activity: &str, name: &str, value: &str) -> io::Result<()> {
    d.open("setting", &[])?;
    d.leaf("level", "activity")?;
    d.leaf("activity", activity)?;
    d.leaf("name", name)?;
    d.leaf("value", value)?;
    d.close("setting")
}
