//! Empty documents Moodle's restore insists on finding in the archive.

use super::xml_writer::XmlDoc;
use crate::error::Result;

/// Root-level manifests written with an empty root element.
pub const ROOT_STUBS: [(&str, &str); 8] = [
    ("roles.xml", "roles"),
    ("users.xml", "users"),
    ("outcomes.xml", "outcomes"),
    ("groups.xml", "groups"),
    ("scales.xml", "scales"),
    ("files.xml", "files"),
    ("completion.xml", "completion"),
    ("badges.xml", "badges"),
];

/// `<root/>` with the XML declaration.
pub fn generate_empty(document: &'static str, root: &str) -> Result<String> {
    let mut doc = XmlDoc::new(document)?;
    doc.build(|d| d.empty(root))?;
    doc.finish()
}

/// Activity-level `roles.xml`: no overrides, no assignments.
pub fn generate_activity_roles() -> Result<String> {
    let mut doc = XmlDoc::new("roles.xml")?;
    doc.build(|d| {
        d.open("roles", &[])?;
        d.empty("role_overrides")?;
        d.empty("role_assignments")?;
        d.close("roles")
    })?;
    doc.finish()
}

/// Activity-level `grades.xml`. No users are included, so there are no
/// grade rows.
pub fn generate_activity_grades() -> Result<String> {
    let mut doc = XmlDoc::new("grades.xml")?;
    doc.build(|d| {
        d.open("activity_gradebook", &[])?;
        d.empty("grade_items")?;
        d.empty("grade_letters")?;
        d.close("activity_gradebook")
    })?;
    doc.finish()
}
