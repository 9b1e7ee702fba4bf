//! Generate the course module descriptor (`activities/quiz_<id>/module.xml`).

use super::xml_writer::{NULL, XmlDoc};
use crate::error::Result;
use crate::ids::ExportIds;
use crate::model::ExportMetadata;

/// Version of mod_quiz the descriptor claims.
pub const MODULE_VERSION: &str = "2024100700";

pub fn generate_module_xml(meta: &ExportMetadata, ids: &ExportIds) -> Result<String> {
    let mut doc = XmlDoc::new("module.xml")?;
    let module_id = ids.module.to_string();
    doc.build(|d| {
        d.open("module", &[("id", &module_id), ("version", MODULE_VERSION)])?;
        d.leaf("modulename", "quiz")?;
        d.leaf("name", meta.quiz_title())?;
        // Section ids are remapped on restore.
        d.leaf("sectionid", NULL)?;
        d.leaf("sectionnumber", "1")?;
        d.value("instance", ids.quiz)?;
        d.leaf("idnumber", "")?;
        d.value("added", meta.timestamp())?;
        d.leaf("score", "0")?;
        d.leaf("indent", "0")?;
        d.leaf("visible", "1")?;
        d.leaf("visibleoncoursepage", "1")?;
        d.leaf("visibleold", "1")?;
        d.leaf("groupmode", "0")?;
        d.leaf("groupingid", "0")?;
        d.leaf("completion", "0")?;
        d.leaf("completiongradeitemnumber", NULL)?;
        d.leaf("completionpassgrade", "0")?;
        d.leaf("completionview", "0")?;
        d.leaf("completionexpected", "0")?;
        d.leaf("availability", NULL)?;
        d.leaf("showdescription", "0")?;
        d.leaf("downloadcontent", "1")?;
        d.leaf("lang", "")?;
        d.empty("plugin_outcomesupport_mod_module")?;
        d.empty("tags")?;
        d.close("module")
    })?;
    doc.finish()
}
