//! Theme font mappings for scripts other than latin, east asian and complex

use crate::tables::is_primary_script;
use crate::types::{NodeId, PartStore, XmlTree, A_NS, THEME_DIR};

use super::{CruftFinding, CruftKind, CruftScanner};

#[derive(Debug, Default)]
pub struct FontScriptScanner;

impl FontScriptScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn theme_parts(store: &PartStore) -> Vec<String> {
        store
            .paths()
            .filter(|path| {
                path.strip_prefix(THEME_DIR)
                    .map_or(false, |name| !name.contains('/') && name.ends_with(".xml"))
            })
            .map(str::to_string)
            .collect()
    }

    /// An `a:font` mapping for a secondary script. Entries without a script
    /// are left alone.
    pub fn is_removable_font(tree: &XmlTree, node: NodeId) -> bool {
        if !tree.is_element(node, A_NS, "font") {
            return false;
        }
        match tree.attr_plain(node, "script") {
            Some(script) if !script.is_empty() => !is_primary_script(script),
            _ => false,
        }
    }
}

impl CruftScanner for FontScriptScanner {
    fn kind(&self) -> CruftKind {
        CruftKind::FontScripts
    }

    fn scan(&self, store: &PartStore) -> Vec<CruftFinding> {
        let mut findings = Vec::new();
        for path in Self::theme_parts(store) {
            let Some(tree) = store.xml(&path) else {
                continue;
            };
            for node in tree.elements_named(A_NS, "font") {
                if !Self::is_removable_font(tree, node) {
                    continue;
                }
                let script = tree.attr_plain(node, "script").unwrap_or_default();
                let typeface = tree.attr_plain(node, "typeface").unwrap_or_default();
                findings.push(
                    CruftFinding::new(
                        CruftKind::FontScripts,
                        &path,
                        "font",
                        1,
                        format!("Font mapping for script {} ({})", script, typeface),
                    )
                    .with_detail(script),
                );
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office"><a:themeElements><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/><a:font script="Jpan" typeface="Yu Gothic Light"/><a:font script="Hang" typeface="Malgun Gothic"/><a:font script="" typeface="Blank"/></a:majorFont></a:fontScheme></a:themeElements></a:theme>"#;

    #[test]
    fn test_secondary_scripts_found() {
        let store = PartStore::from_parts([("word/theme/theme1.xml", THEME)]);
        let findings = FontScriptScanner::new().scan(&store);
        let scripts: Vec<_> = findings.iter().filter_map(|f| f.detail.as_deref()).collect();
        assert_eq!(scripts, vec!["Jpan", "Hang"]);
        assert!(findings[0].reason.contains("Yu Gothic Light"));
    }
}
