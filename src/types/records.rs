//! Definition records collected from the container

use serde::{Deserialize, Serialize};

/// Whether a relationship points inside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    Internal,
    External,
}

impl TargetMode {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(mode) if mode.eq_ignore_ascii_case("external") => TargetMode::External,
            _ => TargetMode::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub target_mode: TargetMode,
    /// Relationships part that declares this entry
    pub rels_part: String,
}

impl RelationshipRecord {
    /// Stable key `"<rels path>:<id>"`
    pub fn key(&self) -> String {
        relationship_key(&self.rels_part, &self.id)
    }

    /// Last path segment of the relationship type URI
    pub fn type_name(&self) -> &str {
        self.rel_type.rsplit('/').next().unwrap_or(&self.rel_type)
    }
}

pub fn relationship_key(rels_part: &str, id: &str) -> String {
    format!("{}:{}", rels_part, id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
    Unknown,
}

impl StyleType {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("paragraph") => StyleType::Paragraph,
            Some("character") => StyleType::Character,
            Some("table") => StyleType::Table,
            Some("numbering") => StyleType::Numbering,
            _ => StyleType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub style_id: String,
    pub name: Option<String>,
    pub style_type: StyleType,
    pub based_on: Option<String>,
    pub next: Option<String>,
    pub linked: Option<String>,
    pub is_default: bool,
}

impl StyleRecord {
    /// Styles this one depends on
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        [&self.based_on, &self.linked, &self.next]
            .into_iter()
            .filter_map(|dep| dep.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub path: String,
    pub size: u64,
}

impl MediaAsset {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDeclaration {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingDefinition {
    pub num_id: String,
}

/// `w:div` declared in the web-settings part, usually left over from pasted HTML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebDiv {
    pub div_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_key_and_type_name() {
        let rel = RelationshipRecord {
            id: "rId4".into(),
            target: "https://example.com".into(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink"
                .into(),
            target_mode: TargetMode::parse(Some("External")),
            rels_part: "word/_rels/document.xml.rels".into(),
        };
        assert_eq!(rel.key(), "word/_rels/document.xml.rels:rId4");
        assert_eq!(rel.type_name(), "hyperlink");
        assert_eq!(rel.target_mode, TargetMode::External);
    }

    #[test]
    fn test_style_dependencies_skip_missing() {
        let style = StyleRecord {
            style_id: "Heading1".into(),
            name: Some("heading 1".into()),
            style_type: StyleType::Paragraph,
            based_on: Some("Normal".into()),
            next: None,
            linked: Some("Heading1Char".into()),
            is_default: false,
        };
        assert_eq!(
            style.dependencies().collect::<Vec<_>>(),
            vec!["Normal", "Heading1Char"]
        );
    }
}
