use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use docsweep::PartStore;
use indoc::{formatdoc, indoc};

pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_TYPES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

struct Rel {
    id: String,
    kind: String,
    target: String,
    external: bool,
}

/// In-memory builder for a small extracted container
pub struct DocxFixture {
    body: String,
    styles: String,
    rels: Vec<Rel>,
    extra: BTreeMap<String, Vec<u8>>,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            styles: r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#
                .to_string(),
            rels: vec![Rel {
                id: "rId1".into(),
                kind: "styles".into(),
                target: "styles.xml".into(),
                external: false,
            }],
            extra: BTreeMap::new(),
        }
    }

    /// Inner XML of `w:body`
    pub fn body(mut self, xml: &str) -> Self {
        self.body = xml.to_string();
        self
    }

    /// Extra `w:style` definitions after the default Normal style
    pub fn styles(mut self, xml: &str) -> Self {
        self.styles.push_str(xml);
        self
    }

    /// Relationship from the main document; `kind` is the last segment of the type URI
    pub fn relationship(mut self, id: &str, kind: &str, target: &str, external: bool) -> Self {
        self.rels.push(Rel {
            id: id.into(),
            kind: kind.into(),
            target: target.into(),
            external,
        });
        self
    }

    pub fn part(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.extra.insert(path.to_string(), bytes.into());
        self
    }

    fn entries(&self) -> Vec<(String, Vec<u8>)> {
        let content_types = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>
        "#};
        let package_rels = formatdoc! {r#"
            <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{types}/officeDocument" Target="word/document.xml"/></Relationships>
        "#, types = REL_TYPES};
        let document = formatdoc! {r#"
            <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
            <w:document xmlns:w="{w}" xmlns:r="{r}"><w:body>{body}</w:body></w:document>
        "#, w = W, r = R, body = self.body};
        let styles = formatdoc! {r#"
            <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
            <w:styles xmlns:w="{w}">{styles}</w:styles>
        "#, w = W, styles = self.styles};
        let rels: String = self
            .rels
            .iter()
            .map(|rel| {
                format!(
                    r#"<Relationship Id="{}" Type="{}/{}" Target="{}"{}/>"#,
                    rel.id,
                    REL_TYPES,
                    rel.kind,
                    rel.target,
                    if rel.external { r#" TargetMode="External""# } else { "" }
                )
            })
            .collect();
        let document_rels = format!(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        );

        let mut entries = vec![
            ("[Content_Types].xml".to_string(), content_types.as_bytes().to_vec()),
            ("_rels/.rels".to_string(), package_rels.into_bytes()),
            ("word/document.xml".to_string(), document.into_bytes()),
            ("word/styles.xml".to_string(), styles.into_bytes()),
            ("word/_rels/document.xml.rels".to_string(), document_rels.into_bytes()),
        ];
        entries.extend(self.extra.iter().map(|(path, bytes)| (path.clone(), bytes.clone())));
        entries
    }

    pub fn store(&self) -> PartStore {
        PartStore::from_parts(self.entries())
    }

    pub fn write_to(&self, root: &Path) {
        for (path, bytes) in self.entries() {
            let target = root.join(&path);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(target, bytes).unwrap();
        }
    }
}

impl Default for DocxFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized text of a part
pub fn part_text(store: &PartStore, path: &str) -> String {
    String::from_utf8(store.get(path).unwrap().to_bytes()).unwrap()
}
