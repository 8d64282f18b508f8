//! Part store for an extracted document container
//!
//! Every file of the container is held in memory, keyed by its normalized
//! forward-slash path. `.xml` and `.rels` files are parsed eagerly; a part
//! that fails to parse is kept verbatim so that writing the container back
//! never loses data, but analyzers see it as absent.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{PartError, Result};
use crate::types::xml::XmlTree;

pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PATH: &str = "_rels/.rels";
pub const DOCUMENT_PATH: &str = "word/document.xml";
pub const STYLES_PATH: &str = "word/styles.xml";
pub const SETTINGS_PATH: &str = "word/settings.xml";
pub const FONT_TABLE_PATH: &str = "word/fontTable.xml";
pub const NUMBERING_PATH: &str = "word/numbering.xml";
pub const WEB_SETTINGS_PATH: &str = "word/webSettings.xml";
pub const FOOTNOTES_PATH: &str = "word/footnotes.xml";
pub const ENDNOTES_PATH: &str = "word/endnotes.xml";
pub const COMMENTS_PATH: &str = "word/comments.xml";
pub const MEDIA_DIR: &str = "word/media/";
pub const THEME_DIR: &str = "word/theme/";

/// A single container entry
#[derive(Debug, Clone)]
pub enum Part {
    Xml(XmlTree),
    /// XML that failed to parse, kept byte for byte
    Malformed { bytes: Vec<u8>, error: String },
    Binary(Vec<u8>),
}

impl Part {
    fn from_bytes(path: &str, bytes: Vec<u8>) -> Self {
        if !is_xml_path(path) {
            return Part::Binary(bytes);
        }
        match XmlTree::parse(&bytes) {
            Ok(tree) => Part::Xml(tree),
            Err(e) => {
                warn!("Keeping malformed part {} verbatim: {}", path, e);
                Part::Malformed {
                    bytes,
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Part::Xml(tree) => tree.to_bytes(),
            Part::Malformed { bytes, .. } | Part::Binary(bytes) => bytes.clone(),
        }
    }

    /// Size on disk as currently held
    pub fn byte_len(&self) -> usize {
        match self {
            Part::Xml(tree) => tree.to_bytes().len(),
            Part::Malformed { bytes, .. } | Part::Binary(bytes) => bytes.len(),
        }
    }
}

fn is_xml_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".xml") || lower.ends_with(".rels")
}

/// Normalizes a container path: forward slashes, no leading slash or `./`
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// True for `word/header*.xml` and `word/footer*.xml`
pub fn is_header_or_footer(path: &str) -> bool {
    let Some(name) = path.strip_prefix("word/") else {
        return false;
    };
    !name.contains('/')
        && name.ends_with(".xml")
        && (name.starts_with("header") || name.starts_with("footer"))
}

/// Addressable collection of container parts
#[derive(Debug, Clone, Default)]
pub struct PartStore {
    parts: BTreeMap<String, Part>,
    removed: BTreeSet<String>,
}

impl PartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from in-memory entries
    pub fn from_parts<I, P, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: AsRef<str>,
        B: Into<Vec<u8>>,
    {
        let mut store = Self::new();
        for (path, bytes) in entries {
            store.insert_bytes(path.as_ref(), bytes.into());
        }
        store
    }

    /// Reads every file under `root`
    pub fn load_dir(root: &Path) -> Result<Self> {
        let mut store = Self::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|_| entry.path());
            let path = normalize_path(&relative.to_string_lossy());
            let bytes = fs::read(entry.path())?;
            store.insert_bytes(&path, bytes);
        }
        debug!("Loaded {} parts from {}", store.len(), root.display());
        Ok(store)
    }

    /// Writes every part under `root` and deletes the files of removed parts
    pub fn write_dir(&self, root: &Path) -> Result<()> {
        for (path, part) in &self.parts {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, part.to_bytes())?;
        }
        for path in &self.removed {
            let target = root.join(path);
            if target.exists() {
                fs::remove_file(&target)?;
                debug!("Deleted {}", path);
            }
        }
        Ok(())
    }

    pub fn insert_bytes(&mut self, path: &str, bytes: Vec<u8>) {
        let path = normalize_path(path);
        let part = Part::from_bytes(&path, bytes);
        self.removed.remove(&path);
        self.parts.insert(path, part);
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Part> {
        self.parts.get(path)
    }

    /// Parsed tree for a part; missing and malformed parts read as absent
    pub fn xml(&self, path: &str) -> Option<&XmlTree> {
        match self.parts.get(path) {
            Some(Part::Xml(tree)) => Some(tree),
            _ => None,
        }
    }

    /// Parsed tree for a part, distinguishing why it is unavailable
    pub fn try_xml(&self, path: &str) -> std::result::Result<&XmlTree, PartError> {
        match self.parts.get(path) {
            Some(Part::Xml(tree)) => Ok(tree),
            Some(Part::Malformed { error, .. }) => Err(PartError::Unparsable {
                path: path.to_string(),
                reason: error.clone(),
            }),
            Some(Part::Binary(_)) => Err(PartError::NotXml(path.to_string())),
            None => Err(PartError::NotFound(path.to_string())),
        }
    }

    /// Mutable tree for a part, used by the cleaners
    pub fn xml_mut(&mut self, path: &str) -> std::result::Result<&mut XmlTree, PartError> {
        match self.parts.get_mut(path) {
            Some(Part::Xml(tree)) => Ok(tree),
            Some(Part::Malformed { error, .. }) => Err(PartError::Unparsable {
                path: path.to_string(),
                reason: error.clone(),
            }),
            Some(Part::Binary(_)) => Err(PartError::NotXml(path.to_string())),
            None => Err(PartError::NotFound(path.to_string())),
        }
    }

    pub fn replace_xml(&mut self, path: &str, tree: XmlTree) {
        let path = normalize_path(path);
        self.removed.remove(&path);
        self.parts.insert(path, Part::Xml(tree));
    }

    /// Removes a part; the file is deleted on the next `write_dir`
    pub fn remove(&mut self, path: &str) -> Option<Part> {
        let part = self.parts.remove(path)?;
        self.removed.insert(path.to_string());
        Some(part)
    }

    pub fn removed_paths(&self) -> impl Iterator<Item = &str> {
        self.removed.iter().map(String::as_str)
    }

    /// All part paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Every successfully parsed XML part
    pub fn xml_parts(&self) -> impl Iterator<Item = (&str, &XmlTree)> {
        self.parts.iter().filter_map(|(path, part)| match part {
            Part::Xml(tree) => Some((path.as_str(), tree)),
            _ => None,
        })
    }

    /// Paths of every XML part, parsed or not
    pub fn xml_paths(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter(|(_, part)| !matches!(part, Part::Binary(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Binary parts under a directory prefix
    pub fn binaries_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, usize)> {
        self.parts
            .range(prefix.to_string()..)
            .take_while(move |(path, _)| path.starts_with(prefix))
            .filter_map(|(path, part)| match part {
                Part::Binary(bytes) => Some((path.as_str(), bytes.len())),
                _ => None,
            })
    }

    /// Header and footer part paths in sorted order
    pub fn header_footer_paths(&self) -> Vec<String> {
        self.parts
            .keys()
            .filter(|path| is_header_or_footer(path))
            .cloned()
            .collect()
    }

    /// Parts whose text is user content: body, headers, footers, notes, comments
    pub fn content_part_paths(&self) -> Vec<String> {
        let mut paths = vec![DOCUMENT_PATH.to_string()];
        paths.extend(self.header_footer_paths());
        paths.extend(
            [FOOTNOTES_PATH, ENDNOTES_PATH, COMMENTS_PATH]
                .iter()
                .map(|p| p.to_string()),
        );
        paths.retain(|p| self.contains(p));
        paths
    }

    /// Parts the content surgeon walks: body, headers, footers
    pub fn surgery_part_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if self.contains(DOCUMENT_PATH) {
            paths.push(DOCUMENT_PATH.to_string());
        }
        paths.extend(self.header_footer_paths());
        paths
    }
}

/// Relationships part that belongs to an XML part (`word/x.xml` owns
/// `word/_rels/x.xml.rels`)
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{}/_rels/{}.rels", dir, name),
        None => format!("_rels/{}.rels", part),
    }
}

/// Inverse of [`rels_path_for`]; `None` for the package-level `_rels/.rels`
pub fn owner_of_rels(rels: &str) -> Option<String> {
    let (dir, name) = match rels.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => return None,
    };
    let owner_name = name.strip_suffix(".rels")?;
    if owner_name.is_empty() {
        return None;
    }
    let owner_dir = dir.strip_suffix("_rels")?.trim_end_matches('/');
    if owner_dir.is_empty() {
        Some(owner_name.to_string())
    } else {
        Some(format!("{}/{}", owner_dir, owner_name))
    }
}

/// Resolves a relationship target against the directory of the owning part
pub fn resolve_target(rels: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_path(absolute);
    }
    let base = owner_of_rels(rels)
        .and_then(|owner| owner.rsplit_once('/').map(|(dir, _)| dir.to_string()))
        .unwrap_or_default();
    if base.is_empty() {
        normalize_path(target)
    } else {
        normalize_path(&format!("{}/{}", base, target))
    }
}
