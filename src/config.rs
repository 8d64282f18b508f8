//! Configuration types: detection sections and clean-category flags

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// One detection section as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub enabled: bool,
    pub text_patterns: Vec<String>,
    /// Signal name (`colors`, `highlights`) to accepted values
    pub formatting_signals: BTreeMap<String, Vec<String>>,
    pub paragraph_styles: Vec<String>,
    pub character_styles: Vec<String>,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            text_patterns: Vec::new(),
            formatting_signals: BTreeMap::new(),
            paragraph_styles: Vec::new(),
            character_styles: Vec::new(),
        }
    }
}

/// Detection configuration, one section per content kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub specifier_notes: SectionConfig,
    pub copyright_notices: SectionConfig,
    pub hidden_text: SectionConfig,
    #[serde(alias = "specagent_references")]
    pub attribution_references: SectionConfig,
    pub editorial_artifacts: SectionConfig,
    pub preserve_patterns: SectionConfig,
    /// Style names that mark specifier notes
    pub style_based_detection: SectionConfig,
}

impl DetectionConfig {
    /// Loads a JSON or YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_str(&content)?;
        debug!("Loaded detection config from {}", path.display());
        Ok(config)
    }

    /// Flattened pattern config for a section. Specifier notes take their
    /// style names from the style-based section.
    pub fn pattern_config(&self, section: &str) -> Option<PatternConfig> {
        let config = match section {
            "specifier_notes" => {
                let mut pattern = PatternConfig::from(&self.specifier_notes);
                pattern.style_names = PatternConfig::from(&self.style_based_detection).style_names;
                pattern
            }
            "copyright_notices" => PatternConfig::from(&self.copyright_notices),
            "hidden_text" => PatternConfig::from(&self.hidden_text),
            "attribution_references" => PatternConfig::from(&self.attribution_references),
            "editorial_artifacts" => PatternConfig::from(&self.editorial_artifacts),
            "preserve_patterns" => PatternConfig::from(&self.preserve_patterns),
            _ => return None,
        };
        Some(config)
    }
}

impl FromStr for DetectionConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Immutable settings of a single classifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternConfig {
    pub enabled: bool,
    pub text_patterns: Vec<String>,
    pub formatting_signals: BTreeMap<String, Vec<String>>,
    pub style_names: Vec<String>,
}

impl PatternConfig {
    /// Accepted values for a formatting signal
    pub fn signal(&self, name: &str) -> &[String] {
        self.formatting_signals
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl From<&SectionConfig> for PatternConfig {
    fn from(section: &SectionConfig) -> Self {
        Self {
            enabled: section.enabled,
            text_patterns: section.text_patterns.clone(),
            formatting_signals: section.formatting_signals.clone(),
            style_names: section
                .paragraph_styles
                .iter()
                .chain(&section.character_styles)
                .cloned()
                .collect(),
        }
    }
}

bitflags! {
    /// Removal categories enabled for a clean
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CleanOptions: u16 {
        const MEDIA = 1 << 0;
        const RELATIONSHIPS = 1 << 1;
        const STYLES = 1 << 2;
        const REVISION_MARKERS = 1 << 3;
        const EMPTY_ELEMENTS = 1 << 4;
        const FONT_SCRIPTS = 1 << 5;
        const COMPAT_SETTINGS = 1 << 6;
        const INTERNAL_BOOKMARKS = 1 << 7;
        const PROOF_STATE = 1 << 8;
    }
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl CleanOptions {
    /// Just one category
    pub fn only(category: CleanCategory) -> Self {
        category.flag()
    }

    /// Everything currently enabled except one category
    pub fn without(self, category: CleanCategory) -> Self {
        self.difference(category.flag())
    }

    pub fn includes(&self, category: CleanCategory) -> bool {
        self.contains(category.flag())
    }
}

/// Removal category, listed in removal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanCategory {
    Media,
    Relationships,
    Styles,
    RevisionMarkers,
    EmptyElements,
    FontScripts,
    CompatSettings,
    InternalBookmarks,
    ProofState,
}

impl CleanCategory {
    /// Every category in the order the remover applies them
    pub const ORDERED: [CleanCategory; 9] = [
        CleanCategory::Media,
        CleanCategory::Relationships,
        CleanCategory::Styles,
        CleanCategory::RevisionMarkers,
        CleanCategory::EmptyElements,
        CleanCategory::FontScripts,
        CleanCategory::CompatSettings,
        CleanCategory::InternalBookmarks,
        CleanCategory::ProofState,
    ];

    pub fn flag(self) -> CleanOptions {
        match self {
            CleanCategory::Media => CleanOptions::MEDIA,
            CleanCategory::Relationships => CleanOptions::RELATIONSHIPS,
            CleanCategory::Styles => CleanOptions::STYLES,
            CleanCategory::RevisionMarkers => CleanOptions::REVISION_MARKERS,
            CleanCategory::EmptyElements => CleanOptions::EMPTY_ELEMENTS,
            CleanCategory::FontScripts => CleanOptions::FONT_SCRIPTS,
            CleanCategory::CompatSettings => CleanOptions::COMPAT_SETTINGS,
            CleanCategory::InternalBookmarks => CleanOptions::INTERNAL_BOOKMARKS,
            CleanCategory::ProofState => CleanOptions::PROOF_STATE,
        }
    }

    /// Command-line name
    pub fn name(self) -> &'static str {
        match self {
            CleanCategory::Media => "media",
            CleanCategory::Relationships => "relationships",
            CleanCategory::Styles => "styles",
            CleanCategory::RevisionMarkers => "rsids",
            CleanCategory::EmptyElements => "empty",
            CleanCategory::FontScripts => "fonts",
            CleanCategory::CompatSettings => "compat",
            CleanCategory::InternalBookmarks => "bookmarks",
            CleanCategory::ProofState => "proof",
        }
    }
}

impl fmt::Display for CleanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CleanCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ORDERED
            .iter()
            .copied()
            .find(|category| category.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}
