//! Content classifiers
//!
//! Each classifier looks at one run or paragraph and its extracted text and
//! accumulates confidence from independent signals. A classifier only emits
//! a detection once the confidence reaches [`REMOVAL_THRESHOLD`], except for
//! the single-signal classifiers which emit a fixed confidence.

use regex::{Regex, RegexBuilder};

use crate::config::PatternConfig;
use crate::error::ConfigError;

use super::detection_engine::{ContentKind, ContentNode, Detection, NodeRole};
use super::formatting::{paragraph_style, RunFormatting};

/// Minimum confidence for a detection to count towards removal
pub const REMOVAL_THRESHOLD: f64 = 0.5;

const SPECIFIER_PATTERN_WEIGHT: f64 = 0.6;
const SPECIFIER_ITALIC_WEIGHT: f64 = 0.2;
const SPECIFIER_PALETTE_WEIGHT: f64 = 0.3;
const SPECIFIER_STYLE_WEIGHT: f64 = 0.8;
const COPYRIGHT_PATTERN_WEIGHT: f64 = 0.7;
const COPYRIGHT_MULTIPLE_BONUS: f64 = 0.2;
const EDITORIAL_CONFIDENCE: f64 = 0.8;

/// Core classifier trait
pub trait Classifier: Send + Sync {
    fn kind(&self) -> ContentKind;

    fn classify(&self, node: &ContentNode<'_>, text: &str) -> Option<Detection>;
}

/// Case-insensitive, dot-matches-newline patterns of one section
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    patterns: Vec<Regex>,
}

impl CompiledPatterns {
    pub fn compile(section: &str, sources: &[String]) -> Result<Self, ConfigError> {
        let patterns = sources
            .iter()
            .map(|source| {
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .dot_matches_new_line(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern {
                        section: section.to_string(),
                        pattern: source.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn first_match(&self, text: &str) -> Option<&Regex> {
        self.patterns.iter().find(|p| p.is_match(text))
    }

    pub fn all_matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a Regex> + 'a {
        self.patterns.iter().filter(move |p| p.is_match(text))
    }
}

fn in_palette(value: Option<&str>, palette: &[String]) -> bool {
    value.map_or(false, |value| {
        palette.iter().any(|accepted| accepted.eq_ignore_ascii_case(value))
    })
}

fn emit(kind: ContentKind, node: &ContentNode<'_>, text: &str, confidence: f64, reasons: Vec<String>) -> Detection {
    Detection::new(kind, node, text, confidence.min(1.0), reasons.join("; "))
}

/// Specifier and editorial notes: pattern, italic, palette and style signals
pub struct SpecifierNoteClassifier {
    config: PatternConfig,
    patterns: CompiledPatterns,
}

impl SpecifierNoteClassifier {
    pub fn new(config: PatternConfig) -> Result<Self, ConfigError> {
        let patterns = CompiledPatterns::compile("specifier_notes", &config.text_patterns)?;
        Ok(Self { config, patterns })
    }
}

impl Classifier for SpecifierNoteClassifier {
    fn kind(&self) -> ContentKind {
        ContentKind::SpecifierNote
    }

    fn classify(&self, node: &ContentNode<'_>, text: &str) -> Option<Detection> {
        if !self.config.enabled || text.trim().is_empty() {
            return None;
        }
        let mut confidence = 0.0;
        let mut reasons = Vec::new();

        if let Some(pattern) = self.patterns.first_match(text) {
            confidence += SPECIFIER_PATTERN_WEIGHT;
            reasons.push(format!("Pattern match: {}", pattern.as_str()));
        }

        match node.role() {
            NodeRole::Run => {
                let formatting = RunFormatting::of_run(node.tree, node.id);
                if formatting.italic {
                    confidence += SPECIFIER_ITALIC_WEIGHT;
                    reasons.push("Italic text".to_string());
                }
                let colored = in_palette(formatting.color.as_deref(), self.config.signal("colors"));
                let highlighted =
                    in_palette(formatting.highlight.as_deref(), self.config.signal("highlights"));
                if colored || highlighted {
                    confidence += SPECIFIER_PALETTE_WEIGHT;
                    let shown = if colored { &formatting.color } else { &formatting.highlight };
                    reasons.push(format!("Color: {}", shown.as_deref().unwrap_or_default()));
                }
                if let Some(style) = formatting.style.filter(|s| self.config.style_names.contains(s)) {
                    confidence += SPECIFIER_STYLE_WEIGHT;
                    reasons.push(format!("Style: {}", style));
                }
            }
            NodeRole::Paragraph => {
                if let Some(style) = paragraph_style(node.tree, node.id)
                    .filter(|s| self.config.style_names.contains(s))
                {
                    confidence += SPECIFIER_STYLE_WEIGHT;
                    reasons.push(format!("Paragraph style: {}", style));
                }
            }
            NodeRole::Other => {}
        }

        (confidence >= REMOVAL_THRESHOLD)
            .then(|| emit(self.kind(), node, text, confidence, reasons))
    }
}

/// Copyright boilerplate; several distinct indicators raise confidence
pub struct CopyrightClassifier {
    config: PatternConfig,
    patterns: CompiledPatterns,
}

impl CopyrightClassifier {
    pub fn new(config: PatternConfig) -> Result<Self, ConfigError> {
        let patterns = CompiledPatterns::compile("copyright_notices", &config.text_patterns)?;
        Ok(Self { config, patterns })
    }
}

impl Classifier for CopyrightClassifier {
    fn kind(&self) -> ContentKind {
        ContentKind::Copyright
    }

    fn classify(&self, node: &ContentNode<'_>, text: &str) -> Option<Detection> {
        if !self.config.enabled || text.trim().is_empty() {
            return None;
        }
        let mut confidence = 0.0;
        let mut reasons = Vec::new();
        let mut matches = 0;

        for pattern in self.patterns.all_matches(text) {
            matches += 1;
            confidence += COPYRIGHT_PATTERN_WEIGHT;
            reasons.push(format!("Pattern match: {}", pattern.as_str()));
        }
        if matches >= 2 {
            confidence += COPYRIGHT_MULTIPLE_BONUS;
            reasons.push(format!("Multiple indicators: {}", matches));
        }

        (confidence >= REMOVAL_THRESHOLD)
            .then(|| emit(self.kind(), node, text, confidence, reasons))
    }
}

/// Runs carrying the vanish property
pub struct HiddenTextClassifier {
    config: PatternConfig,
}

impl HiddenTextClassifier {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }
}

impl Classifier for HiddenTextClassifier {
    fn kind(&self) -> ContentKind {
        ContentKind::HiddenText
    }

    fn classify(&self, node: &ContentNode<'_>, text: &str) -> Option<Detection> {
        if !self.config.enabled || node.role() != NodeRole::Run {
            return None;
        }
        RunFormatting::of_run(node.tree, node.id).hidden.then(|| {
            Detection::new(self.kind(), node, text, 1.0, "Hidden text (vanish property)")
        })
    }
}

/// Single-pattern classifier with a fixed confidence
pub struct PatternClassifier {
    kind: ContentKind,
    confidence: f64,
    label: &'static str,
    config: PatternConfig,
    patterns: CompiledPatterns,
}

impl PatternClassifier {
    fn build(
        kind: ContentKind,
        section: &str,
        confidence: f64,
        label: &'static str,
        config: PatternConfig,
    ) -> Result<Self, ConfigError> {
        let patterns = CompiledPatterns::compile(section, &config.text_patterns)?;
        Ok(Self {
            kind,
            confidence,
            label,
            config,
            patterns,
        })
    }

    /// Third-party attribution and vendor references
    pub fn attribution(config: PatternConfig) -> Result<Self, ConfigError> {
        Self::build(
            ContentKind::Attribution,
            "attribution_references",
            1.0,
            "Attribution reference",
            config,
        )
    }

    /// Placeholders and authoring instructions
    pub fn editorial(config: PatternConfig) -> Result<Self, ConfigError> {
        Self::build(
            ContentKind::EditorialArtifact,
            "editorial_artifacts",
            EDITORIAL_CONFIDENCE,
            "Editorial artifact",
            config,
        )
    }

    /// Content that must never be removed
    pub fn preserve(config: PatternConfig) -> Result<Self, ConfigError> {
        Self::build(
            ContentKind::Preserve,
            "preserve_patterns",
            1.0,
            "Preserved content",
            config,
        )
    }
}

impl Classifier for PatternClassifier {
    fn kind(&self) -> ContentKind {
        self.kind
    }

    fn classify(&self, node: &ContentNode<'_>, text: &str) -> Option<Detection> {
        if !self.config.enabled || text.trim().is_empty() {
            return None;
        }
        self.patterns.first_match(text).map(|pattern| {
            Detection::new(
                self.kind,
                node,
                text,
                self.confidence,
                format!("{}: {}", self.label, pattern.as_str()),
            )
        })
    }
}
