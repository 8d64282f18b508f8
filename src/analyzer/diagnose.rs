//! Formatting diagnostics for tuning detection configuration
//!
//! Lists the non-empty paragraphs of the main document with their paragraph
//! style and the direct formatting of every text-bearing run, and summarizes
//! the colours and styles in use so they can be copied into a config file.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{PartStore, DOCUMENT_PATH, W_NS};

use super::formatting::{paragraph_style, RunFormatting};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunProfile {
    pub text: String,
    pub formatting: RunFormatting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProfile {
    /// 1-based position among all paragraphs of the document
    pub index: usize,
    pub text: String,
    pub style: Option<String>,
    pub runs: Vec<RunProfile>,
}

impl ParagraphProfile {
    pub fn has_hidden(&self) -> bool {
        self.runs.iter().any(|r| r.formatting.hidden)
    }

    pub fn has_italic(&self) -> bool {
        self.runs.iter().any(|r| r.formatting.italic)
    }
}

/// Formatting seen across a set of paragraphs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingSummary {
    pub paragraph_styles: BTreeSet<String>,
    pub character_styles: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub highlights: BTreeSet<String>,
    pub hidden_paragraphs: usize,
    pub italic_paragraphs: usize,
}

impl FormattingSummary {
    pub fn from_profiles(profiles: &[ParagraphProfile]) -> Self {
        let mut summary = Self::default();
        for profile in profiles {
            summary.paragraph_styles.extend(profile.style.clone());
            for run in &profile.runs {
                summary.character_styles.extend(run.formatting.style.clone());
                summary.colors.extend(run.formatting.color.clone());
                summary.highlights.extend(run.formatting.highlight.clone());
            }
            summary.hidden_paragraphs += usize::from(profile.has_hidden());
            summary.italic_paragraphs += usize::from(profile.has_italic());
        }
        summary
    }
}

/// Profiles of the main document's non-empty paragraphs, optionally only
/// those containing `search` (case-insensitive)
pub fn diagnose(store: &PartStore, search: Option<&str>) -> Vec<ParagraphProfile> {
    let Some(tree) = store.xml(DOCUMENT_PATH) else {
        return Vec::new();
    };
    let search = search.map(str::to_lowercase);

    tree.elements_named(W_NS, "p")
        .enumerate()
        .filter_map(|(position, paragraph)| {
            let text = tree.text_of(paragraph);
            if text.trim().is_empty() {
                return None;
            }
            if let Some(needle) = &search {
                if !text.to_lowercase().contains(needle.as_str()) {
                    return None;
                }
            }
            let runs = tree
                .descendants(paragraph)
                .filter(|node| tree.is_element(*node, W_NS, "r"))
                .filter_map(|run| {
                    let run_text = tree.text_of(run);
                    (!run_text.trim().is_empty()).then(|| RunProfile {
                        text: run_text,
                        formatting: RunFormatting::of_run(tree, run),
                    })
                })
                .collect();
            Some(ParagraphProfile {
                index: position + 1,
                text,
                style: paragraph_style(tree, paragraph),
                runs,
            })
        })
        .collect()
}
