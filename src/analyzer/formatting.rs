//! Run and paragraph formatting extraction

use serde::{Deserialize, Serialize};

use crate::types::{NodeId, XmlTree, W_NS};

/// Direct formatting of a run, read from its `w:rPr`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFormatting {
    pub bold: bool,
    pub italic: bool,
    pub hidden: bool,
    pub color: Option<String>,
    pub highlight: Option<String>,
    pub font: Option<String>,
    /// Size in points
    pub size: Option<f32>,
    /// Character style id
    pub style: Option<String>,
}

impl RunFormatting {
    pub fn of_run(tree: &XmlTree, run: NodeId) -> Self {
        let Some(rpr) = tree.find_child(run, W_NS, "rPr") else {
            return Self::default();
        };
        let val = |local: &str| {
            tree.find_child(rpr, W_NS, local)
                .and_then(|node| tree.attr(node, W_NS, "val"))
                .map(str::to_string)
        };
        let fonts = tree.find_child(rpr, W_NS, "rFonts");

        Self {
            bold: toggle(tree, rpr, "b"),
            italic: toggle(tree, rpr, "i"),
            hidden: toggle(tree, rpr, "vanish"),
            color: val("color"),
            highlight: val("highlight"),
            font: fonts.and_then(|node| {
                tree.attr(node, W_NS, "ascii")
                    .or_else(|| tree.attr(node, W_NS, "hAnsi"))
                    .map(str::to_string)
            }),
            size: val("sz")
                .and_then(|half_points| half_points.parse::<f32>().ok())
                .map(|half_points| half_points / 2.0),
            style: val("rStyle"),
        }
    }
}

/// On/off property: present and not explicitly switched off
fn toggle(tree: &XmlTree, rpr: NodeId, local: &str) -> bool {
    match tree.find_child(rpr, W_NS, local) {
        Some(node) => !matches!(
            tree.attr(node, W_NS, "val"),
            Some("0") | Some("false") | Some("off")
        ),
        None => false,
    }
}

/// Paragraph style id from `w:pPr/w:pStyle`
pub fn paragraph_style(tree: &XmlTree, paragraph: NodeId) -> Option<String> {
    let ppr = tree.find_child(paragraph, W_NS, "pPr")?;
    let style = tree.find_child(ppr, W_NS, "pStyle")?;
    tree.attr(style, W_NS, "val").map(str::to_string)
}
