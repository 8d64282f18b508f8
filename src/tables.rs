//! Static lookup tables shared by the analyzers, scanners and cleaners

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

/// Style ids Word relies on even when nothing references them
pub const BUILTIN_STYLES: [&str; 4] = ["Normal", "DefaultParagraphFont", "TableNormal", "NoList"];

/// Relationship types that are never orphaned, compared case-insensitively
/// against the last segment of the type URI. Besides the core document
/// parts this covers parts Word links implicitly, without an `r:id` in the
/// owning part.
pub const ESSENTIAL_RELATIONSHIP_TYPES: &[&str] = &[
    "styles",
    "settings",
    "fontTable",
    "numbering",
    "webSettings",
    "theme",
    "footnotes",
    "endnotes",
    "officeDocument",
    "core-properties",
    "extended-properties",
    "custom-properties",
    "comments",
    "people",
    "customXml",
    "customXmlProps",
    "glossaryDocument",
    "stylesWithEffects",
    "commentsExtended",
    "commentsIds",
    "commentsExtensible",
    "vbaProject",
    "keyMapCustomizations",
];

/// Prefix of revision-session attributes (`w:rsidR`, `w:rsidRPr`, ...)
pub const RSID_PREFIX: &str = "rsid";

/// Theme font scripts kept by the font scanner
pub const PRIMARY_SCRIPTS: [&str; 3] = ["latin", "ea", "cs"];

/// Run children that make a run non-empty (`w:t` counts only with text).
/// Note and comment anchors are listed so that removing an empty run never
/// strands a footnote, endnote or comment.
pub const CONTENT_BEARING_RUN_CHILDREN: &[&str] = &[
    "drawing",
    "pict",
    "sym",
    "tab",
    "br",
    "cr",
    "fldChar",
    "instrText",
    "object",
    "ruby",
    "footnoteReference",
    "endnoteReference",
    "commentReference",
    "footnoteRef",
    "endnoteRef",
    "annotationRef",
    "separator",
    "continuationSeparator",
    "ptab",
    "noBreakHyphen",
    "softHyphen",
    "delText",
    "delInstrText",
];

/// Bookmark name prefixes Word generates internally
pub const INTERNAL_BOOKMARK_PREFIXES: [&str; 5] =
    ["_GoBack", "_Ref", "_Toc", "_Hlk", "_PictureBullets"];

/// `w:compatSetting` entries with this name are kept
pub const KEPT_COMPAT_SETTING: &str = "overrideTableStyleFontSizeAndJustification";

/// Legacy `w:compat` children that can be dropped
pub const REMOVABLE_COMPAT_FLAGS: [&str; 18] = [
    "compatSetting",
    "useFELayout",
    "useWord2002TableStyleRules",
    "growAutofit",
    "useWord97LineBreakRules",
    "doNotUseIndentAsNumberingTabStop",
    "useAltKinsokuLineBreakRules",
    "allowSpaceOfSameStyleInTable",
    "doNotSuppressParagraphBorders",
    "doNotAutofitConstrainedTables",
    "autofitToFirstFixedWidthCell",
    "displayHangulFixedWidth",
    "splitPgBreakAndParaMark",
    "doNotVertAlignCellWithSp",
    "doNotBreakConstrainedForcedTable",
    "doNotVertAlignInTxbx",
    "useAnsiKerningPairs",
    "cachedColBalance",
];

lazy_static! {
    static ref ESSENTIAL_TYPES_LOWER: HashSet<String> = ESSENTIAL_RELATIONSHIP_TYPES
        .iter()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    static ref COMPAT_FLAGS: HashSet<&'static str> =
        REMOVABLE_COMPAT_FLAGS.iter().copied().collect();
    static ref COMPAT_REASONS: HashMap<&'static str, &'static str> = [
        ("compatSetting", "Compatibility mode settings"),
        ("useFELayout", "Far East layout compatibility"),
        ("useWord2002TableStyleRules", "Word 2002 table style compatibility"),
        ("growAutofit", "Legacy autofit behavior"),
        ("useWord97LineBreakRules", "Word 97 line break compatibility"),
    ]
    .into_iter()
    .collect();
}

pub fn is_builtin_style(style_id: &str) -> bool {
    BUILTIN_STYLES.contains(&style_id)
}

/// True when the relationship type URI names an essential part
pub fn is_essential_relationship(type_uri: &str) -> bool {
    let name = type_uri.rsplit('/').next().unwrap_or(type_uri);
    ESSENTIAL_TYPES_LOWER.contains(&name.to_ascii_lowercase())
}

/// True for `rsid*` attribute local names
pub fn is_rsid_attribute(local: &str) -> bool {
    local.starts_with(RSID_PREFIX)
}

pub fn is_primary_script(script: &str) -> bool {
    PRIMARY_SCRIPTS.contains(&script)
}

pub fn is_content_bearing_run_child(local: &str) -> bool {
    CONTENT_BEARING_RUN_CHILDREN.contains(&local)
}

pub fn is_removable_compat_flag(local: &str) -> bool {
    COMPAT_FLAGS.contains(local)
}

pub fn compat_reason(local: &str) -> &'static str {
    COMPAT_REASONS
        .get(local)
        .copied()
        .unwrap_or("Legacy compatibility setting")
}

/// Internal bookmark prefix matched by a bookmark name, if any
pub fn internal_bookmark_prefix(name: &str) -> Option<&'static str> {
    INTERNAL_BOOKMARK_PREFIXES
        .iter()
        .copied()
        .find(|prefix| name.starts_with(prefix))
}

pub fn bookmark_reason(name: &str) -> &'static str {
    if name.starts_with("_GoBack") {
        "Cursor position bookmark"
    } else if name.starts_with("_Hlk") {
        "Hyperlink anchor bookmark"
    } else {
        "Internal Word bookmark"
    }
}
