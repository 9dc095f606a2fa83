//! Bookmark anchors and jump links
//!
//! Anchor names are derived from the section id and the bookmark text alone,
//! so independently rendered sections agree on the name of a shared entity
//! without any registry.

use crate::html::escape_html;
use uuid::Uuid;

/// Deterministic anchor name for `text` within `section_id`
pub fn bookmark_id(section_id: &str, text: &str) -> String {
    let digest = blake3::hash(format!("{}{}", section_id, text).as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest.as_bytes()[..16]);
    Uuid::from_bytes(bytes)
        .hyphenated()
        .to_string()
        .to_uppercase()
        .replace('-', "")
}

/// Anchor markup around an already escaped label
pub fn anchor(section_id: &str, text: &str, label: &str) -> String {
    let id = bookmark_id(section_id, text);
    format!("<a name=\"{id}\" id=\"{id}\">{label}</a>")
}

/// Link markup to the anchor named by `text`, around an already escaped label
pub fn jump_link(section_id: &str, text: &str, label: &str) -> String {
    format!("<a href=\"#{}\">{}</a>", bookmark_id(section_id, text), label)
}

/// Anchor for a report section heading
pub fn section_anchor(section_id: &str, title: &str) -> String {
    anchor("section:", section_id, &escape_html(title))
}
