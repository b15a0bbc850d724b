// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ministry gazetteer matching.

use rota_core::MinistryRef;

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// The longest known ministry name mentioned in `text` (already lowercased).
pub fn extract_ministry(text: &str, ministries: &[String]) -> Option<MinistryRef> {
    ministries
        .iter()
        .filter(|name| !name.trim().is_empty())
        .filter(|name| {
            let needle = name.to_lowercase();
            text.match_indices(&needle)
                .any(|(start, m)| is_word_boundary(text, start, start + m.len()))
        })
        .max_by_key(|name| name.len())
        .map(|name| MinistryRef(name.clone()))
}
