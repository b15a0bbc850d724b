// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role keyword table.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rota_core::RoleCode;

static ROLE_KEYWORDS: LazyLock<Vec<(Regex, RoleCode)>> = LazyLock::new(|| {
    [
        (r"\b(worship\s+lead(er)?|lead(ing)?\s+worship|song\s+lead(er)?)\b", RoleCode::WorshipLead),
        (r"\b(sound(\s*(tech|technician|desk|board))?|audio|mixer)\b", RoleCode::SoundTech),
        (r"\b(media|projection|slides|livestream|live\s+stream|camera)\b", RoleCode::Media),
        (r"\b(kids(\s+teacher)?|children'?s?(\s+teacher)?|sunday\s+school|nursery)\b", RoleCode::KidsTeacher),
        (r"\b(greeters?|greeting|ushers?|welcome\s+team)\b", RoleCode::Greeter),
        (r"\bprayer(\s+team)?\b", RoleCode::Prayer),
        (r"\bcommunion\b", RoleCode::Communion),
        (r"\boffering\b", RoleCode::Offering),
        (r"\bsecurity\b", RoleCode::Security),
        (r"\b(cleaning|clean[\s-]?up)\b", RoleCode::Cleaning),
    ]
    .into_iter()
    .map(|(pattern, role)| (Regex::new(pattern).expect("Invalid regex"), role))
    .collect()
});

static ROLE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]+(?:_[a-z]+)+\b").expect("Invalid regex"));

/// The role mentioned earliest in `text` (already lowercased).
pub fn extract_role(text: &str) -> Option<RoleCode> {
    let literal = ROLE_CODE
        .find_iter(text)
        .find_map(|m| RoleCode::from_str(m.as_str()).ok().map(|r| (m.start(), r)));

    ROLE_KEYWORDS
        .iter()
        .filter_map(|(re, role)| re.find(text).map(|m| (m.start(), *role)))
        .chain(literal)
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, role)| role)
}

/// Words that belong to role phrases and are never person names.
pub(crate) const ROLE_WORDS: &[&str] = &[
    "worship", "lead", "leader", "leading", "song", "sound", "tech", "technician", "desk",
    "board", "audio", "mixer", "media", "projection", "slides", "livestream", "camera",
    "kids", "teacher", "children", "school", "nursery", "greeter", "greeters", "greeting",
    "usher", "ushers", "welcome", "team", "prayer", "communion", "offering", "security",
    "cleaning", "cleanup",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_map_to_codes() {
        assert_eq!(extract_role("assign someone to sound"), Some(RoleCode::SoundTech));
        assert_eq!(extract_role("maria as worship lead"), Some(RoleCode::WorshipLead));
        assert_eq!(extract_role("kids teacher on sunday"), Some(RoleCode::KidsTeacher));
        assert_eq!(extract_role("the greeters"), Some(RoleCode::Greeter));
    }

    #[test]
    fn literal_codes_are_accepted() {
        assert_eq!(extract_role("john for worship_lead"), Some(RoleCode::WorshipLead));
    }

    #[test]
    fn earliest_mention_wins() {
        assert_eq!(extract_role("media, not sound"), Some(RoleCode::Media));
    }

    #[test]
    fn plain_worship_is_not_a_role() {
        assert_eq!(extract_role("create the worship schedule"), None);
    }
}
