// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Person reference extraction.

use std::sync::LazyLock;

use regex::Regex;
use rota_core::UserRef;

use super::roles::ROLE_WORDS;

static SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(me|my|myself|mine|i|i'm|im|i'll)\b").expect("Invalid regex"));

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(someone|somebody|anyone|anybody|whoever|a\s+volunteer)\b")
        .expect("Invalid regex")
});

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").expect("Invalid regex"));

/// Common words that may appear capitalised (sentence starts, titles) but
/// never name a person.
const STOPWORDS: &[&str] = &[
    "a", "about", "add", "all", "also", "am", "an", "and", "any", "are", "as", "assign",
    "assignment", "assignments", "at", "available", "be", "between", "book", "but", "by",
    "can", "can't", "cancel", "cannot", "clear", "confirm", "confirmed", "could", "count",
    "create", "day", "days", "decline", "declined", "do", "does", "don't", "during", "each",
    "every", "first", "for", "forget", "from", "generate", "get", "give", "go", "good",
    "great", "has", "have", "he", "hello", "help", "her", "hey", "hi", "him", "his", "how",
    "in", "is", "it", "last", "let", "list", "make", "many", "month", "need", "new", "next",
    "no", "not", "of", "ok", "okay", "on", "one", "or", "our", "out", "plan", "please",
    "put", "rate", "remove", "reset", "roster", "schedule", "second", "see", "serve",
    "serving", "set", "she", "show", "so", "start", "stats", "statistics", "sure", "thank",
    "thanks", "that", "the", "their", "them", "then", "there", "they", "third", "this",
    "through", "till", "to", "today", "tomorrow", "tonight", "until", "up", "us", "want",
    "was", "we", "week", "weekend", "weekends", "weekday", "weekdays", "what", "when",
    "where", "which", "who", "whom", "why", "will", "with", "would", "yes", "you", "your",
    "ministry", "church", "service", "services", "volunteer", "volunteers", "daily",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "mondays", "tuesdays", "wednesdays", "thursdays", "fridays", "saturdays", "sundays",
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

fn is_vocabulary(word: &str, ministries: &[String]) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.contains(&lower.as_str())
        || ROLE_WORDS.contains(&lower.as_str())
        || SPEAKER.is_match(&lower)
        || PLACEHOLDER.is_match(&lower)
        || ministries
            .iter()
            .any(|m| m.split_whitespace().any(|part| part.eq_ignore_ascii_case(&lower)))
}

/// First run of adjacent words that pass `accept`, joined with single spaces.
fn first_run(text: &str, accept: impl Fn(&str) -> bool) -> Option<String> {
    let mut run: Vec<&str> = Vec::new();
    let mut last_end = 0;
    for m in WORD.find_iter(text) {
        let word = m.as_str();
        let adjacent = text[last_end..m.start()].chars().all(|c| c == ' ');
        if accept(word) {
            if !run.is_empty() && !adjacent {
                break;
            }
            run.push(word);
        } else if !run.is_empty() {
            break;
        }
        last_end = m.end();
    }
    (!run.is_empty()).then(|| run.join(" "))
}

/// What the message says about who is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonMention {
    Found(UserRef),
    /// "someone", "anyone": explicitly unknown.
    Placeholder,
}

/// Extracts a person reference from the original-case `text`.
///
/// Capitalised non-vocabulary words name a person; without one, first-person
/// pronouns mean the speaker. With `relaxed`, used when the user is answering
/// a "who?" prompt, lowercase names are accepted too.
pub fn extract_person(text: &str, ministries: &[String], relaxed: bool) -> Option<PersonMention> {
    let capitalised = |w: &str| {
        w.chars().next().is_some_and(char::is_uppercase) && w != "I" && !is_vocabulary(w, ministries)
    };
    if let Some(name) = first_run(text, capitalised) {
        return Some(PersonMention::Found(UserRef::Named(name)));
    }
    if SPEAKER.is_match(text) {
        return Some(PersonMention::Found(UserRef::Speaker));
    }
    if PLACEHOLDER.is_match(text) {
        return Some(PersonMention::Placeholder);
    }
    if relaxed {
        return first_run(text, |w| !is_vocabulary(w, ministries))
            .map(|name| PersonMention::Found(UserRef::Named(name)));
    }
    None
}
