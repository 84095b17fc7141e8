//! Text shown on member cards.

use crate::ir::Member;
use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLabel {
    pub name: String,
    pub initials: String,
    pub subtitle: Option<String>,
}

/// Shortens `text` to at most `max_chars` characters, ending in an ellipsis
/// when something was cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars || max_chars == 0 {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Four-digit year anywhere in a free-form date ("1952-04-01", "c. 1890").
pub fn birth_year(date: &str) -> Option<&str> {
    YEAR_RE
        .captures(date)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn card_label(member: &Member, max_chars: usize) -> CardLabel {
    let full_name = member
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown");
    let subtitle = member
        .birth_date
        .as_deref()
        .and_then(birth_year)
        .map(|year| format!("b. {year}"));
    CardLabel {
        name: truncate(full_name, max_chars),
        initials: initials(full_name),
        subtitle,
    }
}
