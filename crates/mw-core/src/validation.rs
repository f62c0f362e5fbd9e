//! Move validation rules.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::models::Move;
use crate::slug::slugify;

pub const BLANK_CONDITION: &str = "condition must not be blank";
pub const RESERVED_CONDITION: &str = "condition must not be \"new\"";
pub const UNSLUGGABLE_CONDITION: &str = "condition must contain a latin letter or digit";
pub const ROUTE_CONDITION: &str = "condition clashes with a reserved address";
pub const MISSING_STAT: &str = "definition must say which stat to roll (e.g. \"roll +hot\")";
pub const MISSING_PARTIAL: &str = "definition must describe the 7-9 outcome";
pub const MISSING_SUCCESS: &str = "definition must describe the 10+ outcome";

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w").expect("static regex"));
static RESERVED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*new\s*$").expect("static regex"));
/// Literal segments under `/moves/` that a slug would be shadowed by.
const ROUTE_WORDS: [&str; 3] = ["new", "rss", "tagged"];

static STAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\broll\s*\+\s*([a-z]+)").expect("static regex"));
static PARTIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b7\s*(?:-|–|—|to)\s*9\b").expect("static regex"));
static SUCCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b10\s*(?:\+|or\s+(?:more|higher|better)\b)").expect("static regex")
});

/// Pulls the stat name out of a "roll +hot" clause, lowercased.
pub fn extract_stat(definition: &str) -> Option<String> {
    STAT.captures(definition)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Checks a candidate move. An empty result means the move may be saved.
pub fn validate_move(mv: &Move) -> Vec<String> {
    validate_fields(&mv.condition, &mv.definition)
}

pub fn validate_fields(condition: &str, definition: &str) -> Vec<String> {
    let mut errors = Vec::new();

    let slug = slugify(condition);

    if !WORD.is_match(condition) {
        errors.push(BLANK_CONDITION.to_string());
    } else if slug.is_empty() {
        errors.push(UNSLUGGABLE_CONDITION.to_string());
    }
    if RESERVED.is_match(condition) {
        errors.push(RESERVED_CONDITION.to_string());
    } else if ROUTE_WORDS.contains(&slug.as_str()) || Uuid::parse_str(&slug).is_ok() {
        // The move page would be unreachable at its own url.
        errors.push(ROUTE_CONDITION.to_string());
    }
    errors.extend(validate_definition(definition));
    errors
}

/// The definition-only rules, used when no condition has been typed yet.
pub fn validate_definition(definition: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if extract_stat(definition).is_none() {
        errors.push(MISSING_STAT.to_string());
    }
    if !PARTIAL.is_match(definition) {
        errors.push(MISSING_PARTIAL.to_string());
    }
    if !SUCCESS.is_match(definition) {
        errors.push(MISSING_SUCCESS.to_string());
    }

    errors
}
