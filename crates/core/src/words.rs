//! Identifier tokenizing and casing helpers.
//!
//! Shared by the route heuristics and the type namer. ESI identifiers are
//! lower snake case (`get_characters_character_id_assets`), so everything here
//! works on `_`-separated tokens.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Marker token closing an entity id (`character_id`).
pub const ID_MARKER: &str = "id";

/// Marker token appended to array element titles.
pub const ELEMENT_MARKER: &str = "element";

/// HTTP method tokens that prefix route identifiers.
pub static HTTP_METHODS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["get", "post", "put", "patch", "delete", "head", "options"]
        .into_iter()
        .collect()
});

/// Response words used as status suffixes in titles (`..._ok`).
const STATUS_WORDS: &[&str] = &["ok", "created"];

/// Words ending in `s` that are already singular.
const SINGULAR_SUFFIXES: &[&str] = &["ss", "us", "is"];

/// Split an identifier into lower-case tokens on `_`, `-`, `.` and spaces.
pub fn tokenize(identifier: &str) -> Vec<String> {
    identifier
        .split(['_', '-', '.', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect()
}

/// Check if a token is an HTTP method.
pub fn is_http_method(token: &str) -> bool {
    HTTP_METHODS.contains(token)
}

/// Check if a token is a pure status code (`200`) or a status word (`ok`).
pub fn is_status_token(token: &str) -> bool {
    (token.len() == 3 && token.chars().all(|c| c.is_ascii_digit()))
        || STATUS_WORDS.contains(&token)
}

/// Check if a token is an `id` or `element` marker.
pub fn is_marker(token: &str) -> bool {
    token == ID_MARKER || token == ELEMENT_MARKER
}

/// Singularize an English plural (ESI vocabulary is regular enough for suffix rules).
pub fn singularize(word: &str) -> String {
    if word.len() <= 3 {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "shes", "ches", "xes", "zzes", "uses"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if SINGULAR_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Join tokens into a PascalCase identifier.
pub fn to_pascal_case<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| capitalize_first(token.as_ref()))
        .collect()
}

/// Check if a title is already a proper type name (`PlanetaryPin`).
pub fn is_proper_name(title: &str) -> bool {
    title.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && title.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Turn a tag (`Planetary Interaction`, `Fleets`) into a namespace segment.
///
/// The last word is singularized so `Fleets` and `Fleet` share a segment.
pub fn segment_name(tag: &str) -> String {
    let mut tokens = tokenize(tag);
    if let Some(last) = tokens.last_mut() {
        *last = singularize(last);
    }
    tokens.join("_")
}
