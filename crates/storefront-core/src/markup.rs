//! Plain-text rendering of the HTML fragments the API returns in
//! descriptions.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>|<[^>]+>").expect("valid tags regex")
});

static ENTITIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#x[0-9a-fA-F]+|[a-z]+);").expect("valid entity regex"));

/// Strips tags from an HTML fragment, decodes common entities and collapses
/// whitespace.
///
/// Unknown named entities are left as written.
#[must_use]
pub fn strip_markup(input: &str) -> String {
    let no_tags = TAGS.replace_all(input, " ");
    let decoded = ENTITIES.replace_all(&no_tags, |caps: &Captures<'_>| {
        decode_entity(&caps[1]).map_or_else(|| caps[0].to_owned(), |c| c.to_string())
    });
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("#x") {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}
