use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}_]+|\p{N}+(?:\.\p{N}+)?|\S")
        .unwrap_or_else(|e| panic!("token pattern: {e}"))
});

const UNIT_NOISE: &[&str] = &[
    "m", "meter", "meters", "metre", "metres", "deg", "degree", "degrees", "percent",
];

/// Tokens that no rule match covers and that are not numerals, punctuation
/// or unit noise.
pub(super) fn unexplained_tokens<'t>(text: &'t str, spans: &[Range<usize>]) -> Vec<&'t str> {
    TOKEN
        .find_iter(text)
        .filter(|tok| {
            !spans
                .iter()
                .any(|span| tok.start() < span.end && span.start < tok.end())
        })
        .map(|tok| tok.as_str())
        .filter(|tok| !is_noise(tok))
        .collect()
}

fn is_noise(token: &str) -> bool {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if !c.is_alphanumeric() {
            return true;
        }
    }
    if token.chars().all(|c| c.is_numeric() || c == '.') {
        return true;
    }
    UNIT_NOISE.iter().any(|unit| unit.eq_ignore_ascii_case(token))
}
