//! Text normalization applied to every edit request before rule matching.
//!
//! All rewrites stay within a single line and each one is applied until the
//! text stops changing, which makes [`normalize`] idempotent.

use std::sync::LazyLock;

use regex::Regex;

const DASH_GLYPHS: &[char] = &[
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}', '\u{FE58}',
    '\u{FE63}', '\u{FF0D}',
];

static INLINE_SPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"[ \t]+"));

static UNIT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(\d)(?:[ \t]*(?:meters?|metres?|m)\b)+"));

static MARGIN_BOTH: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(?:protect|safe)[ \t]+start[ \t]+(\d+)[ \t,]+(?:and[ \t]+)?(?:(?:protect|safe)[ \t]+)?end[ \t]+(\d+)",
    )
});

static MARGIN_START: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(?:protect|safe)[ \t]+start[ \t]+(\d+)"));

static MARGIN_END: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(?:protect|safe)[ \t]+end[ \t]+(\d+)"));

static ROW_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\brows?[ \t]+(\d+)[ \t]*(?:to|through|thru|-|\.\.)[ \t]*(\d+)")
});

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("built-in normalizer pattern `{pattern}` is invalid: {e}"),
    }
}

/// Normalize free-form edit text into the shape the rule repository expects.
pub fn normalize(input: &str) -> String {
    let text = input.replace("\r\n", "\n").replace('\r', "\n");
    let text: String = text
        .chars()
        .map(|c| if DASH_GLYPHS.contains(&c) { '-' } else { c })
        .collect();
    let text = rewrite(&INLINE_SPACE, &text, " ");
    let text = rewrite(&UNIT_SUFFIX, &text, "${1}");
    let text = rewrite(&MARGIN_BOTH, &text, "margin_start ${1} margin_end ${2}");
    let text = rewrite(&MARGIN_START, &text, "margin_start ${1}");
    let text = rewrite(&MARGIN_END, &text, "margin_end ${1}");
    let text = rewrite(&ROW_RANGE, &text, "rows ${1}-${2}");

    text.lines()
        .map(|line| INLINE_SPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply `re` repeatedly until the text no longer changes. No replacement
/// reintroduces its own match, so the loop ends.
fn rewrite(re: &Regex, text: &str, replacement: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = re.replace_all(&current, replacement).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
