//! Response normalisation: strip generation scaffolding from backend output.
//!
//! The backend is prompted to open every response with a metadata
//! front-matter block, and models occasionally wrap the whole transcription
//! in a code fence regardless of instructions. Neither belongs in the
//! artifact. The rules here are pure string transforms with no knowledge of
//! the page; crucially `normalize` is idempotent, so text that was already
//! cleaned passes through unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalise raw backend output into final page text.
///
/// Rules (applied in order):
/// 1. Drop a leading front-matter block: if the first non-blank line is
///    `---` and a second `---`-only line follows, everything up to and
///    including the second delimiter is discarded.
/// 2. Remove code-fence marker lines (``` with an optional language tag)
///    wherever they stand alone on a line; fenced content is kept.
/// 3. Trim leading and trailing whitespace.
pub fn normalize(raw: &str) -> String {
    let s = strip_front_matter(raw);
    let s = strip_fence_markers(&s);
    s.trim().to_string()
}

/// A line is a front-matter delimiter when it consists solely of `---`.
fn is_delimiter_line(line: &str) -> bool {
    line.trim() == "---"
}

// ── Rule 1: Leading front-matter block ──────────────────────────────────────

/// Drop a leading `--- … ---` metadata block.
///
/// The block must open the text: the first non-blank line has to be a
/// delimiter. With fewer than two delimiter lines the whole text is content
/// and nothing is stripped. Requiring the block to be leading is what keeps
/// `normalize` idempotent — a `---` horizontal rule later in already-clean
/// content never looks like front matter.
fn strip_front_matter(input: &str) -> String {
    let mut lines = input.lines();

    // First non-blank line must open the block.
    let mut consumed = 0usize;
    let opener = loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => consumed += 1,
            other => break other,
        }
    };
    if !matches!(opener, Some(line) if is_delimiter_line(line)) {
        return input.to_string();
    }
    consumed += 1;

    // Find the closing delimiter.
    let mut closing = None;
    for (offset, line) in lines.enumerate() {
        if is_delimiter_line(line) {
            closing = Some(consumed + offset);
            break;
        }
    }

    match closing {
        Some(idx) => input
            .lines()
            .skip(idx + 1)
            .collect::<Vec<_>>()
            .join("\n"),
        // Only one delimiter: not a block, keep everything.
        None => input.to_string(),
    }
}

// ── Rule 2: Standalone fence markers ────────────────────────────────────────

static RE_FENCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t]*$\n?").expect("fence regex"));

/// Remove lines that consist solely of a code-fence marker, keeping the
/// fenced content. A fence with trailing text on the same line is left
/// alone — it is content, not scaffolding.
fn strip_fence_markers(input: &str) -> String {
    RE_FENCE_LINE.replace_all(input, "").to_string()
}
