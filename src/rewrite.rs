//! Math-delimiter rewriters: pure post-passes over an assembled artifact.
//!
//! Markdown renderers disagree about math syntax. The backend emits LaTeX
//! delimiters (`\( … \)`, `\[ … \]`); Obsidian and most dollar-sign
//! renderers want `$…$` / `$$…$$`, while LaTeX toolchains want display
//! blocks left alone. Each rewrite is a stateless, idempotent regex
//! substitution over whole-artifact text; none of them ever runs inside the
//! per-page path.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Which math-delimiter convention assembled artifacts should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MathStyle {
    /// Leave backend output untouched. (default)
    #[default]
    Preserve,
    /// Convert inline math only: `\( … \)` → `$…$`. Display blocks keep
    /// their `\[ … \]` delimiters for LaTeX-compatible renderers.
    Latex,
    /// Convert display and inline math: `\[ … \]` → `$$…$$`,
    /// `\( … \)` → `$…$`.
    Obsidian,
}

static RE_INLINE_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\(\s*(.*?)\s*\\\)").expect("inline math regex"));

static RE_DISPLAY_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\\[\s*(.*?)\s*\\\]").expect("display math regex"));

/// `\( expr \)` → `$expr$`, surrounding whitespace inside the delimiters
/// trimmed.
pub fn rewrite_inline_math(text: &str) -> String {
    RE_INLINE_MATH
        .replace_all(text, |caps: &Captures<'_>| format!("${}$", &caps[1]))
        .to_string()
}

/// `\[ expr \]` → `$$expr$$`. The expression may span lines.
pub fn rewrite_display_math(text: &str) -> String {
    RE_DISPLAY_MATH
        .replace_all(text, |caps: &Captures<'_>| format!("$${}$$", &caps[1]))
        .to_string()
}

/// Apply the selected style to whole-artifact text.
pub fn apply(style: MathStyle, text: &str) -> String {
    match style {
        MathStyle::Preserve => text.to_string(),
        MathStyle::Latex => rewrite_inline_math(text).trim().to_string(),
        MathStyle::Obsidian => rewrite_inline_math(&rewrite_display_math(text))
            .trim()
            .to_string(),
    }
}
