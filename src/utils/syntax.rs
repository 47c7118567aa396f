use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use crate::ui::theme::Theme;

const RESET: &str = "\x1b[0m";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

// Higher contrast on light terminals.
pub(crate) fn syntect_theme_name(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "base16-ocean.dark",
        Theme::Light => "InspiredGitHub",
    }
}

/// Highlight `code` as 24-bit ANSI text. Returns `None` if highlighting fails,
/// in which case callers print the code unstyled.
pub fn highlight_code(code: &str, lang_hint: &str, theme: Theme) -> Option<String> {
    let syntaxes = SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines);
    let themes = THEME_SET.get_or_init(ThemeSet::load_defaults);

    let syntect_theme = themes
        .themes
        .get(syntect_theme_name(theme))
        .or_else(|| themes.themes.values().next())?;
    let syntax = syntaxes
        .find_syntax_by_token(lang_hint)
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());

    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    let mut out = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, syntaxes).ok()?;
        out.push_str(&as_24_bit_terminal_escaped(&ranges, false));
    }
    out.push_str(RESET);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_follow_brightness() {
        assert_eq!(syntect_theme_name(Theme::Dark), "base16-ocean.dark");
        assert_eq!(syntect_theme_name(Theme::Light), "InspiredGitHub");
    }

    #[test]
    fn highlighted_output_keeps_source_text() {
        let out = highlight_code("print(1)\n", "python", Theme::Dark).expect("highlights");
        assert!(out.contains("print"));
        assert!(out.contains("\x1b["));
        assert!(out.ends_with(RESET));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        assert!(highlight_code("???", "no-such-lang", Theme::Light).is_some());
    }
}
