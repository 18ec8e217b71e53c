use std::num::NonZeroUsize;
use std::path::Path;
use lru::LruCache;
use ratatui::style::{Color, Modifier, Style};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

const THEME: &str = "base16-ocean.dark";
const FALLBACK_THEME: &str = "InspiredGitHub";

/// Foreground-only syntax highlighting for pane lines.
///
/// Backgrounds are left to the pane, which paints them by change kind. Results
/// are cached per (language, line) since the same lines are redrawn on every
/// frame while scrolling.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    cache: LruCache<(String, String), Vec<(Style, String)>>,
}

impl SyntaxHighlighter {
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            cache: LruCache::new(capacity),
        }
    }

    pub fn language_for_path<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        let path = path.as_ref();

        let ext = path.extension().and_then(|s| s.to_str())?;
        self.syntax_set
            .find_syntax_by_extension(ext)
            .map(|syntax| syntax.name.clone())
    }

    /// Highlight one line. Unknown languages come back as a single unstyled span.
    pub fn highlight_line(&mut self, line: &str, language: &str) -> Vec<(Style, String)> {
        let key = (language.to_string(), line.to_string());
        if let Some(spans) = self.cache.get(&key) {
            return spans.clone();
        }

        let spans = self.compute(line, language);
        self.cache.put(key, spans.clone());
        spans
    }

    fn compute(&self, line: &str, language: &str) -> Vec<(Style, String)> {
        let plain = || vec![(Style::default(), line.to_string())];

        let Some(syntax) = self.syntax_set.find_syntax_by_name(language) else {
            return plain();
        };
        let Some(theme) = self.theme() else {
            return plain();
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        match highlighter.highlight_line(line, &self.syntax_set) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| (convert_style(style), text.to_string()))
                .collect(),
            Err(_) => plain(),
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(THEME)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
    }
}

fn convert_style(style: syntect::highlighting::Style) -> Style {
    let mut converted = Style::default();

    if style.foreground.a > 0 {
        converted = converted.fg(Color::Rgb(
            style.foreground.r,
            style.foreground.g,
            style.foreground.b,
        ));
    }

    if style.font_style.contains(FontStyle::BOLD) {
        converted = converted.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        converted = converted.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        converted = converted.add_modifier(Modifier::UNDERLINED);
    }

    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_detection() {
        let highlighter = SyntaxHighlighter::new(16);

        assert_eq!(highlighter.language_for_path("app.js").as_deref(), Some("JavaScript"));
        assert_eq!(highlighter.language_for_path("notes.md").as_deref(), Some("Markdown"));
        assert_eq!(highlighter.language_for_path("no_extension"), None);
    }

    #[test]
    fn test_highlight_preserves_text_and_caches() {
        let mut highlighter = SyntaxHighlighter::new(16);
        let line = "const answer = 42;";

        let spans = highlighter.highlight_line(line, "JavaScript");
        let text: String = spans.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(text, line);
        assert_eq!(highlighter.cache.len(), 1);

        highlighter.highlight_line(line, "JavaScript");
        assert_eq!(highlighter.cache.len(), 1);
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let mut highlighter = SyntaxHighlighter::new(4);
        let spans = highlighter.highlight_line("plain words", "NoSuchLanguage");
        assert_eq!(spans, vec![(Style::default(), "plain words".to_string())]);
    }
}
