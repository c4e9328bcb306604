use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use super::page::LinePage;
use crate::error::ContentError;
use crate::fs::operations;
use crate::resource::ResourceRef;

pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

const TAB: &str = "    ";

/// Detect the syntax name for a file based on its extension.
pub fn detect_syntax_name(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("py") => "Python",
        Some("rs") => "Rust",
        Some("yaml" | "yml") => "YAML",
        Some("json") => "JSON",
        Some("sh" | "bash" | "zsh") => "Bourne Again Shell (bash)",
        Some("sql") => "SQL",
        Some("md" | "markdown") => "Markdown",
        Some("html" | "htm") => "HTML",
        Some("css") => "CSS",
        Some("js" | "jsx" | "ts" | "tsx") => "JavaScript",
        Some("c" | "h") => "C",
        Some("cpp" | "hpp" | "cc") => "C++",
        Some("java") => "Java",
        Some("go") => "Go",
        Some("rb") => "Ruby",
        Some("xml") => "XML",
        None => detect_from_shebang(path),
        _ => "Plain Text",
    }
}

/// Syntax for extensionless scripts, from their `#!` line.
fn detect_from_shebang(path: &Path) -> &'static str {
    let Ok(file) = fs::File::open(path) else {
        return "Plain Text";
    };
    let mut first_line = String::new();
    if BufReader::new(file).read_line(&mut first_line).is_err() || !first_line.starts_with("#!")
    {
        return "Plain Text";
    }
    let line = first_line.to_lowercase();
    if line.contains("python") {
        "Python"
    } else if line.contains("bash") || line.contains("/sh") {
        "Bourne Again Shell (bash)"
    } else if line.contains("ruby") {
        "Ruby"
    } else if line.contains("node") {
        "JavaScript"
    } else {
        "Plain Text"
    }
}

/// Load a theme from the built-in set by name, falling back to the default.
pub fn load_theme(name: &str) -> Theme {
    let mut themes = ThemeSet::load_defaults().themes;
    match themes.remove(name) {
        Some(theme) => theme,
        None => {
            tracing::warn!(theme = name, "unknown syntax theme, using default");
            themes.remove(DEFAULT_SYNTAX_THEME).unwrap_or_default()
        }
    }
}

/// Highlight `source` as the syntax of `path`, one styled line per source
/// line, each prefixed with a line-number gutter.
pub fn highlight(source: &str, path: &Path, ss: &SyntaxSet, theme: &Theme) -> Vec<Line<'static>> {
    let syntax = ss
        .find_syntax_by_name(detect_syntax_name(path))
        .or_else(|| ss.find_syntax_by_extension(path.extension()?.to_str()?))
        .unwrap_or_else(|| ss.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme);

    let total = source.lines().count();
    if total == 0 {
        return vec![Line::from(Span::styled(
            "(empty file)",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    let gutter = total.to_string().len();

    source
        .lines()
        .enumerate()
        .map(|(i, text)| {
            let mut spans = vec![Span::styled(
                format!("{:>gutter$} │ ", i + 1),
                Style::default().fg(Color::DarkGray),
            )];
            match highlighter.highlight_line(text, ss) {
                Ok(ranges) => spans.extend(ranges.into_iter().map(|(style, piece)| {
                    let fg = style.foreground;
                    Span::styled(
                        piece.replace('\t', TAB),
                        Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                    )
                })),
                Err(_) => spans.push(Span::raw(text.replace('\t', TAB))),
            }
            Line::from(spans)
        })
        .collect()
}

/// Read and highlight a file. Binary files yield a one-line notice.
pub fn load(
    path: &Path,
    ss: &SyntaxSet,
    theme: &Theme,
) -> Result<Vec<Line<'static>>, ContentError> {
    if operations::is_binary_file(path) {
        let size = fs::metadata(path)
            .map_err(|e| ContentError::load(path, e))?
            .len();
        return Ok(vec![Line::from(Span::styled(
            format!("[binary file, {size} bytes, not shown]"),
            Style::default().fg(Color::DarkGray),
        ))]);
    }
    let source = operations::read_text(path)?;
    Ok(highlight(&source, path, ss, theme))
}

/// Fallback renderer: accepts every resource.
#[derive(Debug, Default)]
pub struct TextViewer {
    pub page: LinePage,
}

impl TextViewer {
    pub fn can_handle(&self, _resource: &ResourceRef) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn detect_syntax_by_extension() {
        assert_eq!(detect_syntax_name(Path::new("foo.rs")), "Rust");
        assert_eq!(detect_syntax_name(Path::new("bar.PY")), "Python");
        assert_eq!(detect_syntax_name(Path::new("baz.yml")), "YAML");
        assert_eq!(detect_syntax_name(Path::new("file.xyz")), "Plain Text");
    }

    #[test]
    fn detect_shebang() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("script");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "#!/usr/bin/env python3").unwrap();
        assert_eq!(detect_syntax_name(&path), "Python");

        let plain = dir.path().join("data");
        fs::write(&plain, "just text\n").unwrap();
        assert_eq!(detect_syntax_name(&plain), "Plain Text");
    }

    #[test]
    fn unknown_theme_falls_back() {
        let theme = load_theme("nonexistent-theme");
        assert!(!theme.scopes.is_empty() || theme.settings.background.is_some());
    }

    #[test]
    fn highlight_adds_gutter_per_line() {
        let ss = SyntaxSet::load_defaults_nonewlines();
        let theme = load_theme(DEFAULT_SYNTAX_THEME);
        let lines = highlight("fn main() {\n\tx();\n}\n", Path::new("a.rs"), &ss, &theme);
        assert_eq!(lines.len(), 3);
        assert_eq!(text_of(&lines[0]), "1 │ fn main() {");
        assert_eq!(text_of(&lines[1]), "2 │     x();");
    }

    #[test]
    fn empty_source_shows_placeholder() {
        let ss = SyntaxSet::load_defaults_nonewlines();
        let theme = load_theme(DEFAULT_SYNTAX_THEME);
        let lines = highlight("", Path::new("a.txt"), &ss, &theme);
        assert_eq!(lines.len(), 1);
        assert!(text_of(&lines[0]).contains("empty file"));
    }

    #[test]
    fn load_reports_missing_file() {
        let ss = SyntaxSet::load_defaults_nonewlines();
        let theme = load_theme(DEFAULT_SYNTAX_THEME);
        let err = load(Path::new("/nonexistent/file.txt"), &ss, &theme).unwrap_err();
        assert!(matches!(err, ContentError::Load { .. }));
    }

    #[test]
    fn binary_file_gets_notice() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.dat");
        fs::write(&path, [0u8, 1, 2, 3]).unwrap();
        let ss = SyntaxSet::load_defaults_nonewlines();
        let theme = load_theme(DEFAULT_SYNTAX_THEME);
        let lines = load(&path, &ss, &theme).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(text_of(&lines[0]).contains("binary file, 4 bytes"));
    }

    #[test]
    fn fallback_accepts_anything() {
        let viewer = TextViewer::default();
        assert!(viewer.can_handle(&ResourceRef::new("/x/unknown.bin")));
        assert!(viewer.can_handle(&ResourceRef::new("/x/Makefile")));
    }
}
