use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::page::LinePage;
use crate::resource::ResourceRef;

/// Minimum wrap width; narrower requests are widened to this.
const MIN_WRAP: usize = 20;

/// A run of non-whitespace text in one style. `space_before` records
/// whether whitespace separated it from the previous fragment.
struct Fragment {
    text: String,
    style: Style,
    space_before: bool,
}

/// Split styled spans into word fragments, tracking whitespace across span
/// boundaries so `foo **bar**` keeps its space and `foo**bar**` does not.
fn fragments(spans: Vec<Span<'static>>) -> Vec<Fragment> {
    let mut out = Vec::new();
    let mut pending_space = false;
    for span in spans {
        let mut word = String::new();
        for ch in span.content.chars() {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    out.push(Fragment {
                        text: std::mem::take(&mut word),
                        style: span.style,
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                word.push(ch);
            }
        }
        if !word.is_empty() {
            out.push(Fragment {
                text: word,
                style: span.style,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }
    out
}

/// Greedy word wrap. The first line starts with `first`, continuation
/// lines with `rest`; a fragment wider than the line is placed alone.
fn wrap(
    spans: Vec<Span<'static>>,
    first: Span<'static>,
    rest: Span<'static>,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current = vec![first.clone()];
    let mut used = first.width();
    let mut has_words = false;

    for frag in fragments(spans) {
        let frag_width = Span::raw(frag.text.as_str()).width();
        let gap = usize::from(frag.space_before && has_words);
        if has_words && frag.space_before && used + gap + frag_width > width {
            lines.push(Line::from(std::mem::replace(&mut current, vec![rest.clone()])));
            used = rest.width();
            current.push(Span::styled(frag.text, frag.style));
            used += frag_width;
            continue;
        }
        if gap == 1 {
            current.push(Span::raw(" "));
        }
        current.push(Span::styled(frag.text, frag.style));
        used += gap + frag_width;
        has_words = true;
    }
    if has_words || lines.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Bullet,
    Ordered(u64),
}

struct Writer {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<ListKind>,
    item_prefix: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
    link_url: Option<String>,
}

impl Writer {
    fn new(width: usize) -> Self {
        Self {
            width: width.max(MIN_WRAP),
            lines: Vec::new(),
            spans: Vec::new(),
            styles: vec![Style::default()],
            lists: Vec::new(),
            item_prefix: None,
            quote_depth: 0,
            in_code_block: false,
            link_url: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn indent(&self) -> String {
        let mut s = "│ ".repeat(self.quote_depth);
        s.push_str(&"  ".repeat(self.lists.len().saturating_sub(1)));
        s
    }

    fn blank(&mut self) {
        let last_blank = self.lines.last().is_none_or(|l| l.width() == 0);
        if !last_blank {
            self.lines.push(Line::default());
        }
    }

    /// Wrap pending spans into lines under the current block prefix.
    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let indent = self.indent();
        let marker = self.item_prefix.take().unwrap_or_default();
        let dim = Style::default().fg(Color::DarkGray);
        let first = Span::styled(format!("{indent}{marker}"), dim);
        let rest = Span::styled(format!("{indent}{}", " ".repeat(marker.chars().count())), dim);
        let spans = std::mem::take(&mut self.spans);
        self.lines.extend(wrap(spans, first, rest, self.width));
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            let style = Style::default().fg(Color::Yellow);
            let indent = self.indent();
            for line in text.lines() {
                self.lines.push(Line::from(vec![
                    Span::raw(format!("{indent}    ")),
                    Span::styled(line.replace('\t', "    "), style),
                ]));
            }
            return;
        }
        let style = self.style();
        self.spans.push(Span::styled(text.to_string(), style));
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.blank();
                let (color, depth) = match level {
                    HeadingLevel::H1 => (Color::Magenta, 1),
                    HeadingLevel::H2 => (Color::Cyan, 2),
                    HeadingLevel::H3 => (Color::Green, 3),
                    HeadingLevel::H4 => (Color::Blue, 4),
                    HeadingLevel::H5 => (Color::Blue, 5),
                    HeadingLevel::H6 => (Color::Blue, 6),
                };
                self.push_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
                let marker = format!("{} ", "#".repeat(depth));
                self.spans.push(Span::styled(marker, self.style()));
            }
            Tag::Paragraph => self.flush(),
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.blank();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(Line::from(Span::styled(
                            format!("{}  ```{lang}", self.indent()),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
                self.lists.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Bullet,
                });
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let m = format!("{n}. ");
                        *n += 1;
                        m
                    }
                    _ => "• ".to_string(),
                };
                self.item_prefix = Some(marker);
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.pop_style();
                self.blank();
            }
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.spans.push(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render markdown source into styled lines wrapped at `width` columns.
pub fn render(source: &str, width: usize) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = Writer::new(width);
    for event in Parser::new_ext(source, options) {
        match event {
            Event::Start(tag) => writer.start(tag),
            Event::End(tag) => writer.end(tag),
            Event::Text(text) => writer.text(&text),
            Event::Code(code) => writer
                .spans
                .push(Span::styled(code.to_string(), Style::default().fg(Color::Yellow))),
            Event::Html(html) | Event::InlineHtml(html) => {
                let style = Style::default().add_modifier(Modifier::DIM);
                writer.spans.push(Span::styled(html.trim_end().to_string(), style));
            }
            Event::SoftBreak => writer.text(" "),
            Event::HardBreak => writer.flush(),
            Event::Rule => {
                writer.flush();
                writer.blank();
                let rule = "─".repeat(writer.width.min(40));
                writer.lines.push(Line::from(Span::styled(
                    rule,
                    Style::default().fg(Color::DarkGray),
                )));
                writer.blank();
            }
            Event::TaskListMarker(done) => {
                writer.text(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }
    writer.finish()
}

/// Renderer for `.md` and `.markdown` resources.
#[derive(Debug, Default)]
pub struct MarkdownViewer {
    pub page: LinePage,
}

impl MarkdownViewer {
    pub fn can_handle(&self, resource: &ResourceRef) -> bool {
        matches!(resource.tag(), "md" | "markdown")
    }
}
