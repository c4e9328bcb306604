use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::error::ContentError;
use crate::theme::ThemeColors;
use crate::viewer::page::{LinePage, PageState};

pub const PLACEHOLDER: &str = "Select a file to view";
pub const LOADING: &str = "Loading…";

/// Write a one-line notice at the top of `area`.
pub fn render_notice(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let line = Line::from(Span::styled(text.to_string(), style));
    buf.set_line(area.x, area.y, &line, area.width);
}

pub fn render_error(error: &ContentError, theme: &ThemeColors, area: Rect, buf: &mut Buffer) {
    render_notice(
        &format!("Error: {error}"),
        Style::default().fg(theme.error_fg),
        area,
        buf,
    );
}

/// Scrollable page of the text and markdown viewers.
pub struct PreviewWidget<'a> {
    page: &'a LinePage,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(page: &'a LinePage, theme: &'a ThemeColors) -> Self {
        Self {
            page,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }
}

impl<'a> Widget for PreviewWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = super::render_block(self.block, area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let dim = Style::default().fg(self.theme.placeholder_fg);
        match &self.page.state {
            PageState::Empty => render_notice(PLACEHOLDER, dim, inner, buf),
            PageState::Loading => render_notice(LOADING, dim, inner, buf),
            PageState::Failed(error) => render_error(error, self.theme, inner, buf),
            PageState::Ready(lines) => {
                let range = self.page.viewport.visible_range(lines.len());
                for (row, line) in lines[range].iter().take(inner.height as usize).enumerate() {
                    buf.set_line(inner.x, inner.y + row as u16, line, inner.width);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::row_text;
    use crate::resource::ResourceRef;
    use crate::theme;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::widgets::Borders;
    use std::path::Path;

    fn render(page: &LinePage, width: u16, height: u16) -> Buffer {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(page, &tc)
            .block(Block::default().borders(Borders::ALL).title(" a.txt "))
            .render(area, &mut buf);
        buf
    }

    #[test]
    fn test_placeholder_before_selection() {
        let page = LinePage::default();
        let buf = render(&page, 30, 4);
        assert!(row_text(&buf, 1).contains(PLACEHOLDER));
    }

    #[test]
    fn test_loading_and_error_states() {
        let mut page = LinePage::default();
        page.begin(ResourceRef::new("/tmp/a.txt"));
        assert!(row_text(&render(&page, 30, 4), 1).contains("Loading…"));

        page.finish(Err(ContentError::load(Path::new("/tmp/a.txt"), "gone")));
        let buf = render(&page, 60, 4);
        assert!(row_text(&buf, 1).contains("Error: cannot read /tmp/a.txt: gone"));
        assert!(row_text(&buf, 0).contains("a.txt"));
    }

    #[test]
    fn test_shows_scrolled_window() {
        let mut page = LinePage {
            focused: true,
            ..LinePage::default()
        };
        page.begin(ResourceRef::new("/tmp/a.txt"));
        page.finish(Ok((0..10).map(|i| Line::from(format!("line {i}"))).collect()));
        page.set_extent(18, 3);
        page.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        page.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));

        let buf = render(&page, 20, 5);
        assert_eq!(row_text(&buf, 1), "│line 2            │");
        assert_eq!(row_text(&buf, 3), "│line 4            │");
    }
}
