use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use super::preview::{render_error, render_notice, LOADING};
use crate::editor::{EditorLoad, EditorPane, EditorState};
use crate::theme::ThemeColors;

const HINTS: &str = "Ctrl+s save  Esc cancel";

/// Editor pane: numbered buffer lines plus a one-row status line.
pub struct EditorWidget<'a> {
    pane: &'a EditorPane,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> EditorWidget<'a> {
    pub fn new(pane: &'a EditorPane, theme: &'a ThemeColors) -> Self {
        Self {
            pane,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_buffer(&self, state: &EditorState, area: Rect, buf: &mut Buffer) {
        let gutter_w = state.gutter_width();
        let code_x = area.x + gutter_w;
        let code_width = area.width.saturating_sub(gutter_w);
        let cursor_style = Style::default()
            .fg(self.theme.editor_cursor_fg)
            .bg(self.theme.editor_cursor_bg);

        let range = state.viewport().visible_range(state.line_count());
        for (row, line_idx) in range.take(area.height as usize).enumerate() {
            let y = area.y + row as u16;
            let is_current = line_idx == state.cursor_line;

            let gutter_style = if is_current {
                Style::default()
                    .fg(self.theme.editor_line_nr_current)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.editor_line_nr)
            };
            let number = format!("{:>w$} │", line_idx + 1, w = (gutter_w - 2) as usize);
            buf.set_string(area.x, y, number, gutter_style);

            if code_width == 0 {
                continue;
            }
            let text_style = if is_current {
                Style::default()
                    .fg(self.theme.nav_fg)
                    .bg(self.theme.editor_current_line_bg)
            } else {
                Style::default().fg(self.theme.nav_fg)
            };
            if is_current {
                buf.set_style(Rect::new(code_x, y, code_width, 1), text_style);
            }
            let line = Line::from(Span::styled(state.lines[line_idx].clone(), text_style));
            buf.set_line(code_x, y, &line, code_width);

            if is_current && (state.cursor_col as u16) < code_width {
                let cell_x = code_x + state.cursor_col as u16;
                if let Some(cell) = buf.cell_mut((cell_x, y)) {
                    cell.set_style(cursor_style);
                }
            }
        }
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let (text, style) = if let Some(error) = &self.pane.last_error {
            (
                format!("Save failed: {error}"),
                Style::default().fg(self.theme.error_fg),
            )
        } else if self.pane.saving() {
            ("Saving…".to_string(), Style::default().fg(self.theme.dim_fg))
        } else {
            (HINTS.to_string(), Style::default().fg(self.theme.dim_fg))
        };
        render_notice(&text, style, area, buf);
    }
}

impl<'a> Widget for EditorWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = super::render_block(self.block.clone(), area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
        let status = Rect::new(inner.x, inner.y + body.height, inner.width, 1);

        match &self.pane.load {
            EditorLoad::Idle => {}
            EditorLoad::Loading(_) => render_notice(
                LOADING,
                Style::default().fg(self.theme.placeholder_fg),
                inner,
                buf,
            ),
            EditorLoad::Failed { error, .. } => {
                render_error(error, self.theme, inner, buf);
                render_notice(
                    "Esc close",
                    Style::default().fg(self.theme.dim_fg),
                    status,
                    buf,
                );
            }
            EditorLoad::Ready(state) => {
                self.render_buffer(state, body, buf);
                self.render_status(status, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::row_text;
    use crate::error::ContentError;
    use crate::theme;
    use std::path::{Path, PathBuf};

    fn ready(content: &str, height: u16) -> EditorPane {
        let mut pane = EditorPane::default();
        pane.set_extent(30, height);
        pane.open(PathBuf::from("/tmp/a.txt"));
        pane.finish_open(Path::new("/tmp/a.txt"), Ok(content.to_string()));
        pane
    }

    fn render(pane: &EditorPane, height: u16) -> Buffer {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 30, height);
        let mut buf = Buffer::empty(area);
        EditorWidget::new(pane, &tc).render(area, &mut buf);
        buf
    }

    #[test]
    fn test_lines_with_gutter_and_hints() {
        let pane = ready("fn main() {}\n", 4);
        let buf = render(&pane, 4);
        assert_eq!(row_text(&buf, 0).trim_end(), "1 │fn main() {}");
        assert_eq!(row_text(&buf, 1).trim_end(), "2 │");
        assert_eq!(row_text(&buf, 3).trim_end(), HINTS);
    }

    #[test]
    fn test_cursor_cell_is_highlighted() {
        let mut pane = ready("abc", 3);
        pane.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Right,
            crossterm::event::KeyModifiers::NONE,
        ));
        let tc = theme::dark_theme();
        let buf = render(&pane, 3);
        // Gutter is "1 │", so column 1 of the text sits at x = 4.
        assert_eq!(buf.cell((4, 0)).unwrap().bg, tc.editor_cursor_bg);
        assert_eq!(buf.cell((3, 0)).unwrap().bg, tc.editor_current_line_bg);
    }

    #[test]
    fn test_save_error_replaces_hints() {
        let mut pane = ready("abc", 3);
        pane.save_failed(ContentError::persist(Path::new("/tmp/a.txt"), "denied"));
        let buf = render(&pane, 3);
        assert!(row_text(&buf, 2).starts_with("Save failed: cannot save"));
    }

    #[test]
    fn test_loading_notice() {
        let mut pane = EditorPane::default();
        pane.open(PathBuf::from("/tmp/a.txt"));
        let buf = render(&pane, 3);
        assert_eq!(row_text(&buf, 0).trim_end(), "Loading…");
    }
}
