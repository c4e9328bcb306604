use std::path::PathBuf;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::tree::{DirNode, EntryMeta, NodeType};
use crate::theme::ThemeColors;
use crate::tree::TreeView;

/// Directory tree of the navigator pane.
pub struct TreeWidget<'a> {
    view: &'a TreeView<PathBuf, EntryMeta>,
    theme: &'a ThemeColors,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(view: &'a TreeView<PathBuf, EntryMeta>, theme: &'a ThemeColors) -> Self {
        Self {
            view,
            theme,
            focused: false,
            block: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    fn indicator(node: &DirNode) -> &'static str {
        match node.data.node_type {
            NodeType::Directory if node.expanded => "▾ ",
            NodeType::Directory => "▸ ",
            NodeType::Symlink => "↪ ",
            NodeType::File => "  ",
        }
    }

    fn style_for(&self, node: &DirNode, selected: bool) -> Style {
        if selected {
            let bg = if self.focused {
                self.theme.selected_bg
            } else {
                self.theme.selected_dim_bg
            };
            return Style::default()
                .bg(bg)
                .fg(self.theme.selected_fg)
                .add_modifier(Modifier::BOLD);
        }
        if node.data.is_hidden {
            return Style::default().fg(self.theme.nav_hidden_fg);
        }
        match node.data.node_type {
            NodeType::Directory => Style::default()
                .fg(self.theme.nav_dir_fg)
                .add_modifier(Modifier::BOLD),
            NodeType::Symlink => Style::default().fg(self.theme.nav_link_fg),
            NodeType::File => Style::default().fg(self.theme.nav_fg),
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = super::render_block(self.block.clone(), area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.view.is_empty() {
            let line = Line::from(Span::styled(
                "(empty)",
                Style::default().fg(self.theme.placeholder_fg),
            ));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        }

        let cursor = self.view.viewport().cursor();
        for (row, (index, entry)) in self.view.window().enumerate() {
            let y = inner.y + row as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let node = entry.node;
            let selected = index == cursor;
            let style = self.style_for(node, selected);
            let text = format!(
                "{}{}{}",
                "  ".repeat(entry.depth),
                Self::indicator(node),
                node.label
            );
            if selected {
                // Highlight the full row, not only the label.
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), style);
            }
            buf.set_line(inner.x, y, &Line::from(Span::styled(text, style)), inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::row_text;
    use crate::fs::tree::DirLister;
    use crate::theme;
    use ratatui::widgets::Borders;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn view_of(dir: &TempDir, height: usize) -> TreeView<PathBuf, EntryMeta> {
        TreeView::new(DirLister::default().build(dir.path()), height)
    }

    #[test]
    fn test_renders_indented_rows() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        File::create(dir.path().join("src").join("lib.rs")).unwrap();
        File::create(dir.path().join("Cargo.toml")).unwrap();
        let mut view = view_of(&dir, 5);
        view.toggle_selected_with(&DirLister::default());

        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&view, &tc)
            .block(Block::default().borders(Borders::ALL))
            .render(area, &mut buf);

        assert!(row_text(&buf, 1).starts_with("│▾ src"));
        assert!(row_text(&buf, 2).starts_with("│    lib.rs"));
        assert!(row_text(&buf, 3).starts_with("│  Cargo.toml"));
    }

    #[test]
    fn test_selected_row_uses_focus_color() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        let view = view_of(&dir, 3);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 10, 3);

        let mut buf = Buffer::empty(area);
        TreeWidget::new(&view, &tc).focused(true).render(area, &mut buf);
        assert_eq!(buf.cell((9, 0)).unwrap().bg, tc.selected_bg);

        let mut buf = Buffer::empty(area);
        TreeWidget::new(&view, &tc).render(area, &mut buf);
        assert_eq!(buf.cell((9, 0)).unwrap().bg, tc.selected_dim_bg);
    }

    #[test]
    fn test_window_follows_cursor() {
        let dir = TempDir::new().unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let mut view = view_of(&dir, 2);
        view.jump_to_end();
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&view, &tc).render(area, &mut buf);
        assert_eq!(row_text(&buf, 0).trim_end(), "  d");
        assert_eq!(row_text(&buf, 1).trim_end(), "  e");
    }

    #[test]
    fn test_empty_directory_placeholder() {
        let dir = TempDir::new().unwrap();
        let view = view_of(&dir, 3);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&view, &tc).render(area, &mut buf);
        assert_eq!(row_text(&buf, 0).trim_end(), "(empty)");
    }
}
