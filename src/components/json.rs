use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use super::preview::{render_error, render_notice, LOADING, PLACEHOLDER};
use crate::theme::ThemeColors;
use crate::viewer::json::{summary, JsonKey, JsonNode, JsonState, JsonValue, JsonViewer};

/// Collapsible JSON tree.
pub struct JsonWidget<'a> {
    viewer: &'a JsonViewer,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> JsonWidget<'a> {
    pub fn new(viewer: &'a JsonViewer, theme: &'a ThemeColors) -> Self {
        Self {
            viewer,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    fn value_color(&self, value: &JsonValue) -> Style {
        let fg = match value {
            JsonValue::Object(_) | JsonValue::Array(_) => self.theme.json_marker_fg,
            JsonValue::String(_) => self.theme.json_string_fg,
            JsonValue::Number(_) => self.theme.json_number_fg,
            JsonValue::Bool(_) => self.theme.json_bool_fg,
            JsonValue::Null => self.theme.json_null_fg,
        };
        Style::default().fg(fg)
    }

    fn row(&self, node: &JsonNode, depth: usize) -> Line<'static> {
        let marker = match (node.has_children, node.expanded) {
            (true, true) => "▾ ",
            (true, false) => "▸ ",
            (false, _) => "  ",
        };
        let mut spans = vec![
            Span::raw("  ".repeat(depth)),
            Span::styled(marker, Style::default().fg(self.theme.json_marker_fg)),
        ];
        if node.data.key != JsonKey::Root {
            spans.push(Span::styled(
                node.label.clone(),
                Style::default().fg(self.theme.json_key_fg),
            ));
            spans.push(Span::raw(": "));
        }
        spans.push(Span::styled(summary(node), self.value_color(&node.data.value)));
        Line::from(spans)
    }
}

impl<'a> Widget for JsonWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = super::render_block(self.block.clone(), area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let dim = Style::default().fg(self.theme.placeholder_fg);
        let view = match &self.viewer.state {
            JsonState::Empty => return render_notice(PLACEHOLDER, dim, inner, buf),
            JsonState::Loading => return render_notice(LOADING, dim, inner, buf),
            JsonState::Failed(error) => return render_error(error, self.theme, inner, buf),
            JsonState::Ready(view) => view,
        };

        let cursor = view.viewport().cursor();
        for (row, (index, entry)) in view.window().enumerate() {
            let y = inner.y + row as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let line = self.row(entry.node, entry.depth);
            buf.set_line(inner.x, y, &line, inner.width);
            if index == cursor && self.viewer.focused {
                buf.set_style(
                    Rect::new(inner.x, y, inner.width, 1),
                    Style::default()
                        .bg(self.theme.selected_bg)
                        .add_modifier(Modifier::BOLD),
                );
            } else if index == cursor {
                buf.set_style(
                    Rect::new(inner.x, y, inner.width, 1),
                    Style::default().bg(self.theme.selected_dim_bg),
                );
            }
        }
    }
}
