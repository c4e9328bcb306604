use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

/// Keep the last `max` chars of `s`, marking the cut with `...`.
fn truncate_left(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().skip(len - max).collect();
    }
    let tail: String = s.chars().skip(len - (max - 3)).collect();
    format!("...{tail}")
}

/// Bottom row: mode badge, focused pane, path, then either key hints or a
/// transient status message.
pub struct StatusBarWidget<'a> {
    mode: &'a str,
    editing: bool,
    focus: &'a str,
    path_str: &'a str,
    hints: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: &'a str, focus: &'a str, path_str: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            mode,
            editing: false,
            focus,
            path_str,
            hints: "",
            theme,
            status_message: None,
            is_error: false,
        }
    }

    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    pub fn hints(mut self, hints: &'a str) -> Self {
        self.hints = hints;
        self
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        buf.set_style(
            area,
            Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg),
        );

        let badge_bg = if self.editing {
            self.theme.mode_edit_bg
        } else {
            self.theme.mode_browse_bg
        };
        let badge = format!(" {} ", self.mode);
        let focus = format!(" {} ", self.focus);
        let mut spans = vec![
            Span::styled(
                badge.clone(),
                Style::default()
                    .bg(badge_bg)
                    .fg(self.theme.mode_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(focus.clone(), Style::default().fg(self.theme.dim_fg)),
        ];
        let used = badge.chars().count() + focus.chars().count();
        let remaining = width.saturating_sub(used);

        let (right, right_style) = match self.status_message {
            Some(msg) if self.is_error => (msg, Style::default().fg(self.theme.error_fg)),
            Some(msg) => (msg, Style::default().fg(self.theme.success_fg)),
            None => (
                self.hints,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ),
        };
        // A status message wins over the path when space is short.
        let right = if self.status_message.is_some() {
            truncate_left(right, remaining)
        } else if right.chars().count() + 1 < remaining {
            right.to_string()
        } else {
            String::new()
        };
        let right_len = right.chars().count();
        let path_budget = remaining.saturating_sub(right_len + 1);
        let path = truncate_left(self.path_str, path_budget);
        let gap = remaining
            .saturating_sub(path.chars().count())
            .saturating_sub(right_len);

        spans.push(Span::raw(path));
        spans.push(Span::raw(" ".repeat(gap)));
        spans.push(Span::styled(right, right_style));
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
