use ratatui::{
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode, PaneFocus};
use crate::components::editor::EditorWidget;
use crate::components::json::JsonWidget;
use crate::components::preview::PreviewWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::theme::ThemeColors;
use crate::viewer::{ContentRenderer, Renderer};

const BROWSE_HINTS: &str = "Tab focus  Enter open  e edit  q quit";
const EDIT_HINTS: &str = "Ctrl+s save  Esc cancel  Ctrl+c quit";

fn pane_block<'a>(title: String, focused: bool, theme: &ThemeColors) -> Block<'a> {
    let border = if focused {
        theme.border_focused_fg
    } else {
        theme.border_fg
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
        .title_style(Style::default().fg(theme.title_fg))
}

/// Render the application UI.
pub fn render(app: &App, frame: &mut Frame) {
    let layout = app.layout;
    let theme = &app.theme;
    let editing = app.mode == AppMode::Editing;
    let nav_focused = !editing && app.focus == PaneFocus::Nav;

    let nav_title = format!(" {} ", app.nav.root().display());
    let tree = TreeWidget::new(app.nav.view(), theme)
        .focused(nav_focused)
        .block(pane_block(nav_title, nav_focused, theme));
    frame.render_widget(tree, layout.nav);

    if editing {
        let name = app
            .editor
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let modified = app.editor.state().is_some_and(|s| s.modified);
        let block = if modified {
            pane_block(format!(" {name} [+] "), true, theme)
                .title_style(Style::default().fg(theme.editor_modified_fg))
        } else {
            pane_block(format!(" {name} "), true, theme)
        };
        let editor = EditorWidget::new(&app.editor, theme).block(block);
        frame.render_widget(editor, layout.content);
    } else {
        let renderer = app.viewer.current();
        let title = renderer
            .resource()
            .map(|r| format!(" {} ", r.file_name()))
            .unwrap_or_else(|| " Viewer ".to_string());
        let block = pane_block(title, !nav_focused, theme);
        match renderer {
            Renderer::Json(viewer) => {
                frame.render_widget(JsonWidget::new(viewer, theme).block(block), layout.content)
            }
            Renderer::Markdown(viewer) => frame.render_widget(
                PreviewWidget::new(&viewer.page, theme).block(block),
                layout.content,
            ),
            Renderer::Text(viewer) => frame.render_widget(
                PreviewWidget::new(&viewer.page, theme).block(block),
                layout.content,
            ),
        }
    }

    let (mode, focus, hints) = match (app.mode, app.focus) {
        (AppMode::Editing, _) => ("EDIT", "editor", EDIT_HINTS),
        (AppMode::Browsing, PaneFocus::Nav) => ("BROWSE", "nav", BROWSE_HINTS),
        (AppMode::Browsing, PaneFocus::Content) => ("BROWSE", "content", BROWSE_HINTS),
    };
    let path = app
        .focused_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let mut status = StatusBarWidget::new(mode, focus, &path, theme)
        .editing(editing)
        .hints(hints);
    if let Some(msg) = &app.status_message {
        status = status.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(status, layout.status);
}
