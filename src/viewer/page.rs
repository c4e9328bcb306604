use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::Line;

use crate::error::ContentError;
use crate::resource::ResourceRef;
use crate::viewport::Viewport;

/// What a line-based viewer currently holds.
#[derive(Debug, Default)]
pub enum PageState {
    /// Nothing selected yet.
    #[default]
    Empty,
    Loading,
    Ready(Vec<Line<'static>>),
    Failed(ContentError),
}

/// Scrollable page of pre-rendered lines, shared by the text and markdown
/// viewers. The page shows no cursor: scrolling moves the window.
#[derive(Debug, Default)]
pub struct LinePage {
    pub resource: Option<ResourceRef>,
    pub state: PageState,
    pub viewport: Viewport,
    pub width: u16,
    pub focused: bool,
}

impl LinePage {
    pub fn line_count(&self) -> usize {
        match &self.state {
            PageState::Ready(lines) => lines.len(),
            _ => 0,
        }
    }

    pub fn lines(&self) -> &[Line<'static>] {
        match &self.state {
            PageState::Ready(lines) => lines,
            _ => &[],
        }
    }

    /// Forget the previous content and wait for `resource`.
    pub fn begin(&mut self, resource: ResourceRef) {
        self.resource = Some(resource);
        self.state = PageState::Loading;
        self.viewport.jump_to_start(0);
    }

    pub fn finish(&mut self, result: Result<Vec<Line<'static>>, ContentError>) {
        self.state = match result {
            Ok(lines) => PageState::Ready(lines),
            Err(e) => PageState::Failed(e),
        };
        self.viewport.jump_to_start(self.line_count());
    }

    pub fn reset(&mut self) {
        self.resource = None;
        self.state = PageState::Empty;
        self.viewport.jump_to_start(0);
    }

    pub fn set_extent(&mut self, width: u16, height: u16) {
        self.width = width;
        let total = self.line_count();
        self.viewport.resize(height as usize, total);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if !self.focused {
            return;
        }
        let total = self.line_count();
        let half = self.viewport.half_page() as isize;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.viewport.scroll_by(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.viewport.scroll_by(-1, total),
            KeyCode::Char('d') if ctrl => self.viewport.scroll_by(half, total),
            KeyCode::Char('u') if ctrl => self.viewport.scroll_by(-half, total),
            KeyCode::Char('d') | KeyCode::PageDown => self.viewport.scroll_by(half, total),
            KeyCode::Char('u') | KeyCode::PageUp => self.viewport.scroll_by(-half, total),
            KeyCode::Char('g') | KeyCode::Home => self.viewport.jump_to_start(total),
            KeyCode::Char('G') | KeyCode::End => self.viewport.jump_to_end(total),
            _ => {}
        }
    }
}
