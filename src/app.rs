use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::editor::{EditorPane, EditorRequest};
use crate::error::ContentError;
use crate::event::Event;
use crate::handler;
use crate::jobs::Command;
use crate::layout::PaneLayout;
use crate::nav::NavPane;
use crate::resource::ResourceRef;
use crate::theme::{resolve_theme, ThemeColors};
use crate::viewer::{ContentRenderer, ViewerRegistry};

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Which pane receives keys while browsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaneFocus {
    #[default]
    Nav,
    Content,
}

/// Application mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Browsing,
    /// The editor owns the keyboard.
    Editing,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Main application state.
pub struct App {
    pub nav: NavPane,
    pub viewer: ViewerRegistry,
    pub editor: EditorPane,
    pub mode: AppMode,
    pub focus: PaneFocus,
    pub layout: PaneLayout,
    /// Last resource opened from the navigator.
    pub selected: Option<ResourceRef>,
    pub theme: ThemeColors,
    pub status_message: Option<StatusMessage>,
    pub should_quit: bool,
    nav_ratio: f64,
    exit_on_save_error: bool,
}

impl App {
    pub fn new(root: PathBuf, config: &AppConfig) -> Self {
        let mut nav = NavPane::new(root, config.show_hidden());
        nav.set_focused(true);
        Self {
            nav,
            viewer: ViewerRegistry::new(),
            editor: EditorPane::default(),
            mode: AppMode::Browsing,
            focus: PaneFocus::Nav,
            layout: PaneLayout::default(),
            selected: None,
            theme: resolve_theme(&config.theme),
            status_message: None,
            should_quit: false,
            nav_ratio: config.nav_ratio(),
            exit_on_save_error: config.exit_on_save_error(),
        }
    }

    /// Handle one event to completion. Returned commands are side effects
    /// for the caller to run in the background.
    pub fn handle_event(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Key(key) => handler::handle_key_event(self, key),
            Event::Tick => {
                self.clear_expired_status();
                Vec::new()
            }
            Event::Resize(width, height) => {
                self.resize(Rect::new(0, 0, width, height));
                Vec::new()
            }
            Event::ContentLoaded(loaded) => {
                self.viewer.apply(loaded);
                Vec::new()
            }
            Event::EditorOpened { path, result } => {
                if self.mode == AppMode::Editing {
                    self.editor.finish_open(&path, result);
                } else {
                    debug!(path = %path.display(), "editor content arrived after edit ended");
                }
                Vec::new()
            }
            Event::EditorSaved { path, seq, result } => self.on_saved(path, seq, result),
        }
    }

    /// Recompute the split and hand every pane its new size, visible or not.
    pub fn resize(&mut self, area: Rect) {
        self.layout = PaneLayout::compute(area, self.nav_ratio);
        let (nav_w, nav_h) = self.layout.nav_inner();
        let (content_w, content_h) = self.layout.content_inner();
        self.nav.set_extent(nav_w, nav_h);
        self.viewer.set_extent(content_w, content_h);
        self.editor.set_extent(content_w, content_h);
        debug!(width = area.width, height = area.height, "resized");
    }

    pub fn cycle_focus(&mut self) {
        if self.mode != AppMode::Browsing {
            return;
        }
        self.focus = match self.focus {
            PaneFocus::Nav => PaneFocus::Content,
            PaneFocus::Content => PaneFocus::Nav,
        };
        self.nav.set_focused(self.focus == PaneFocus::Nav);
        self.viewer.set_focused(self.focus == PaneFocus::Content);
        debug!(focus = ?self.focus, "focus changed");
    }

    /// Show `resource` in the content pane.
    pub fn open_resource(&mut self, resource: ResourceRef) -> Command {
        self.selected = Some(resource.clone());
        Command::Load(self.viewer.dispatch(resource))
    }

    pub fn can_enter_edit(&self) -> bool {
        self.mode == AppMode::Browsing
            && self.focus == PaneFocus::Content
            && self
                .selected
                .as_ref()
                .is_some_and(ResourceRef::is_editable_text)
    }

    /// Switch to editing the selected resource. `None` when editing is not
    /// allowed right now.
    pub fn enter_edit(&mut self) -> Option<Command> {
        if !self.can_enter_edit() {
            return None;
        }
        let path = self.selected.as_ref()?.path().to_path_buf();
        self.mode = AppMode::Editing;
        self.viewer.set_focused(false);
        self.editor.open(path.clone());
        info!(path = %path.display(), "entering edit mode");
        Some(Command::OpenFile(path))
    }

    pub fn handle_editor_request(&mut self, request: EditorRequest) -> Vec<Command> {
        match request {
            EditorRequest::Save {
                path,
                contents,
                seq,
            } => {
                debug!(path = %path.display(), seq, bytes = contents.len(), "saving");
                vec![Command::SaveFile {
                    path,
                    contents,
                    seq,
                }]
            }
            EditorRequest::Cancel { path } => {
                info!(path = %path.display(), "edit cancelled");
                self.exit_edit();
                Vec::new()
            }
        }
    }

    fn on_saved(
        &mut self,
        path: PathBuf,
        seq: u64,
        result: Result<(), ContentError>,
    ) -> Vec<Command> {
        if self.mode != AppMode::Editing
            || self.editor.path() != Some(path.as_path())
            || !self.editor.expects_save(seq)
        {
            debug!(path = %path.display(), seq, "discarding stale save completion");
            return Vec::new();
        }
        match result {
            Ok(()) => {
                info!(path = %path.display(), "saved, leaving edit mode");
                self.editor.save_succeeded();
                self.exit_edit();
                let resource = ResourceRef::new(path);
                self.set_status_message(format!("Saved {}", resource.file_name()));
                vec![self.open_resource(resource)]
            }
            Err(error) => {
                warn!(%error, "save failed");
                self.set_error_message(error.to_string());
                if self.exit_on_save_error {
                    self.exit_edit();
                } else {
                    self.editor.save_failed(error);
                }
                Vec::new()
            }
        }
    }

    /// Back to browsing with the content pane focused.
    fn exit_edit(&mut self) {
        self.mode = AppMode::Browsing;
        self.focus = PaneFocus::Content;
        self.editor.close();
        self.nav.set_focused(false);
        self.viewer.set_focused(true);
    }

    pub fn set_status_message(&mut self, text: String) {
        self.status_message = Some(StatusMessage {
            text,
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error_message(&mut self, text: String) {
        self.status_message = Some(StatusMessage {
            text,
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Clear the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self) {
        if let Some(msg) = &self.status_message {
            if msg.created.elapsed() >= STATUS_TTL {
                self.status_message = None;
            }
        }
    }

    /// Path shown in the status bar: the open resource when the content
    /// pane has focus, the navigator selection otherwise.
    pub fn focused_path(&self) -> Option<PathBuf> {
        match (self.mode, self.focus) {
            (AppMode::Editing, _) => self.editor.path().map(PathBuf::from),
            (AppMode::Browsing, PaneFocus::Content) => self
                .viewer
                .current()
                .resource()
                .map(|r| r.path().to_path_buf()),
            (AppMode::Browsing, PaneFocus::Nav) => self.nav.selected_path().map(PathBuf::from),
        }
    }

    pub fn quit(&mut self) {
        info!("quit requested");
        self.should_quit = true;
    }
}
