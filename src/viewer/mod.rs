//! Content viewers and the registry that picks one per resource.
//!
//! Renderers are a closed set of variants behind one capability trait. The
//! registry tries them in registration order and falls back to the text
//! viewer, which accepts anything. Loads run off the event loop; each
//! carries a [`LoadToken`] and only the token the registry is currently
//! waiting for is applied.

pub mod json;
pub mod markdown;
pub mod page;
pub mod text;

use crossterm::event::KeyEvent;
use ratatui::text::Line;
use syntect::highlighting::Theme;
use syntect::parsing::SyntaxSet;
use tracing::{debug, warn};

use crate::error::ContentError;
use crate::fs::operations;
use crate::resource::ResourceRef;

pub use json::JsonViewer;
pub use markdown::MarkdownViewer;
pub use text::TextViewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Markdown,
    Json,
    Text,
}

/// Identifies one load request. A completion is applied only if its token
/// equals the one the registry expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadToken {
    pub resource: ResourceRef,
    pub seq: u64,
}

/// Background work a renderer asks for when it starts loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub kind: RendererKind,
}

/// Rendered content, ready to hand to the renderer that asked for it.
#[derive(Debug)]
pub enum Content {
    Lines(Vec<Line<'static>>),
    Json(json::JsonTree),
}

/// Completion of a [`LoadRequest`].
#[derive(Debug)]
pub struct ContentLoaded {
    pub token: LoadToken,
    pub result: Result<Content, ContentError>,
}

/// Immutable state background loads share.
pub struct LoadContext {
    pub syntax_set: SyntaxSet,
    pub theme: Theme,
    pub markdown_wrap: usize,
}

impl LoadContext {
    pub fn new(syntax_theme: &str, markdown_wrap: usize) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_nonewlines(),
            theme: text::load_theme(syntax_theme),
            markdown_wrap,
        }
    }
}

/// Perform a load. Blocking; called from a background task.
pub fn run_load(request: &LoadRequest, ctx: &LoadContext) -> ContentLoaded {
    let path = request.token.resource.path();
    let result = match request.kind {
        RendererKind::Markdown => operations::read_text(path)
            .map(|source| Content::Lines(markdown::render(&source, ctx.markdown_wrap))),
        RendererKind::Json => json::load(path).map(Content::Json),
        RendererKind::Text => {
            text::load(path, &ctx.syntax_set, &ctx.theme).map(Content::Lines)
        }
    };
    ContentLoaded {
        token: request.token.clone(),
        result,
    }
}

/// Capabilities every renderer exposes to the registry.
pub trait ContentRenderer {
    fn kind(&self) -> RendererKind;

    fn can_handle(&self, resource: &ResourceRef) -> bool;

    /// The resource shown or being loaded, if any.
    fn resource(&self) -> Option<&ResourceRef>;

    /// Enter the loading state for `token.resource` and describe the work.
    fn begin_load(&mut self, token: LoadToken) -> LoadRequest;

    fn finish_load(&mut self, result: Result<Content, ContentError>);

    fn set_extent(&mut self, width: u16, height: u16);

    fn set_focused(&mut self, focused: bool);

    fn handle_key(&mut self, key: KeyEvent);

    /// Drop in-memory content.
    fn reset(&mut self);
}

type LinesResult = Result<Vec<Line<'static>>, ContentError>;

/// Narrow a completion to line content; `None` if it carried a tree.
fn lines_of(result: Result<Content, ContentError>) -> Option<LinesResult> {
    match result {
        Ok(Content::Lines(lines)) => Some(Ok(lines)),
        Ok(Content::Json(_)) => None,
        Err(e) => Some(Err(e)),
    }
}

impl ContentRenderer for MarkdownViewer {
    fn kind(&self) -> RendererKind {
        RendererKind::Markdown
    }

    fn can_handle(&self, resource: &ResourceRef) -> bool {
        MarkdownViewer::can_handle(self, resource)
    }

    fn resource(&self) -> Option<&ResourceRef> {
        self.page.resource.as_ref()
    }

    fn begin_load(&mut self, token: LoadToken) -> LoadRequest {
        self.page.begin(token.resource.clone());
        LoadRequest {
            token,
            kind: RendererKind::Markdown,
        }
    }

    fn finish_load(&mut self, result: Result<Content, ContentError>) {
        match lines_of(result) {
            Some(lines) => self.page.finish(lines),
            None => warn!("markdown viewer got non-line content"),
        }
    }

    fn set_extent(&mut self, width: u16, height: u16) {
        self.page.set_extent(width, height);
    }

    fn set_focused(&mut self, focused: bool) {
        self.page.focused = focused;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.page.handle_key(key);
    }

    fn reset(&mut self) {
        self.page.reset();
    }
}

impl ContentRenderer for TextViewer {
    fn kind(&self) -> RendererKind {
        RendererKind::Text
    }

    fn can_handle(&self, resource: &ResourceRef) -> bool {
        TextViewer::can_handle(self, resource)
    }

    fn resource(&self) -> Option<&ResourceRef> {
        self.page.resource.as_ref()
    }

    fn begin_load(&mut self, token: LoadToken) -> LoadRequest {
        self.page.begin(token.resource.clone());
        LoadRequest {
            token,
            kind: RendererKind::Text,
        }
    }

    fn finish_load(&mut self, result: Result<Content, ContentError>) {
        match lines_of(result) {
            Some(lines) => self.page.finish(lines),
            None => warn!("text viewer got non-line content"),
        }
    }

    fn set_extent(&mut self, width: u16, height: u16) {
        self.page.set_extent(width, height);
    }

    fn set_focused(&mut self, focused: bool) {
        self.page.focused = focused;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.page.handle_key(key);
    }

    fn reset(&mut self) {
        self.page.reset();
    }
}

impl ContentRenderer for JsonViewer {
    fn kind(&self) -> RendererKind {
        RendererKind::Json
    }

    fn can_handle(&self, resource: &ResourceRef) -> bool {
        JsonViewer::can_handle(self, resource)
    }

    fn resource(&self) -> Option<&ResourceRef> {
        self.resource.as_ref()
    }

    fn begin_load(&mut self, token: LoadToken) -> LoadRequest {
        self.begin(token.resource.clone());
        LoadRequest {
            token,
            kind: RendererKind::Json,
        }
    }

    fn finish_load(&mut self, result: Result<Content, ContentError>) {
        match result {
            Ok(Content::Json(tree)) => self.finish(Ok(tree)),
            Ok(Content::Lines(_)) => warn!("json viewer got line content"),
            Err(e) => self.finish(Err(e)),
        }
    }

    fn set_extent(&mut self, width: u16, height: u16) {
        JsonViewer::set_extent(self, width, height);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        JsonViewer::handle_key(self, key);
    }

    fn reset(&mut self) {
        JsonViewer::reset(self);
    }
}

/// One registered renderer.
#[derive(Debug)]
pub enum Renderer {
    Markdown(MarkdownViewer),
    Json(JsonViewer),
    Text(TextViewer),
}

impl Renderer {
    fn inner(&self) -> &dyn ContentRenderer {
        match self {
            Renderer::Markdown(v) => v,
            Renderer::Json(v) => v,
            Renderer::Text(v) => v,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ContentRenderer {
        match self {
            Renderer::Markdown(v) => v,
            Renderer::Json(v) => v,
            Renderer::Text(v) => v,
        }
    }
}

impl ContentRenderer for Renderer {
    fn kind(&self) -> RendererKind {
        self.inner().kind()
    }

    fn can_handle(&self, resource: &ResourceRef) -> bool {
        self.inner().can_handle(resource)
    }

    fn resource(&self) -> Option<&ResourceRef> {
        self.inner().resource()
    }

    fn begin_load(&mut self, token: LoadToken) -> LoadRequest {
        self.inner_mut().begin_load(token)
    }

    fn finish_load(&mut self, result: Result<Content, ContentError>) {
        self.inner_mut().finish_load(result);
    }

    fn set_extent(&mut self, width: u16, height: u16) {
        self.inner_mut().set_extent(width, height);
    }

    fn set_focused(&mut self, focused: bool) {
        self.inner_mut().set_focused(focused);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.inner_mut().handle_key(key);
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
    }
}

/// Ordered renderers plus the one currently shown.
#[derive(Debug)]
pub struct ViewerRegistry {
    /// Registration order; the last entry is the fallback.
    renderers: Vec<Renderer>,
    current: usize,
    expected: Option<LoadToken>,
    next_seq: u64,
    width: u16,
    height: u16,
    focused: bool,
}

impl Default for ViewerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerRegistry {
    pub fn new() -> Self {
        let renderers = vec![
            Renderer::Markdown(MarkdownViewer::default()),
            Renderer::Json(JsonViewer::default()),
            Renderer::Text(TextViewer::default()),
        ];
        let current = renderers.len() - 1;
        Self {
            renderers,
            current,
            expected: None,
            next_seq: 0,
            width: 0,
            height: 1,
            focused: false,
        }
    }

    pub fn current(&self) -> &Renderer {
        &self.renderers[self.current]
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.expected.is_some()
    }

    /// Index of the renderer `resource` goes to: the first that claims it,
    /// else the fallback.
    fn select_index(&self, resource: &ResourceRef) -> usize {
        let fallback = self.renderers.len() - 1;
        self.renderers[..fallback]
            .iter()
            .position(|r| r.can_handle(resource))
            .unwrap_or(fallback)
    }

    /// Kind of renderer `resource` would be dispatched to.
    pub fn kind_for(&self, resource: &ResourceRef) -> RendererKind {
        self.renderers[self.select_index(resource)].kind()
    }

    /// Make the matching renderer current and start loading `resource`.
    /// Always reloads, even when the resource is already shown.
    pub fn dispatch(&mut self, resource: ResourceRef) -> LoadRequest {
        let index = self.select_index(&resource);
        if index != self.current {
            self.renderers[self.current].reset();
            self.current = index;
        }
        self.next_seq += 1;
        let token = LoadToken {
            resource,
            seq: self.next_seq,
        };
        self.expected = Some(token.clone());

        let (width, height, focused) = (self.width, self.height, self.focused);
        let renderer = &mut self.renderers[self.current];
        renderer.set_extent(width, height);
        renderer.set_focused(focused);
        debug!(
            path = %token.resource.path().display(),
            kind = ?renderer.kind(),
            seq = token.seq,
            "dispatching resource"
        );
        renderer.begin_load(token)
    }

    /// Apply a completion. Returns false, and changes nothing, when the
    /// completion is not the one currently expected.
    pub fn apply(&mut self, loaded: ContentLoaded) -> bool {
        if self.expected.as_ref() != Some(&loaded.token) {
            debug!(
                path = %loaded.token.resource.path().display(),
                seq = loaded.token.seq,
                "discarding stale load"
            );
            return false;
        }
        self.expected = None;
        if let Err(e) = &loaded.result {
            warn!(error = %e, "content load failed");
        }
        self.renderers[self.current].finish_load(loaded.result);
        true
    }

    /// Propagate a new extent to every renderer so a later switch finds it
    /// already sized.
    pub fn set_extent(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        for renderer in &mut self.renderers {
            renderer.set_extent(width, height);
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.renderers[self.current].set_focused(focused);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.renderers[self.current].handle_key(key);
    }
}
