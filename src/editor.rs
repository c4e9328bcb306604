use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::error::ContentError;
use crate::viewport::Viewport;

/// Line buffer being edited, with a char-based cursor.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    /// Whether the buffer differs from what was last loaded or saved.
    pub modified: bool,
    pub file_path: PathBuf,
    /// `"\r\n"` when the file was loaded with CRLF endings.
    line_ending: &'static str,
    viewport: Viewport,
}

impl EditorState {
    pub fn new(content: &str, file_path: PathBuf) -> Self {
        let mut lines: Vec<String> = content.lines().map(String::from).collect();
        // A trailing newline becomes an empty last line so it survives a save.
        if content.ends_with('\n') || lines.is_empty() {
            lines.push(String::new());
        }
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            lines,
            cursor_line: 0,
            cursor_col: 0,
            modified: false,
            file_path,
            line_ending,
            viewport: Viewport::new(1),
        }
    }

    /// Buffer text as it would be written to disk.
    pub fn contents(&self) -> String {
        self.lines.join(self.line_ending)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Width of the line number gutter: digits plus ` │`.
    pub fn gutter_width(&self) -> u16 {
        self.line_count().to_string().len() as u16 + 2
    }

    pub fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    pub fn resize(&mut self, height: usize) {
        self.viewport.resize(height, self.lines.len());
        self.sync_viewport();
    }

    fn clamp_cursor(&mut self) {
        self.cursor_line = self.cursor_line.min(self.lines.len().saturating_sub(1));
        self.cursor_col = self.cursor_col.min(self.current_line_len());
    }

    fn sync_viewport(&mut self) {
        self.viewport.select(self.cursor_line, self.lines.len());
    }

    pub fn insert_char(&mut self, ch: char) {
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let at = char_to_byte_index(line, self.cursor_col);
            line.insert(at, ch);
            self.cursor_col += 1;
            self.modified = true;
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    /// Split the line at the cursor, carrying the current line's leading
    /// whitespace onto the new line.
    pub fn insert_newline(&mut self) {
        let Some(line) = self.lines.get(self.cursor_line) else {
            return;
        };
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        let at = char_to_byte_index(line, self.cursor_col);
        let rest = format!("{indent}{}", &line[at..]);

        self.lines[self.cursor_line].truncate(at);
        self.lines.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_col = indent.chars().count();
        self.modified = true;
        self.sync_viewport();
    }

    /// Backspace: delete before the cursor, joining with the previous line
    /// at column 0.
    pub fn delete_char_before(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_line];
            let at = char_to_byte_index(line, self.cursor_col - 1);
            line.remove(at);
            self.cursor_col -= 1;
            self.modified = true;
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.lines[self.cursor_line].push_str(&current);
            self.modified = true;
            self.sync_viewport();
        }
    }

    /// Delete: remove the char under the cursor, joining the next line at
    /// end of line.
    pub fn delete_char_at(&mut self) {
        if self.cursor_col < self.current_line_len() {
            let line = &mut self.lines[self.cursor_line];
            let at = char_to_byte_index(line, self.cursor_col);
            line.remove(at);
            self.modified = true;
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
            self.modified = true;
            self.sync_viewport();
        }
    }

    /// Indent unit used by the buffer: a tab, or the first 2..=4 space
    /// indent found, else 4 spaces.
    pub fn detect_indent(&self) -> String {
        for line in self.lines.iter().take(50) {
            if line.starts_with('\t') {
                return "\t".to_string();
            }
            let spaces = line.chars().take_while(|c| *c == ' ').count();
            if (2..=4).contains(&spaces) {
                return " ".repeat(spaces);
            }
        }
        "    ".to_string()
    }

    pub fn insert_tab(&mut self) {
        let indent = self.detect_indent();
        self.insert_str(&indent);
    }

    pub fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor();
            self.sync_viewport();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.clamp_cursor();
            self.sync_viewport();
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.sync_viewport();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.sync_viewport();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn page_up(&mut self) {
        let jump = self.viewport.height().max(1);
        self.cursor_line = self.cursor_line.saturating_sub(jump);
        self.clamp_cursor();
        self.sync_viewport();
    }

    pub fn page_down(&mut self) {
        let jump = self.viewport.height().max(1);
        self.cursor_line += jump;
        self.clamp_cursor();
        self.sync_viewport();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(c) if !ctrl => self.insert_char(c),
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Backspace => self.delete_char_before(),
            KeyCode::Delete => self.delete_char_at(),
            KeyCode::Tab => self.insert_tab(),
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            _ => {}
        }
    }
}

fn char_to_byte_index(s: &str, char_col: usize) -> usize {
    s.char_indices()
        .nth(char_col)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Where the editor is in its open/save/cancel lifecycle.
#[derive(Debug, Default)]
pub enum EditorLoad {
    #[default]
    Idle,
    Loading(PathBuf),
    Ready(EditorState),
    Failed { path: PathBuf, error: ContentError },
}

/// What the editor asks the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorRequest {
    /// `seq` identifies this save; only its completion is accepted.
    Save {
        path: PathBuf,
        contents: String,
        seq: u64,
    },
    Cancel { path: PathBuf },
}

/// The inline editor pane. Content arrives through [`EditorPane::finish_open`]
/// and leaves through [`EditorRequest::Save`]; the pane never touches the
/// file system itself.
#[derive(Debug, Default)]
pub struct EditorPane {
    pub load: EditorLoad,
    pub last_error: Option<ContentError>,
    /// Sequence number of the save in flight.
    pending_save: Option<u64>,
    /// Last issued save sequence number. Never reset, so a completion from an
    /// earlier session cannot match a later one.
    save_seq: u64,
    height: u16,
}

impl EditorPane {
    pub fn path(&self) -> Option<&Path> {
        match &self.load {
            EditorLoad::Idle => None,
            EditorLoad::Loading(path) => Some(path),
            EditorLoad::Ready(state) => Some(&state.file_path),
            EditorLoad::Failed { path, .. } => Some(path),
        }
    }

    pub fn saving(&self) -> bool {
        self.pending_save.is_some()
    }

    /// Whether `seq` is the save this editor is waiting on.
    pub fn expects_save(&self, seq: u64) -> bool {
        self.pending_save == Some(seq)
    }

    pub fn state(&self) -> Option<&EditorState> {
        match &self.load {
            EditorLoad::Ready(state) => Some(state),
            _ => None,
        }
    }

    pub fn open(&mut self, path: PathBuf) {
        debug!(path = %path.display(), "editor opening");
        self.load = EditorLoad::Loading(path);
        self.pending_save = None;
        self.last_error = None;
    }

    /// Apply the raw content read for `path`. Returns false when the editor
    /// is no longer waiting for that path.
    pub fn finish_open(&mut self, path: &Path, result: Result<String, ContentError>) -> bool {
        match &self.load {
            EditorLoad::Loading(expected) if expected == path => {}
            _ => {
                debug!(path = %path.display(), "discarding stale editor content");
                return false;
            }
        }
        self.load = match result {
            Ok(content) => {
                let mut state = EditorState::new(&content, path.to_path_buf());
                state.resize(self.buffer_height());
                EditorLoad::Ready(state)
            }
            Err(error) => {
                warn!(%error, "editor could not open file");
                EditorLoad::Failed {
                    path: path.to_path_buf(),
                    error,
                }
            }
        };
        true
    }

    pub fn save_succeeded(&mut self) {
        self.pending_save = None;
        self.last_error = None;
        if let EditorLoad::Ready(state) = &mut self.load {
            state.modified = false;
        }
    }

    /// Keep the buffer and show why the save failed.
    pub fn save_failed(&mut self, error: ContentError) {
        self.pending_save = None;
        self.last_error = Some(error);
    }

    pub fn close(&mut self) {
        self.load = EditorLoad::Idle;
        self.pending_save = None;
        self.last_error = None;
    }

    /// Buffer rows: the pane's inner height minus the status line.
    fn buffer_height(&self) -> usize {
        (self.height as usize).saturating_sub(1).max(1)
    }

    pub fn set_extent(&mut self, _width: u16, height: u16) {
        self.height = height;
        let rows = self.buffer_height();
        if let EditorLoad::Ready(state) = &mut self.load {
            state.resize(rows);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<EditorRequest> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc {
            // The write cannot be recalled; wait for its outcome.
            if self.saving() {
                return None;
            }
            let path = self.path()?.to_path_buf();
            return Some(EditorRequest::Cancel { path });
        }
        let EditorLoad::Ready(state) = &mut self.load else {
            return None;
        };
        if ctrl && key.code == KeyCode::Char('s') {
            if self.pending_save.is_some() {
                return None;
            }
            self.save_seq += 1;
            self.pending_save = Some(self.save_seq);
            return Some(EditorRequest::Save {
                path: state.file_path.clone(),
                contents: state.contents(),
                seq: self.save_seq,
            });
        }
        state.handle_key(key);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn state(content: &str) -> EditorState {
        EditorState::new(content, PathBuf::from("/tmp/test.txt"))
    }

    fn ready_pane(content: &str) -> EditorPane {
        let mut pane = EditorPane::default();
        pane.set_extent(40, 6);
        pane.open(PathBuf::from("/tmp/test.txt"));
        assert!(pane.finish_open(Path::new("/tmp/test.txt"), Ok(content.to_string())));
        pane
    }

    #[test]
    fn test_trailing_newline_round_trips() {
        assert_eq!(state("hello\nworld\n").lines, ["hello", "world", ""]);
        assert_eq!(state("hello\nworld\n").contents(), "hello\nworld\n");
        assert_eq!(state("hello\nworld").contents(), "hello\nworld");
        assert_eq!(state("").lines, [""]);
    }

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut s = state("héllo");
        s.cursor_col = 2;
        s.insert_char('x');
        assert_eq!(s.lines[0], "héxllo");
        s.delete_char_before();
        s.delete_char_before();
        assert_eq!(s.lines[0], "hllo");
        assert_eq!(s.cursor_col, 1);
        assert!(s.modified);
    }

    #[test]
    fn test_backspace_at_line_start_joins() {
        let mut s = state("hello\nworld");
        s.move_down();
        s.delete_char_before();
        assert_eq!(s.lines, ["helloworld"]);
        assert_eq!((s.cursor_line, s.cursor_col), (0, 5));
    }

    #[test]
    fn test_delete_at_end_joins() {
        let mut s = state("ab\ncd");
        s.move_end();
        s.delete_char_at();
        assert_eq!(s.lines, ["abcd"]);
    }

    #[test]
    fn test_newline_keeps_indent() {
        let mut s = state("    let x = 1;");
        s.move_end();
        s.insert_newline();
        assert_eq!(s.lines, ["    let x = 1;", "    "]);
        assert_eq!((s.cursor_line, s.cursor_col), (1, 4));
    }

    #[test]
    fn test_tab_uses_buffer_indent() {
        let mut s = state("fn a() {\n  b();\n}");
        s.insert_tab();
        assert_eq!(s.lines[0], "  fn a() {");
        let mut tabs = state("\tx");
        tabs.insert_tab();
        assert_eq!(tabs.lines[0], "\t\tx");
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let mut s = state("long line\nab\nlonger line");
        s.move_end();
        s.move_down();
        assert_eq!(s.cursor_col, 2);
        s.move_right();
        assert_eq!((s.cursor_line, s.cursor_col), (2, 0));
        s.move_left();
        assert_eq!((s.cursor_line, s.cursor_col), (1, 2));
    }

    #[test]
    fn test_paging_keeps_cursor_visible() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let mut s = state(&text);
        s.resize(5);
        s.page_down();
        s.page_down();
        assert_eq!(s.cursor_line, 10);
        let range = s.viewport().visible_range(s.line_count());
        assert!(range.contains(&s.cursor_line));
        s.page_up();
        assert_eq!(s.cursor_line, 5);
    }

    #[test]
    fn test_ctrl_s_requests_save_once() {
        let mut pane = ready_pane("abc");
        pane.handle_key(key(KeyCode::End));
        pane.handle_key(key(KeyCode::Char('!')));
        assert_eq!(
            pane.handle_key(ctrl('s')),
            Some(EditorRequest::Save {
                path: PathBuf::from("/tmp/test.txt"),
                contents: "abc!".to_string(),
                seq: 1,
            })
        );
        assert!(pane.expects_save(1));
        assert!(pane.handle_key(ctrl('s')).is_none());
        pane.save_succeeded();
        assert!(!pane.state().unwrap().modified);
        assert!(matches!(
            pane.handle_key(ctrl('s')),
            Some(EditorRequest::Save { seq: 2, .. })
        ));
    }

    #[test]
    fn test_save_seq_survives_reopen() {
        let mut pane = ready_pane("abc");
        pane.handle_key(ctrl('s'));
        pane.save_failed(ContentError::persist(Path::new("/tmp/test.txt"), "busy"));
        pane.close();
        pane.open(PathBuf::from("/tmp/test.txt"));
        pane.finish_open(Path::new("/tmp/test.txt"), Ok("abc".to_string()));
        assert!(matches!(
            pane.handle_key(ctrl('s')),
            Some(EditorRequest::Save { seq: 2, .. })
        ));
        assert!(!pane.expects_save(1));
    }

    #[test]
    fn test_esc_waits_for_save_in_flight() {
        let mut pane = ready_pane("abc");
        pane.handle_key(ctrl('s'));
        assert!(pane.handle_key(key(KeyCode::Esc)).is_none());
        assert!(pane.saving());
        pane.save_failed(ContentError::persist(Path::new("/tmp/test.txt"), "busy"));
        assert!(matches!(
            pane.handle_key(key(KeyCode::Esc)),
            Some(EditorRequest::Cancel { .. })
        ));
    }

    #[test]
    fn test_crlf_endings_are_kept() {
        let s = state("one\r\ntwo\r\n");
        assert_eq!(s.lines, ["one", "two", ""]);
        assert_eq!(s.contents(), "one\r\ntwo\r\n");
        assert_eq!(state("one\ntwo").contents(), "one\ntwo");
    }

    #[test]
    fn test_save_failure_keeps_buffer() {
        let mut pane = ready_pane("abc");
        pane.handle_key(key(KeyCode::Char('x')));
        pane.handle_key(ctrl('s'));
        pane.save_failed(ContentError::persist(Path::new("/tmp/test.txt"), "read-only"));
        assert!(!pane.saving());
        assert!(pane.last_error.is_some());
        let state = pane.state().unwrap();
        assert_eq!(state.contents(), "xabc");
        assert!(state.modified);
    }

    #[test]
    fn test_esc_cancels_in_any_open_state() {
        let mut pane = ready_pane("abc");
        assert_eq!(
            pane.handle_key(key(KeyCode::Esc)),
            Some(EditorRequest::Cancel {
                path: PathBuf::from("/tmp/test.txt")
            })
        );

        let mut loading = EditorPane::default();
        loading.open(PathBuf::from("/tmp/b.txt"));
        assert!(matches!(
            loading.handle_key(key(KeyCode::Esc)),
            Some(EditorRequest::Cancel { .. })
        ));
        assert!(EditorPane::default().handle_key(key(KeyCode::Esc)).is_none());
    }

    #[test]
    fn test_stale_open_is_ignored() {
        let mut pane = EditorPane::default();
        pane.open(PathBuf::from("/tmp/new.txt"));
        assert!(!pane.finish_open(Path::new("/tmp/old.txt"), Ok("old".to_string())));
        assert!(matches!(pane.load, EditorLoad::Loading(_)));
    }

    #[test]
    fn test_open_failure_is_inline() {
        let mut pane = EditorPane::default();
        let path = Path::new("/tmp/missing.txt");
        pane.open(path.to_path_buf());
        pane.finish_open(path, Err(ContentError::load(path, "not found")));
        assert!(matches!(pane.load, EditorLoad::Failed { .. }));
        assert!(pane.handle_key(key(KeyCode::Char('a'))).is_none());
    }
}
