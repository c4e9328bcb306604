//! Cursor and scroll-offset math shared by every list-like pane.
//!
//! A `Viewport` never stores the item count: callers pass the current
//! `total` on every operation, so the same state survives a tree being
//! re-flattened or a buffer being reloaded. Inputs are clamped, never
//! rejected. After any operation, with `rows = max(height, 1)`:
//!
//! - `cursor < total` when `total > 0`, otherwise `cursor == 0`
//! - `offset <= cursor < offset + rows` when `total > 0`
//! - `offset <= max(0, total - rows)`

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    cursor: usize,
    offset: usize,
    height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            height,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of rows the window shows. A zero height still shows one row.
    fn rows(&self) -> usize {
        self.height.max(1)
    }

    /// Move the cursor by `delta`, then shift the window the minimum amount
    /// needed to keep the cursor inside it.
    pub fn move_by(&mut self, delta: isize, total: usize) {
        self.cursor = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as usize)
        };
        self.clamp(total);
    }

    /// Place the cursor on an absolute index.
    pub fn select(&mut self, index: usize, total: usize) {
        self.cursor = index;
        self.clamp(total);
    }

    pub fn jump_to_start(&mut self, total: usize) {
        self.select(0, total);
    }

    pub fn jump_to_end(&mut self, total: usize) {
        self.select(total.saturating_sub(1), total);
    }

    /// Half a page, rounded up.
    pub fn half_page(&self) -> usize {
        self.rows().div_ceil(2)
    }

    pub fn half_page_down(&mut self, total: usize) {
        self.move_by(self.half_page() as isize, total);
    }

    pub fn half_page_up(&mut self, total: usize) {
        self.move_by(-(self.half_page() as isize), total);
    }

    /// Move the window itself; the cursor is dragged along only as far as
    /// needed to stay visible. Used by panes that show no cursor.
    pub fn scroll_by(&mut self, delta: isize, total: usize) {
        let max_offset = total.saturating_sub(self.rows());
        self.offset = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as usize)
        }
        .min(max_offset);

        if self.cursor < self.offset {
            self.cursor = self.offset;
        } else if self.cursor >= self.offset + self.rows() {
            self.cursor = self.offset + self.rows() - 1;
        }
        self.clamp(total);
    }

    /// Change the window height and re-clamp so a short list leaves no dead
    /// space at the end.
    pub fn resize(&mut self, height: usize, total: usize) {
        self.height = height;
        self.clamp(total);
    }

    /// Restore the invariants for the current `total`.
    pub fn clamp(&mut self, total: usize) {
        if total == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        let rows = self.rows();
        self.cursor = self.cursor.min(total - 1);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + rows {
            self.offset = self.cursor + 1 - rows;
        }
        self.offset = self.offset.min(total.saturating_sub(rows));
    }

    /// Indices currently inside the window.
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let start = self.offset.min(total);
        let end = (self.offset + self.rows()).min(total);
        start..end
    }
}
