use ratatui::layout::Rect;

/// Screen split: navigator on the left, content on the right, status bar on
/// the last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneLayout {
    pub nav: Rect,
    pub content: Rect,
    pub status: Rect,
}

impl PaneLayout {
    /// `ratio` is the navigator's share of the width, already clamped.
    pub fn compute(area: Rect, ratio: f64) -> Self {
        let pane_height = area.height.saturating_sub(1);
        let nav_width = ((area.width as f64) * ratio).floor() as u16;
        let nav_width = nav_width.min(area.width);

        Self {
            nav: Rect::new(area.x, area.y, nav_width, pane_height),
            content: Rect::new(
                area.x + nav_width,
                area.y,
                area.width - nav_width,
                pane_height,
            ),
            status: Rect::new(
                area.x,
                area.y + pane_height,
                area.width,
                area.height.min(1),
            ),
        }
    }

    pub fn nav_inner(&self) -> (u16, u16) {
        inner_extent(self.nav)
    }

    pub fn content_inner(&self) -> (u16, u16) {
        inner_extent(self.content)
    }
}

/// Size inside a pane's border. The height never drops below one row.
pub fn inner_extent(pane: Rect) -> (u16, u16) {
    (
        pane.width.saturating_sub(2),
        pane.height.saturating_sub(2).max(1),
    )
}
