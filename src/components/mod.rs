pub mod editor;
pub mod json;
pub mod preview;
pub mod status_bar;
pub mod tree;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Widget},
};

/// Render `block` if present and return the area inside it.
fn render_block(block: Option<Block<'_>>, area: Rect, buf: &mut Buffer) -> Rect {
    match block {
        Some(block) => {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        }
        None => area,
    }
}

/// Text of one buffer row, for widget tests.
#[cfg(test)]
pub(crate) fn row_text(buf: &Buffer, y: u16) -> String {
    (buf.area.x..buf.area.x + buf.area.width)
        .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
        .collect()
}
