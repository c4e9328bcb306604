//! Built-in color palettes (Catppuccin Mocha and Latte) and scheme lookup.

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Every color the UI draws with.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    // Navigator
    pub nav_fg: Color,
    pub nav_dir_fg: Color,
    pub nav_hidden_fg: Color,
    pub nav_link_fg: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    /// Cursor row of an unfocused pane.
    pub selected_dim_bg: Color,

    // Viewer
    pub title_fg: Color,
    pub placeholder_fg: Color,
    pub json_key_fg: Color,
    pub json_string_fg: Color,
    pub json_number_fg: Color,
    pub json_bool_fg: Color,
    pub json_null_fg: Color,
    pub json_marker_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,
    pub mode_browse_bg: Color,
    pub mode_edit_bg: Color,
    pub mode_fg: Color,

    // Borders
    pub border_fg: Color,
    pub border_focused_fg: Color,

    // Editor
    pub editor_line_nr: Color,
    pub editor_line_nr_current: Color,
    pub editor_cursor_fg: Color,
    pub editor_cursor_bg: Color,
    pub editor_current_line_bg: Color,
    pub editor_modified_fg: Color,

    // Semantic
    pub error_fg: Color,
    pub success_fg: Color,
    pub dim_fg: Color,
}

pub fn dark_theme() -> ThemeColors {
    let text = Color::Rgb(205, 214, 244); // #cdd6f4
    let base = Color::Rgb(30, 30, 46); // #1e1e2e
    let surface0 = Color::Rgb(49, 50, 68); // #313244
    let surface1 = Color::Rgb(69, 71, 90); // #45475a
    let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
    let blue = Color::Rgb(137, 180, 250); // #89b4fa
    let green = Color::Rgb(166, 227, 161); // #a6e3a1
    let yellow = Color::Rgb(249, 226, 175); // #f9e2af
    let peach = Color::Rgb(250, 179, 135); // #fab387
    let red = Color::Rgb(243, 139, 168); // #f38ba8
    let mauve = Color::Rgb(203, 166, 247); // #cba6f7
    let teal = Color::Rgb(148, 226, 213); // #94e2d5
    let sky = Color::Rgb(137, 220, 235); // #89dceb

    ThemeColors {
        nav_fg: text,
        nav_dir_fg: blue,
        nav_hidden_fg: overlay0,
        nav_link_fg: teal,
        selected_bg: surface1,
        selected_fg: text,
        selected_dim_bg: surface0,

        title_fg: blue,
        placeholder_fg: overlay0,
        json_key_fg: sky,
        json_string_fg: green,
        json_number_fg: peach,
        json_bool_fg: mauve,
        json_null_fg: overlay0,
        json_marker_fg: overlay0,

        status_bg: base,
        status_fg: text,
        mode_browse_bg: blue,
        mode_edit_bg: peach,
        mode_fg: base,

        border_fg: Color::Rgb(88, 91, 112), // #585b70
        border_focused_fg: blue,

        editor_line_nr: overlay0,
        editor_line_nr_current: yellow,
        editor_cursor_fg: base,
        editor_cursor_bg: text,
        editor_current_line_bg: surface0,
        editor_modified_fg: yellow,

        error_fg: red,
        success_fg: green,
        dim_fg: overlay0,
    }
}

pub fn light_theme() -> ThemeColors {
    let text = Color::Rgb(76, 79, 105); // #4c4f69
    let base = Color::Rgb(239, 241, 245); // #eff1f5
    let surface0 = Color::Rgb(230, 233, 239); // #e6e9ef
    let surface1 = Color::Rgb(204, 208, 218); // #ccd0da
    let overlay0 = Color::Rgb(156, 160, 176); // #9ca0b0
    let blue = Color::Rgb(30, 102, 245); // #1e66f5
    let green = Color::Rgb(64, 160, 43); // #40a02b
    let yellow = Color::Rgb(223, 142, 29); // #df8e1d
    let peach = Color::Rgb(254, 100, 11); // #fe640b
    let red = Color::Rgb(210, 15, 57); // #d20f39
    let mauve = Color::Rgb(136, 57, 239); // #8839ef
    let teal = Color::Rgb(23, 146, 153); // #179299
    let sapphire = Color::Rgb(32, 159, 181); // #209fb5

    ThemeColors {
        nav_fg: text,
        nav_dir_fg: blue,
        nav_hidden_fg: overlay0,
        nav_link_fg: teal,
        selected_bg: surface1,
        selected_fg: text,
        selected_dim_bg: surface0,

        title_fg: blue,
        placeholder_fg: overlay0,
        json_key_fg: sapphire,
        json_string_fg: green,
        json_number_fg: peach,
        json_bool_fg: mauve,
        json_null_fg: overlay0,
        json_marker_fg: overlay0,

        status_bg: base,
        status_fg: text,
        mode_browse_bg: blue,
        mode_edit_bg: peach,
        mode_fg: base,

        border_fg: Color::Rgb(172, 176, 190), // #acb0be
        border_focused_fg: blue,

        editor_line_nr: overlay0,
        editor_line_nr_current: yellow,
        editor_cursor_fg: base,
        editor_cursor_bg: text,
        editor_current_line_bg: surface0,
        editor_modified_fg: yellow,

        error_fg: red,
        success_fg: green,
        dim_fg: overlay0,
    }
}

/// Palette for the configured scheme. Unknown names get the dark palette.
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref() {
        Some("light") => light_theme(),
        Some("dark") | None => dark_theme(),
        Some(other) => {
            tracing::warn!(scheme = other, "unknown theme scheme, using dark");
            dark_theme()
        }
    }
}
