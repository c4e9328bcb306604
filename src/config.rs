//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--show-hidden`, `--log-file`)
//! 2. `--config <path>`
//! 3. `$DMC_NAV_CONFIG` environment variable (path to config file)
//! 4. Project-local `.dmc-nav.toml` in the current working directory
//! 5. Global `<config_dir>/dmc-nav/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// List dot-entries in the navigator.
    pub show_hidden: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    /// Share of the terminal width given to the navigator.
    pub nav_ratio: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
    /// Column at which rendered markdown is wrapped.
    pub markdown_wrap: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    /// Leave edit mode even when saving fails.
    pub exit_on_save_error: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark" or "light".
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub layout: LayoutConfig,
    pub viewer: ViewerConfig,
    pub editor: EditorConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
}

pub const DEFAULT_NAV_RATIO: f64 = 0.25;
pub const MIN_NAV_RATIO: f64 = 0.1;
pub const MAX_NAV_RATIO: f64 = 0.9;
pub const DEFAULT_MARKDOWN_WRAP: usize = 80;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Candidate config file paths in priority order, highest first.
///
/// Does NOT include the CLI `--config` path, that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("DMC_NAV_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".dmc-nav.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("dmc-nav").join("config.toml"));
    }

    paths
}

/// Read and parse a TOML config file. `Ok(None)` if the file does not
/// exist or cannot be read; `Err` carries a parse problem for the caller to
/// report once logging is up.
fn load_file(path: &Path) -> Result<Option<AppConfig>, String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Ok(None);
    };
    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|e| format!("failed to parse config file {}: {}", path.display(), e))
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`: `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
            },
            layout: LayoutConfig {
                nav_ratio: other.layout.nav_ratio.or(self.layout.nav_ratio),
            },
            viewer: ViewerConfig {
                syntax_theme: other
                    .viewer
                    .syntax_theme
                    .clone()
                    .or(self.viewer.syntax_theme),
                markdown_wrap: other.viewer.markdown_wrap.or(self.viewer.markdown_wrap),
            },
            editor: EditorConfig {
                exit_on_save_error: other
                    .editor
                    .exit_on_save_error
                    .or(self.editor.exit_on_save_error),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
            logging: LoggingConfig {
                file: other.logging.file.clone().or(self.logging.file),
                level: other.logging.level.clone().or(self.logging.level),
            },
        }
    }

    /// Load the final merged configuration, plus any problems met on the
    /// way (unparseable files are skipped).
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(
        cli_config_path: Option<&Path>,
        cli_overrides: Option<&AppConfig>,
    ) -> (AppConfig, Vec<String>) {
        let mut config = AppConfig::default();
        let mut warnings = Vec::new();

        let mut paths = candidate_paths();
        if let Some(cli_path) = cli_config_path {
            paths.insert(0, cli_path.to_path_buf());
        }

        // Lowest priority first so higher ones overwrite.
        for path in paths.iter().rev() {
            match load_file(path) {
                Ok(Some(file_cfg)) => config = config.merge(&file_cfg),
                Ok(None) => {}
                Err(warning) => warnings.push(warning),
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        (config, warnings)
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    /// Navigator width ratio, clamped to a usable range.
    pub fn nav_ratio(&self) -> f64 {
        let ratio = self.layout.nav_ratio.unwrap_or(DEFAULT_NAV_RATIO);
        if ratio.is_nan() {
            return DEFAULT_NAV_RATIO;
        }
        ratio.clamp(MIN_NAV_RATIO, MAX_NAV_RATIO)
    }

    pub fn syntax_theme_name(&self) -> &str {
        self.viewer
            .syntax_theme
            .as_deref()
            .unwrap_or(crate::viewer::text::DEFAULT_SYNTAX_THEME)
    }

    pub fn markdown_wrap(&self) -> usize {
        self.viewer.markdown_wrap.unwrap_or(DEFAULT_MARKDOWN_WRAP)
    }

    pub fn exit_on_save_error(&self) -> bool {
        self.editor.exit_on_save_error.unwrap_or(false)
    }

    /// Log file path; `<cache_dir>/dmc-nav/dmc-nav.log` when unset.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging
            .file
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("dmc-nav").join("dmc-nav.log")))
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
