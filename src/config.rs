/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// ```toml
/// [general]
/// levels_dir = "levels"
/// [audio]
/// sound_fx = true
/// [editor]
/// rows = 5
/// cols = 5
/// save_dir = "levels"
/// [gamepad]
/// confirm = ["A", "Start"]
/// cancel = ["B", "Select"]
/// restart = ["Y"]
/// [log]
/// file = "sokoterm.log"
/// filter = "info"
/// ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::board::MIN_SIZE;
use crate::domain::editor::MAX_EDITOR_SIZE;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub levels_dir: PathBuf,
    pub audio: AudioConfig,
    pub editor: EditorConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub sound_fx: bool,
}

#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub rows: usize,
    pub cols: usize,
    pub save_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Log file path. Empty disables logging.
    pub file: PathBuf,
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    editor: TomlEditor,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_true")]
    sound_fx: bool,
}

#[derive(Deserialize, Debug)]
struct TomlEditor {
    #[serde(default = "default_editor_size")]
    rows: usize,
    #[serde(default = "default_editor_size")]
    cols: usize,
    #[serde(default = "default_levels_dir")]
    save_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_filter")]
    filter: String,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_true() -> bool { true }
fn default_editor_size() -> usize { 5 }
fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_log_file() -> String { "sokoterm.log".into() }
fn default_log_filter() -> String { "info".into() }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_dir: default_levels_dir() }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio { sound_fx: default_true() }
    }
}

impl Default for TomlEditor {
    fn default() -> Self {
        TomlEditor {
            rows: default_editor_size(),
            cols: default_editor_size(),
            save_dir: default_levels_dir(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            restart: default_restart(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), filter: default_log_filter() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

/// A config problem found before logging is up. Reported once the
/// subscriber is installed.
#[derive(Debug)]
pub struct ConfigWarning(pub String);

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> (Self, Option<ConfigWarning>) {
        let search_dirs = candidate_dirs();
        let (toml_cfg, warning) = load_toml(&search_dirs);
        (GameConfig::from_toml(toml_cfg, &search_dirs), warning)
    }

    /// Parse config text directly (no file search).
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            levels_dir: resolve_dir(&cfg.general.levels_dir, search_dirs),
            audio: AudioConfig { sound_fx: cfg.audio.sound_fx },
            editor: EditorConfig {
                rows: cfg.editor.rows.clamp(MIN_SIZE, MAX_EDITOR_SIZE),
                cols: cfg.editor.cols.clamp(MIN_SIZE, MAX_EDITOR_SIZE),
                save_dir: resolve_dir(&cfg.editor.save_dir, search_dirs),
            },
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
                restart: cfg.gamepad.restart,
            },
            log: LogConfig { file: PathBuf::from(cfg.log.file), filter: cfg.log.filter },
        }
    }
}

/// Absolute paths as-is; relative ones resolve against the first
/// candidate dir that has them, else stay relative to CWD.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs
        .iter()
        .map(|d| d.join(path))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data next to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/sokoterm)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/sokoterm");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> (TomlConfig, Option<ConfigWarning>) {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                return match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => (cfg, None),
                    Err(e) => (
                        TomlConfig::default(),
                        Some(ConfigWarning(format!("{}: {e}; using default settings", path.display()))),
                    ),
                };
            }
            Err(e) => {
                return (
                    TomlConfig::default(),
                    Some(ConfigWarning(format!("could not read {}: {e}", path.display()))),
                );
            }
        }
    }
    (TomlConfig::default(), None)
}
