/// Structured logging to a file.
///
/// The terminal belongs to the renderer while the game runs (raw mode +
/// alternate screen), so events go to `[log] file` instead of stderr.
/// `RUST_LOG`, when set and valid, overrides `[log] filter`.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install the global subscriber. Returns `false` when logging stays off
/// (empty path, file not writable, or a subscriber already installed).
pub fn init(cfg: &LogConfig) -> bool {
    if cfg.file.as_os_str().is_empty() {
        return false;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&cfg.file) else {
        return false;
    };
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(env.as_deref(), &cfg.filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

/// Environment directives first, then the configured ones, then `info`.
fn build_filter(env: Option<&str>, configured: &str) -> EnvFilter {
    env.and_then(|e| EnvFilter::try_new(e).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn env_overrides_config() {
        assert_eq!(build_filter(Some("debug"), "warn").to_string(), "debug");
        assert_eq!(build_filter(None, "warn").to_string(), "warn");
    }

    #[test]
    fn invalid_directives_fall_back() {
        assert_eq!(build_filter(Some("a=bogus"), "b=bogus").to_string(), "info");
    }

    #[test]
    fn empty_path_disables_logging() {
        let cfg = LogConfig { file: PathBuf::new(), filter: "info".into() };
        assert!(!init(&cfg));
    }
}
