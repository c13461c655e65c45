// Configuration: settings decided once at startup. There are no config
// files; the only outside influence is whether stdout is a terminal and
// `RUST_LOG` for diagnostics (see `logging`).

use crossterm::tty::IsTty;

/// Diagnostic logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub default: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            default: "warn".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Colour the success/failure markers.
    pub color: bool,
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults, with colour turned on when stdout is a terminal.
    pub fn detect() -> Self {
        Config {
            color: std::io::stdout().is_tty(),
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_plain_and_quiet() {
        let config = Config::default();
        assert!(!config.color);
        assert_eq!(config.logging.default, "warn");
    }
}
