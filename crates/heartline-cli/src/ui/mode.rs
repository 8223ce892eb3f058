//! Output mode routing logic.

/// Output mode determines how results are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Machine-readable JSON output only
    Json,
    /// Plain `key=value` text, stable for logs and scripts
    #[default]
    Plain,
    /// Human-friendly with colors and formatting (TTY only)
    Pretty,
}

/// Values accepted by `--format`.
pub const FORMATS: &[&str] = &["pretty", "plain", "json"];

impl OutputMode {
    /// Resolve output mode from flags and environment.
    ///
    /// Routing rules:
    /// 1. `--json` or `--format json` overrides everything
    /// 2. `--format plain` forces plain
    /// 3. `TERM=dumb` forces plain
    /// 4. Pretty only when stdout is TTY
    pub fn resolve(
        json_flag: bool,
        format_flag: Option<&str>,
        is_tty: bool,
        term_is_dumb: bool,
    ) -> Self {
        let format = format_flag.map(|f| f.trim().to_ascii_lowercase());
        match format.as_deref() {
            _ if json_flag => Self::Json,
            Some("json") => Self::Json,
            Some("plain") => Self::Plain,
            _ if term_is_dumb || !is_tty => Self::Plain,
            _ => Self::Pretty,
        }
    }

    /// Check a `--format` value.
    pub fn validate_format(format: &str) -> Result<(), String> {
        let lowered = format.trim().to_ascii_lowercase();
        if FORMATS.contains(&lowered.as_str()) {
            Ok(())
        } else {
            Err(format!(
                "Unknown format '{}' (expected one of: {})",
                format,
                FORMATS.join(", ")
            ))
        }
    }

    /// Check if this mode should output JSON.
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    /// Check if this mode should output pretty (human) format.
    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}
