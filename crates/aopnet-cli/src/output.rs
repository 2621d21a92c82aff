//! Output modes and error rendering for `aopnet` subcommands.
//!
//! Handlers build one serializable report and hand it to [`render_mode`]
//! with a text renderer (tab-separated, for pipes) and a pretty renderer
//! (headed sections, for terminals). JSON is derived from the report itself.
//!
//! The mode comes from `--format`, then the hidden `--json` flag, then
//! `AOPNET_FORMAT`, then whether stdout is a terminal.

use std::io::{self, IsTerminal, Write};

use aopnet_core::{ErrorCode, ValidationError};
use clap::ValueEnum;
use serde::Serialize;

const KEY_WIDTH: usize = 24;

/// Heading underlined to its own width.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    let width = heading.chars().count().max(8);
    writeln!(w, "{heading}\n{}", "─".repeat(width))
}

/// `key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let key = format!("{key}:");
    writeln!(w, "{key:<KEY_WIDTH$} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sectioned output for terminals.
    Pretty,
    /// Tab-separated lines for scripts.
    Text,
    /// A single JSON document.
    Json,
}

fn pick_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    stdout_is_tty: bool,
) -> OutputMode {
    format_flag
        .or_else(|| json_flag.then_some(OutputMode::Json))
        .or_else(|| format_env.and_then(|raw| OutputMode::from_str(raw.trim(), true).ok()))
        .unwrap_or(if stdout_is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// Output mode for this invocation.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env = std::env::var("AOPNET_FORMAT").ok();
    pick_mode(format_flag, json_flag, env.as_deref(), io::stdout().is_terminal())
}

/// Write `value` to stdout in `mode`.
///
/// # Errors
///
/// Propagates stdout write and JSON serialization failures.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            out.write_all(b"\n")?;
        }
        OutputMode::Text => text(value, &mut out)?,
        OutputMode::Pretty => pretty(value, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failed invocation as shown to the user.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    pub error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<&'static str>,
}

/// Classify a failure by the first recognizable cause in its chain.
pub fn classify(err: &anyhow::Error) -> ErrorCode {
    err.chain()
        .find_map(|cause| {
            if let Some(validation) = cause.downcast_ref::<ValidationError>() {
                Some(validation.code())
            } else if cause.is::<toml::de::Error>() {
                Some(ErrorCode::ConfigParseError)
            } else if cause.is::<io::Error>() || cause.is::<serde_json::Error>() {
                Some(ErrorCode::InputUnreadable)
            } else {
                None
            }
        })
        .unwrap_or(ErrorCode::InternalUnexpected)
}

impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let code = classify(err);
        Self {
            message: format!("{err:#}"),
            error_code: code.code(),
            suggestion: code.hint(),
        }
    }
}

/// Write `error` to stderr; JSON mode wraps it as `{"error": {...}}`.
///
/// # Errors
///
/// Propagates stderr write failures.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let mut err = io::stderr().lock();
    if mode == OutputMode::Json {
        serde_json::to_writer_pretty(&mut err, &serde_json::json!({ "error": error }))?;
        err.write_all(b"\n")?;
    } else {
        writeln!(err, "error[{}]: {}", error.error_code, error.message)?;
        if let Some(suggestion) = error.suggestion {
            writeln!(err, "  hint: {suggestion}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn explicit_format_beats_everything() {
        assert_eq!(
            pick_mode(Some(OutputMode::Text), true, Some("pretty"), true),
            OutputMode::Text
        );
    }

    #[test]
    fn json_flag_beats_environment() {
        assert_eq!(pick_mode(None, true, Some("text"), true), OutputMode::Json);
    }

    #[test]
    fn environment_is_case_insensitive() {
        assert_eq!(pick_mode(None, false, Some(" JSON "), true), OutputMode::Json);
    }

    #[test]
    fn terminal_decides_when_nothing_else_does() {
        assert_eq!(pick_mode(None, false, Some("yaml"), true), OutputMode::Pretty);
        assert_eq!(pick_mode(None, false, None, false), OutputMode::Text);
    }

    #[test]
    fn validation_errors_keep_their_code() {
        let err = anyhow::Error::new(ValidationError::ZeroK).context("outcome-paths");
        assert_eq!(classify(&err), ErrorCode::InvalidParameter);
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code, "E1001");
        assert!(cli.message.contains("k must be at least 1"));
    }

    #[test]
    fn io_failures_are_unreadable_input() {
        let err = std::fs::read_to_string("/nonexistent/aopnet/graph.json")
            .context("failed to read graph")
            .expect_err("missing file");
        assert_eq!(classify(&err), ErrorCode::InputUnreadable);
    }

    #[test]
    fn toml_failures_are_config_errors() {
        let err = toml::from_str::<toml::Table>("[broken")
            .context("failed to parse config")
            .expect_err("bad toml");
        assert_eq!(classify(&err), ErrorCode::ConfigParseError);
    }

    #[test]
    fn unknown_failures_are_internal() {
        let cli = CliError::from(&anyhow::anyhow!("boom"));
        assert_eq!(cli.error_code, "E9001");
        assert!(cli.suggestion.is_none());
        let json = serde_json::to_value(&cli).expect("serializable");
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn pretty_kv_aligns_values() {
        let mut buf = Vec::new();
        pretty_kv(&mut buf, "Nodes", "12").expect("write");
        let line = String::from_utf8(buf).expect("utf8");
        assert_eq!(line.find("12"), Some(KEY_WIDTH + 1));
    }
}
