//! `aopnet completions`: shell completion scripts for the `aopnet` command tree.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use clap_complete::{Shell, generate};
use tracing::info;

/// Arguments for `aopnet completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell; detected from `$SHELL` when omitted.
    #[arg(value_enum)]
    pub shell: Option<Shell>,

    /// Write the script to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Completion script for `command` in `shell`, named after the command.
fn completion_script(shell: Shell, command: &mut clap::Command) -> Vec<u8> {
    let name = command.get_name().to_string();
    let mut script = Vec::new();
    generate(shell, command, name, &mut script);
    script
}

/// Generate the script and write it to `--output` or stdout.
///
/// # Errors
///
/// Fails when no shell is given and none can be detected, or when the
/// script cannot be written.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> Result<()> {
    let Some(shell) = args.shell.or_else(Shell::from_env) else {
        bail!("could not detect the shell from $SHELL; pass bash, zsh, fish, elvish or powershell");
    };
    let script = completion_script(shell, command);

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, &script)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(?shell, path = %path.display(), "completion script written");
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(&script)?;
            out.flush()?;
        }
    }
    Ok(())
}
