//! CLI argument parsing
//!
//! ```text
//! promptalchemy [OPTIONS] [COMMAND]
//!
//! COMMANDS:
//!   (none) | tui        Interactive workspace
//!   enhance [DRAFT]     Enhance one draft (argument or stdin), print result
//!   reset-key           Forget the stored API key
//!
//! OPTIONS:
//!   --config <PATH>     Config file (TOML)
//!   --model <NAME>      Override llm.model
//!   --log-level <LEVEL> Override logging.level
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parsed CLI arguments
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = "promptalchemy",
    version,
    about = "Transmute rough prompt drafts into structured, master-level prompts"
)]
pub struct Args {
    /// Config file (TOML); defaults to <config_dir>/promptalchemy/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model identifier override
    #[arg(long, global = true, value_name = "NAME")]
    pub model: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

/// CLI modes
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Mode {
    /// Interactive terminal workspace (default)
    Tui,

    /// Enhance a single draft and print the result to stdout
    Enhance {
        /// Draft text; read from stdin when omitted
        draft: Option<String>,
    },

    /// Clear the stored API key
    ResetKey,
}

impl Args {
    /// Selected mode, defaulting to the TUI
    pub fn mode(&self) -> Mode {
        self.mode.clone().unwrap_or(Mode::Tui)
    }
}

/// Parse arguments from any iterator (first item is the program name)
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Args::try_parse_from(args)
}
