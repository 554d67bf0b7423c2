//! Command-line interface definition for tack.
//!
//! - `tack build` - Resolve modules and write the tack-config module
//! - `tack check` - Validate configuration and resolve modules without writing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tack - build-time configuration assembly
#[derive(Parser, Debug)]
#[command(
    name = "tack",
    version,
    about = "Assemble the tack-config module for a platform build",
    long_about = "tack resolves the modules enabled in a platform configuration, combines them\n\
                  with translations and branding, and writes the `tack-config` ES module the\n\
                  application imports at runtime."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve modules and write the generated configuration module
    Build(BuildArgs),

    /// Validate configuration and resolve modules without writing anything
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Path to the configuration file (tack.toml, tack.json or package.json)
    ///
    /// Searched for in the current directory when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// File to write the generated module to (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Path to the configuration file (tack.toml, tack.json or package.json)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
