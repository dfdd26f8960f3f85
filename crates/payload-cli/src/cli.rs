//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "payloadtool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract payload contents
    Extract(ExtractArgs),
    /// List payload contents without extraction
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

impl Commands {
    /// Operation name used in JSON documents.
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Extract(_) => "extract",
            Self::List(_) => "list",
            Self::Completion(_) => "completion",
        }
    }
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the payload file
    #[arg(value_name = "PAYLOAD")]
    pub payload: PathBuf,

    /// Output directory (without one the payload is only validated)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print every entry while extracting
    #[arg(short, long)]
    pub list: bool,

    /// Fail on entry headers with an unexpected reserved marker
    #[arg(long)]
    pub strict: bool,

    /// Preserve file permissions from the payload
    #[arg(long)]
    pub preserve_permissions: bool,

    /// Preserve file modification times from the payload
    #[arg(long)]
    pub preserve_mtime: bool,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the payload file
    #[arg(value_name = "PAYLOAD")]
    pub payload: PathBuf,

    /// Fail on entry headers with an unexpected reserved marker
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
