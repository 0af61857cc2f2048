use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mashup")]
#[command(author, version, about = "Build a singer mashup from YouTube search results")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Singer to search for (shorthand for `create <SINGER> ...`)
    #[arg(value_name = "SINGER")]
    pub singer: Option<String>,

    /// Number of search results to download
    #[arg(value_name = "N_VIDEOS", value_parser = clap::value_parser!(u32).range(1..))]
    pub n_videos: Option<u32>,

    /// Seconds to keep from the start of each clip
    #[arg(value_name = "TRIM_DURATION", allow_negative_numbers = true)]
    pub trim_duration: Option<i64>,

    /// Merged output file (must end in .wav)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Keep the run workspace (for debugging)
    #[arg(long)]
    pub keep_workspace: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, trim and merge clips of a singer into one mashup
    Create {
        #[command(flatten)]
        args: CreateArgs,
    },

    /// Check external tool availability
    Doctor,

    /// Show the effective configuration
    Config,
}

#[derive(clap::Args, Clone)]
pub struct CreateArgs {
    /// Singer or artist to search YouTube for
    #[arg(value_name = "SINGER")]
    pub singer: String,

    /// Number of search results to download
    #[arg(value_name = "N_VIDEOS", value_parser = clap::value_parser!(u32).range(1..))]
    pub n_videos: u32,

    /// Seconds to keep from the start of each clip
    #[arg(value_name = "TRIM_DURATION", allow_negative_numbers = true)]
    pub trim_duration: i64,

    /// Merged output file (must end in .wav)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Keep the run workspace (for debugging)
    #[arg(long)]
    pub keep_workspace: bool,
}
