//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Singer tap for the HelpScout API
#[derive(Parser, Debug)]
#[command(name = "tap-helpscout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON) with OAuth2 credentials and the start date
    #[arg(short, long)]
    pub config: PathBuf,

    /// Catalog file (JSON) marking the streams and fields to sync
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// State file (JSON) carrying bookmarks from a previous run
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Print the discovered catalog to stdout and exit
    #[arg(short, long)]
    pub discover: bool,
}
