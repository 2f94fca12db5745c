use std::path::PathBuf;

use clap::Parser;
use crawl_logging::LevelFilter;

/// Fetch a list of pages and save each one as markdown.
#[derive(Debug, Parser)]
#[command(name = "crawler", version, about)]
pub struct Cli {
    /// URLs to crawl, in order.
    pub urls: Vec<String>,

    /// Read additional URLs from a file, one per line.
    #[arg(long, short = 'f', value_name = "FILE")]
    pub urls_file: Option<PathBuf>,

    /// Directory that receives one markdown file per page.
    #[arg(long, short, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Pages fetched at the same time (1-10).
    #[arg(long, short = 'c', value_name = "N")]
    pub max_concurrent: Option<u32>,

    /// Keep hyperlink markup in the markdown.
    #[arg(long)]
    pub keep_links: bool,

    /// Wrap markdown at this many columns; 0 disables wrapping.
    #[arg(long, value_name = "COLS")]
    pub body_width: Option<usize>,

    /// Settings file in RON format.
    #[arg(long, value_name = "FILE", default_value = "crawler.ron")]
    pub config: PathBuf,

    /// Write logs to this file instead of the terminal.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// More log output; repeat for more detail.
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
