use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::job_boards::SortOrder;


#[derive(Parser, Debug)]
#[command(name = "buzzword-scanner", version)]
#[command(about = "Searches a job board and lists the postings that mention your buzzwords", long_about = None)]
pub(crate) struct Cli {
    /// Text file with one buzzword per line
    #[arg(long, env = "BUZZWORDS_FILE", default_value = "buzzwords.txt")]
    pub(crate) buzzwords_file: PathBuf,

    /// Chrome or Chromium executable (found automatically if omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub(crate) driver_path: Option<PathBuf>,

    /// Settings file. Ignored if it does not exist
    #[arg(short, long, default_value = "config.toml")]
    pub(crate) config: PathBuf,

    /// Words every posting must contain
    #[arg(short, long)]
    pub(crate) query: Option<String>,

    /// Where the jobs are
    #[arg(short, long)]
    pub(crate) location: Option<String>,

    /// Words no posting may contain
    #[arg(long)]
    pub(crate) exclude: Option<String>,

    /// Results per page (10 to 50)
    #[arg(long)]
    pub(crate) results_per_page: Option<u32>,

    /// Result ordering
    #[arg(long, value_enum)]
    pub(crate) sort: Option<SortOrder>,

    /// Advanced search page to start from, e.g. a regional Indeed site
    #[arg(long)]
    pub(crate) start_url: Option<Url>,

    /// Show the browser window
    #[arg(long)]
    pub(crate) headed: bool,

    /// Milliseconds to wait after each posting
    #[arg(long)]
    pub(crate) pause_ms: Option<u64>,

    /// Print the results as JSON
    #[arg(long)]
    pub(crate) json: bool,

    /// Log every step
    #[arg(short, long)]
    pub(crate) verbose: bool
}
