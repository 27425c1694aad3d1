use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Stop after this many seconds instead of running forever.
    #[arg(long)]
    pub duration: Option<u64>,

    /// Fetch, draw a single frame and exit.
    #[arg(long, default_value_t = false, conflicts_with = "duration")]
    pub once: bool,

    #[arg(short, long, default_value_t = log::LevelFilter::Info)]
    pub logging_level: log::LevelFilter,

    #[arg(long)]
    pub config_file: std::path::PathBuf,
}
