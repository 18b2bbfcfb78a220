use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for trakui
#[derive(Parser, Debug)]
#[command(version, about = "trakui")]
pub struct Args {
    /// View name from the config, or a dataset locator (path or http(s) URL)
    pub view: Option<String>,

    /// Use an alternate config file instead of the user config
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Write the default config template and exit
    #[arg(long = "write-config", action)]
    pub write_config: bool,

    /// Overwrite the existing config file when writing it
    #[arg(long = "force", action)]
    pub force: bool,

    /// Seconds to wait for HTTP sources before giving up
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,
}
