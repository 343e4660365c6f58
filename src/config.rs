use std::path::PathBuf;

use thiserror::Error;

use crate::api::DEFAULT_API_BASE;
use crate::logging::LogConfig;
use crate::route::Route;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct AppArgs {
    /// Address to open at startup, e.g. `/?page=3` or `/pokemon/pikachu`
    #[arg(long)]
    pub location: Option<String>,

    /// Base URL of the catalog API
    #[arg(long, env = "DEXVIEW_API_BASE")]
    pub api_base: Option<String>,

    /// Skip the on-disk response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Directory for cached responses (defaults to the user cache dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, env = "DEXVIEW_LOG")]
    pub log_file: Option<PathBuf>,

    /// More log detail (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unrecognised location: {0}")]
    InvalidLocation(String),
    #[error("API base must be an http(s) URL: {0}")]
    InvalidApiBase(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub location: Route,
    pub api_base: String,
    /// `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    pub log: LogConfig,
}

impl Config {
    pub fn from_args(args: &AppArgs) -> Result<Self, ConfigError> {
        let location = match args.location.as_deref() {
            Some(input) => Route::parse(input)
                .ok_or_else(|| ConfigError::InvalidLocation(input.to_string()))?,
            None => Route::default(),
        };

        let api_base = args
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidApiBase(api_base));
        }

        let cache_dir = if args.no_cache {
            None
        } else {
            args.cache_dir.clone().or_else(default_cache_dir)
        };

        Ok(Self {
            location,
            api_base,
            cache_dir,
            log: LogConfig::from_verbosity(args.verbose).with_log_file(args.log_file.clone()),
        })
    }
}

fn default_cache_dir() -> Option<PathBuf> {
    dirs_next::cache_dir()
        .or_else(dirs_next::data_local_dir)
        .map(|dir| dir.join("dexview"))
}
