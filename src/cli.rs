use bridge_traits::time::LogLevel;
use clap::{Parser, Subcommand};
use core_runtime::config::ConfigOverrides;
use core_runtime::events::LibraryScope;
use core_runtime::logging::{LogFormat, LoggingConfig};
use std::path::PathBuf;

/// Bulk subtitle synchronization for Bazarr
///
/// Walks the movie or show library of a Bazarr server and asks it to
/// re-synchronize every external subtitle against its media file.
#[derive(Parser, Debug)]
#[command(name = "bazarr-sync")]
#[command(about, long_about = None, version)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Use specific config file (default: ./config.yaml, then /config/config.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use golden-section search when aligning subtitles
    #[arg(long, global = true)]
    pub golden_section: bool,

    /// Do not let Bazarr correct framerate mismatches
    #[arg(long, global = true)]
    pub no_framerate_fix: bool,

    /// Skip subtitles synced by a previous run
    #[arg(long, global = true)]
    pub use_cache: bool,

    /// Run on the configured cron schedule instead of once
    #[arg(long, global = true)]
    pub schedule: bool,

    /// With --schedule, sync once immediately before waiting
    #[arg(long, global = true)]
    pub run_initial: bool,

    /// Show failure reasons reported by Bazarr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level for diagnostics on stderr (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LogLevel,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true, value_name = "FORMAT", default_value = "compact")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync subtitles for movies or shows
    #[command(visible_alias = "s")]
    Sync {
        #[command(subcommand)]
        target: SyncTarget,
    },

    /// Stop a sync running in another process
    #[command(visible_aliases = ["stop", "c"])]
    Cancel,

    /// Check that the Bazarr server is reachable
    Health,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SyncTarget {
    /// Sync subtitles for every movie
    #[command(visible_alias = "movie")]
    Movies {
        /// Only sync these Radarr ids (comma-separated)
        #[arg(long = "radarr-id", value_name = "ID", value_delimiter = ',')]
        ids: Vec<i64>,

        /// Start at this Radarr id, skipping everything before it
        #[arg(long, value_name = "ID", allow_negative_numbers = true)]
        continue_from: Option<i64>,

        /// Print the movie catalog and exit
        #[arg(long)]
        list: bool,
    },

    /// Sync subtitles for every episode of every show
    #[command(visible_aliases = ["show", "tv", "series"])]
    Shows {
        /// Only sync these Sonarr series ids (comma-separated)
        #[arg(long = "sonarr-id", value_name = "ID", value_delimiter = ',')]
        ids: Vec<i64>,

        /// Start at this Sonarr episode id, skipping everything before it
        #[arg(long, value_name = "ID", allow_negative_numbers = true)]
        continue_from: Option<i64>,

        /// Print the series catalog and exit
        #[arg(long)]
        list: bool,
    },
}

impl SyncTarget {
    pub fn scope(&self) -> LibraryScope {
        match self {
            SyncTarget::Movies { .. } => LibraryScope::Movies,
            SyncTarget::Shows { .. } => LibraryScope::Shows,
        }
    }

    pub fn ids(&self) -> &[i64] {
        match self {
            SyncTarget::Movies { ids, .. } | SyncTarget::Shows { ids, .. } => ids,
        }
    }

    pub fn continue_from(&self) -> Option<i64> {
        match self {
            SyncTarget::Movies { continue_from, .. } | SyncTarget::Shows { continue_from, .. } => {
                *continue_from
            }
        }
    }

    pub fn list(&self) -> bool {
        match self {
            SyncTarget::Movies { list, .. } | SyncTarget::Shows { list, .. } => *list,
        }
    }
}

impl Cli {
    /// Flags that override the loaded configuration. Absent flags leave the
    /// file's value in place.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            golden_section: self.golden_section.then_some(true),
            no_framerate_fix: self.no_framerate_fix.then_some(true),
            use_cache: self.use_cache.then_some(true),
            schedule: self.schedule.then_some(true),
            run_initial: self.run_initial.then_some(true),
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_level(self.log_level)
            .with_format(self.log_format)
    }
}
