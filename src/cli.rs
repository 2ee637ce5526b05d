//! Command-line interface.
//!
//! Flags are translated into a validated [`MirrorConfig`] and a
//! [`LoggingConfig`]; nothing else in the workspace sees clap types.

use bridge_traits::time::LogLevel;
use chrono::NaiveDate;
use clap::Parser;
use core_runtime::config::{
    limit_from_signed, DateSummaryConfig, MirrorConfig, DEFAULT_MAX_CONCURRENT_FETCHES,
    DEFAULT_TOKEN_PATH,
};
use core_runtime::logging::{LogFormat, LoggingConfig};
use std::path::PathBuf;

/// Mirror remote photo albums as directories of symbolic links.
///
/// Every run lists the remote albums, scans the local image collection and
/// the existing album tree, then creates and removes directories and links
/// under `<indexdir>/albums` until the tree matches the remote albums.
#[derive(Parser, Debug)]
#[command(name = "album-mirror")]
#[command(about = "Mirror remote photo albums as directories of symlinks")]
#[command(version)]
pub struct Cli {
    /// Directory in which to maintain the `albums/` tree.
    #[arg(long = "indexdir", value_name = "DIR")]
    pub index_dir: Option<PathBuf>,

    /// Directory holding the local image collection links point into.
    #[arg(long = "imagedir", value_name = "DIR")]
    pub image_dir: Option<PathBuf>,

    /// OAuth token file.
    #[arg(long = "tokenpath", value_name = "FILE", default_value = DEFAULT_TOKEN_PATH)]
    pub token_path: PathBuf,

    /// Only consider the first N remote albums (negative for unlimited).
    #[arg(
        long = "maxalbums",
        value_name = "N",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    pub max_albums: i64,

    /// Number of albums whose contents are listed concurrently.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES)]
    pub max_concurrent_fetches: usize,

    /// Log the planned operations without applying them.
    #[arg(long)]
    pub dry_run: bool,

    /// Log the number of images per day before mirroring.
    #[arg(long)]
    pub date_summary: bool,

    /// Only count images created on or after this date in the date summary.
    #[arg(long, value_name = "YYYY-MM-DD", requires = "date_summary")]
    pub since: Option<NaiveDate>,

    /// Stop the date summary after N images (negative for unlimited).
    #[arg(
        long,
        value_name = "N",
        default_value_t = -1,
        allow_negative_numbers = true,
        requires = "date_summary"
    )]
    pub max_images: i64,

    /// Minimum log level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format (pretty, json, compact).
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Custom tracing filter directives, overriding --log-level.
    #[arg(long, value_name = "DIRECTIVES")]
    pub log_filter: Option<String>,

    /// Log span open and close events.
    #[arg(long)]
    pub log_spans: bool,

    /// Omit the module target from log lines.
    #[arg(long)]
    pub no_log_target: bool,

    /// Include thread ids and names in log lines.
    #[arg(long)]
    pub log_thread_info: bool,
}

impl Cli {
    /// Build and validate the run configuration
    pub fn mirror_config(&self) -> core_runtime::Result<MirrorConfig> {
        let mut builder = MirrorConfig::builder()
            .token_path(&self.token_path)
            .max_albums(limit_from_signed(self.max_albums))
            .max_concurrent_fetches(self.max_concurrent_fetches)
            .dry_run(self.dry_run);

        if let Some(index_dir) = &self.index_dir {
            builder = builder.index_root(index_dir);
        }
        if let Some(image_dir) = &self.image_dir {
            builder = builder.image_root(image_dir);
        }
        if self.date_summary {
            builder = builder.date_summary(DateSummaryConfig {
                since: self.since,
                max_images: limit_from_signed(self.max_images),
            });
        }

        builder.build()
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let mut config = LoggingConfig::default()
            .with_level(self.log_level)
            .with_spans(self.log_spans)
            .with_target(!self.no_log_target)
            .with_thread_info(self.log_thread_info);
        if let Some(format) = self.log_format {
            config = config.with_format(format);
        }
        if let Some(filter) = &self.log_filter {
            config = config.with_filter(filter.as_str());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use core_runtime::Error;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["album-mirror", "--indexdir", "/idx", "--imagedir", "/img"]);
        let config = cli.mirror_config().unwrap();

        assert_eq!(config.index_root, PathBuf::from("/idx"));
        assert_eq!(config.image_root, PathBuf::from("/img"));
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.max_albums, None);
        assert!(!config.dry_run);
        assert!(config.date_summary.is_none());
    }

    #[test]
    fn parse_limits_and_flags() {
        let cli = Cli::parse_from([
            "album-mirror",
            "--indexdir",
            "/idx",
            "--imagedir",
            "/img",
            "--tokenpath",
            "/etc/token.json",
            "--maxalbums",
            "5",
            "--dry-run",
            "--date-summary",
            "--since",
            "2022-03-01",
            "--max-images",
            "200",
        ]);
        let config = cli.mirror_config().unwrap();

        assert_eq!(config.max_albums, Some(5));
        assert_eq!(config.token_path, PathBuf::from("/etc/token.json"));
        assert!(config.dry_run);
        let summary = config.date_summary.unwrap();
        assert_eq!(summary.since, NaiveDate::from_ymd_opt(2022, 3, 1));
        assert_eq!(summary.max_images, Some(200));
    }

    #[test]
    fn negative_max_albums_is_unlimited() {
        let cli = Cli::parse_from([
            "album-mirror",
            "--indexdir",
            "/idx",
            "--imagedir",
            "/img",
            "--maxalbums",
            "-1",
        ]);
        assert_eq!(cli.mirror_config().unwrap().max_albums, None);
    }

    #[test]
    fn missing_indexdir_is_config_error() {
        let cli = Cli::parse_from(["album-mirror", "--imagedir", "/img"]);
        match cli.mirror_config() {
            Err(Error::Config(msg)) => assert!(msg.contains("--indexdir")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn since_requires_date_summary() {
        let result = Cli::try_parse_from(["album-mirror", "--since", "2022-03-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_logging_flags() {
        let cli = Cli::parse_from([
            "album-mirror",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--log-filter",
            "core_mirror=trace",
        ]);
        let config = cli.logging_config();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter.as_deref(), Some("core_mirror=trace"));
        assert!(!config.enable_spans);
        assert!(config.display_target);
        assert!(!config.display_thread_info);
    }

    #[test]
    fn parse_log_line_flags() {
        let cli = Cli::parse_from([
            "album-mirror",
            "--log-spans",
            "--no-log-target",
            "--log-thread-info",
        ]);
        let config = cli.logging_config();

        assert!(config.enable_spans);
        assert!(!config.display_target);
        assert!(config.display_thread_info);
    }
}
