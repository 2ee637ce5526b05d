//! # Mirror Coordinator
//!
//! Runs one complete mirror pass.
//!
//! ## Workflow
//!
//! 1. Optionally fill a date index and log a per-day image summary
//! 2. Fetch the remote album index while scanning the image root and the
//!    album root on the blocking pool
//! 3. Check whether the album root exists
//! 4. Plan the operations
//! 5. Apply them in order (or log them in dry-run mode)
//!
//! Any error before step 5 aborts the run without touching the filesystem.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_mirror::MirrorCoordinator;
//!
//! let coordinator = MirrorCoordinator::new(config, library, fs, clock)?;
//! let report = coordinator.run().await?;
//! println!("{} operations applied", report.applied);
//! ```

use crate::catalog::CatalogFetcher;
use crate::date_index::DateIndex;
use crate::error::{MirrorError, Result};
use crate::executor::OperationExecutor;
use crate::reconcile::{self, ReconcileInput};
use crate::scanner::{scan_album_directories, scan_images};
use bridge_traits::photos::PhotoLibrary;
use bridge_traits::storage::FileSystemAccess;
use bridge_traits::time::Clock;
use core_runtime::config::{DateSummaryConfig, MirrorConfig};
use std::sync::Arc;
use tokio::task;
use tracing::{info, instrument};

/// Summary of a mirror run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// Remote albums considered (after the album cap and duplicate titles)
    pub remote_albums: usize,
    /// Images found under the image root
    pub local_images: usize,
    /// Images counted by the date summary, if it ran
    pub dated_images: Option<usize>,
    /// Operations planned
    pub planned: usize,
    /// Operations applied successfully
    pub applied: usize,
    /// Operations that failed
    pub failed: usize,
    /// Wanted images with no local copy, across all albums
    pub missing_images: usize,
    pub dry_run: bool,
}

/// Coordinates fetching, scanning, planning and applying
pub struct MirrorCoordinator {
    config: MirrorConfig,
    fs: Arc<dyn FileSystemAccess>,
    fetcher: CatalogFetcher,
    executor: OperationExecutor,
}

impl MirrorCoordinator {
    /// Create a coordinator for `config`.
    ///
    /// The config is validated again here so a hand-built config cannot
    /// start a run with an empty root.
    pub fn new(
        config: MirrorConfig,
        library: Arc<dyn PhotoLibrary>,
        fs: Arc<dyn FileSystemAccess>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let fetcher = CatalogFetcher::new(library, clock, config.max_concurrent_fetches);
        let executor = OperationExecutor::new(Arc::clone(&fs)).with_dry_run(config.dry_run);

        Ok(Self {
            config,
            fs,
            fetcher,
            executor,
        })
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Run one mirror pass
    #[instrument(skip(self), fields(index_root = ?self.config.index_root, dry_run = self.config.dry_run))]
    pub async fn run(&self) -> Result<MirrorReport> {
        let albums_root = self.config.albums_root();
        info!(
            image_root = ?self.config.image_root,
            albums_root = ?albums_root,
            "Starting album mirror run"
        );

        let dated_images = match self.config.date_summary {
            Some(summary) => Some(self.log_date_summary(summary).await?),
            None => None,
        };

        let image_root = self.config.image_root.clone();
        let scan_root = albums_root.clone();
        let images_scan = task::spawn_blocking(move || scan_images(&image_root));
        let albums_scan = task::spawn_blocking(move || scan_album_directories(&scan_root));

        let (remote_albums, local_images, directory_index) = tokio::join!(
            self.fetcher.fetch_album_index(self.config.max_albums),
            images_scan,
            albums_scan,
        );
        let remote_albums = remote_albums?;
        let local_images = local_images.map_err(|e| MirrorError::TaskJoin(e.to_string()))??;
        let directory_index = directory_index.map_err(|e| MirrorError::TaskJoin(e.to_string()))??;

        let albums_root_exists =
            self.fs
                .exists(&albums_root)
                .await
                .map_err(|source| MirrorError::FilesystemOperation {
                    description: format!("stat {}", albums_root.display()),
                    source,
                })?;

        let mut report = MirrorReport {
            remote_albums: remote_albums.len(),
            local_images: local_images.len(),
            dated_images,
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        let plan = reconcile::plan(ReconcileInput {
            remote_albums,
            directory_index,
            local_images,
            albums_root_exists,
        });
        report.planned = plan.operations.len();
        report.missing_images = plan.missing_total();

        let execution = self.executor.execute(&albums_root, &plan.operations).await;
        report.applied = execution.applied;
        report.failed = execution.failed();

        info!(
            albums = report.remote_albums,
            planned = report.planned,
            applied = report.applied,
            failed = report.failed,
            missing = report.missing_images,
            "Album mirror run complete"
        );
        Ok(report)
    }

    /// Fill a date index and log one line per day, oldest first
    async fn log_date_summary(&self, summary: DateSummaryConfig) -> Result<usize> {
        let mut index = DateIndex::new();
        self.fetcher
            .fill_date_index(&mut index, summary.since, summary.max_images)
            .await?;

        index.visit_years(|year| {
            index.visit_months(year, |month| {
                index.visit_days(year, month, |day, filenames| {
                    info!("{:04}-{:02}-{:02}: {} images", year, month, day, filenames.len());
                });
            });
        });

        Ok(index.len())
    }
}
