//! # Operation Executor
//!
//! Applies a reconciliation plan one operation at a time, in order.
//!
//! A failed operation is logged with its description and execution moves on
//! to the next one. Nothing is rolled back: the next run's diff picks up
//! whatever a partial run left behind.

use crate::error::MirrorError;
use crate::reconcile::Operation;
use bridge_traits::storage::FileSystemAccess;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of applying a plan
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Operations applied successfully
    pub applied: usize,
    /// Operations not attempted (dry run)
    pub skipped: usize,
    /// One `MirrorError::FilesystemOperation` per failed operation
    pub failures: Vec<MirrorError>,
}

impl ExecutionReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Sequential operation executor
pub struct OperationExecutor {
    fs: Arc<dyn FileSystemAccess>,
    dry_run: bool,
}

impl OperationExecutor {
    pub fn new(fs: Arc<dyn FileSystemAccess>) -> Self {
        Self { fs, dry_run: false }
    }

    /// Log operations instead of applying them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Apply `operations` under `albums_root`, strictly in order
    pub async fn execute(&self, albums_root: &Path, operations: &[Operation]) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        info!(count = operations.len(), dry_run = self.dry_run, "Running {} operations", operations.len());

        for operation in operations {
            let description = operation.description();

            if self.dry_run {
                info!("(dry run) {}", description);
                report.skipped += 1;
                continue;
            }

            debug!("{}", description);
            match operation.apply(self.fs.as_ref(), albums_root).await {
                Ok(()) => report.applied += 1,
                Err(source) => {
                    let failure = MirrorError::FilesystemOperation {
                        description,
                        source,
                    };
                    warn!("{}", failure);
                    report.failures.push(failure);
                }
            }
        }

        info!(
            applied = report.applied,
            failed = report.failed(),
            skipped = report.skipped,
            "Finished running operations"
        );
        report
    }
}
