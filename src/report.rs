use log::{error, info};

use crate::pretty;
use crate::transfer::TransferJob;
use crate::Error;

/// Progress collaborator threaded through producer, pool and aggregator
/// instead of process-wide mutable state. The aggregator is the only
/// caller of `failed`; workers call `started`/`completed`.
pub trait Report: Send + Sync {
    fn started(&self, job: &TransferJob);
    fn completed(&self, job: &TransferJob, bytes: usize);
    fn failed(&self, job: &TransferJob, err: &Error);
    fn drained(&self, files: usize, bytes: usize);
}

#[derive(Debug, Default)]
pub struct LogReport;

impl Report for LogReport {
    fn started(&self, job: &TransferJob) {
        match job {
            TransferJob::Upload { path, .. } => info!("Uploading file {:?}", path),
            TransferJob::Download { key, .. } => info!("Downloading file {}", key),
        }
    }

    fn completed(&self, job: &TransferJob, bytes: usize) {
        info!("File {} transferred ({})", job.identity(), pretty::bytes(bytes));
    }

    fn failed(&self, job: &TransferJob, err: &Error) {
        error!("Error while transferring {}: {}", job.identity(), err);
    }

    fn drained(&self, files: usize, bytes: usize) {
        info!("Total files transferred: {} ({})", files, pretty::bytes(bytes));
    }
}
