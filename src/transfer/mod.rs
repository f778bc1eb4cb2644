use std::path::PathBuf;

use crate::Error;

pub mod download;
pub mod pool;
pub mod upload;

/// One file to move. Jobs are immutable once created; every dispatched job
/// yields exactly one `TransferResult`.
#[derive(Debug)]
pub enum TransferJob {
    Upload {
        path: PathBuf,
        relative: PathBuf,
        transfer_id: String,
    },
    Download {
        key: String,
        path: PathBuf,
    },
}

impl TransferJob {
    pub fn upload<S>(path: PathBuf, relative: PathBuf, transfer_id: S) -> Self
    where
        S: Into<String>,
    {
        TransferJob::Upload {
            path,
            relative,
            transfer_id: transfer_id.into(),
        }
    }

    pub fn download<S>(key: S, path: PathBuf) -> Self
    where
        S: Into<String>,
    {
        TransferJob::Download {
            key: key.into(),
            path,
        }
    }

    /// Remote key the job reads from or writes to.
    pub fn remote_key(&self) -> String {
        match self {
            TransferJob::Upload {
                relative,
                transfer_id,
                ..
            } => format!("{}/{}", transfer_id, relative.display()),
            TransferJob::Download { key, .. } => key.clone(),
        }
    }

    /// Operator-facing name for logs and error context.
    pub fn identity(&self) -> String {
        match self {
            TransferJob::Upload { path, .. } => path.display().to_string(),
            TransferJob::Download { key, .. } => key.clone(),
        }
    }
}

#[derive(Debug)]
pub struct TransferResult {
    pub job: TransferJob,
    pub err: Option<Error>,
    pub bytes: usize,
}
