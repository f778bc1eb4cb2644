use std::fs::File;
use std::path::{Path, PathBuf};

use serde_derive::Deserialize;

use crate::errors::ResultExt;
use crate::{BackupLayout, Error};

pub const DEFAULT_PARALLEL_JOBS: usize = 6;

/// Per-invocation settings for one upload or download run. Directories are
/// processed sequentially; each gets its own worker pool.
#[derive(Debug)]
pub struct Config {
    pub dirs: Vec<PathBuf>,
    pub layout: BackupLayout,
    pub transfer_id: String,
    pub parallel_jobs: usize,
    pub cloud_backup: bool,
    pub verbose: bool,
}

impl Config {
    pub fn new<S>(layout: BackupLayout, transfer_id: S, dirs: Vec<PathBuf>) -> Self
    where
        S: Into<String>,
    {
        Config {
            dirs,
            layout,
            transfer_id: transfer_id.into(),
            parallel_jobs: DEFAULT_PARALLEL_JOBS,
            cloud_backup: false,
            verbose: false,
        }
    }

    pub fn parallel_jobs(&mut self, jobs: usize) {
        self.parallel_jobs = jobs.max(1);
    }

    pub fn cloud_backup(&mut self, cloud_backup: bool) {
        self.cloud_backup = cloud_backup;
    }

    pub fn verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}

/// Static credentials for the object store, loaded from a JSON file. When
/// absent the backend falls back to its own provider chain.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn load<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let file = File::open(&path).io_err(&path)?;
        serde_json::from_reader(&file).map_err(Error::config)
    }
}
