use std::sync::Arc;

use log::info;

use crate::backend::Backend;
use crate::report::Report;
use crate::transfer::{pool, upload};
use crate::{Config, Error};

/// Uploads every backup directory in the config, one pool per directory.
/// A fatal error stops before the remaining directories.
pub struct Upload<'a> {
    cfg: &'a Config,
    backend: Arc<dyn Backend>,
    report: Arc<dyn Report>,
}

impl<'a> Upload<'a> {
    pub fn new(cfg: &'a Config, backend: Arc<dyn Backend>, report: Arc<dyn Report>) -> Self {
        Upload {
            cfg,
            backend,
            report,
        }
    }

    pub fn run(self) -> Result<usize, Error> {
        let Self {
            cfg,
            backend,
            report,
        } = self;

        let mut total = 0;

        for dir in &cfg.dirs {
            info!("Uploading backup data to cloud from {:?}", dir);

            let files = pool::run(
                Arc::clone(&backend),
                Arc::clone(&report),
                cfg.parallel_jobs,
                |sink| upload::produce(dir, &cfg.layout, &cfg.transfer_id, sink),
            )?;

            info!("Upload successful. Total files uploaded: {}", files);
            total += files;
        }

        Ok(total)
    }
}
