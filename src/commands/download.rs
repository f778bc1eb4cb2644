use std::sync::Arc;

use log::info;

use crate::backend::Backend;
use crate::manifest;
use crate::report::Report;
use crate::transfer::download::{self, ManifestPaths};
use crate::transfer::pool;
use crate::{Config, Error};

/// Restores the backup set into every directory in the config, one pool per
/// directory. When the run restores a backup originally taken to the cloud,
/// the restore manifests are rewritten after the pool drains.
pub struct Download<'a> {
    cfg: &'a Config,
    backend: Arc<dyn Backend>,
    report: Arc<dyn Report>,
}

impl<'a> Download<'a> {
    pub fn new(cfg: &'a Config, backend: Arc<dyn Backend>, report: Arc<dyn Report>) -> Self {
        Download {
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

        let key_prefix = cfg.layout.key_prefix(&cfg.transfer_id);
        let mut total = 0;

        for dir in &cfg.dirs {
            info!("Downloading backup data from cloud to restore dir {:?}", dir);

            let mut manifests = ManifestPaths::default();

            let files = pool::run(
                Arc::clone(&backend),
                Arc::clone(&report),
                cfg.parallel_jobs,
                |sink| {
                    download::produce(
                        &*backend,
                        dir,
                        &cfg.transfer_id,
                        &key_prefix,
                        sink,
                        &mut manifests,
                    )
                },
            )?;

            info!("Download successful. Total files downloaded: {}", files);

            if cfg.cloud_backup {
                manifest::update_locations(&manifests.locations, dir)?;
                manifest::update_contents(&manifests.contents)?;
            }

            total += files;
        }

        Ok(total)
    }
}
