use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::errors::ResultExt;
use crate::layout::BackupLayout;
use crate::transfer::pool::JobSink;
use crate::transfer::TransferJob;
use crate::Error;

/// Walks the backup set under `root` and submits one upload job per regular
/// file. The relative path is computed against `root` itself, so the remote
/// key reproduces the `Netezza/host/db/...` structure under the transfer id.
/// Jobs enqueued before a traversal failure still drain through the pool.
pub fn produce(
    root: &Path,
    layout: &BackupLayout,
    transfer_id: &str,
    sink: &JobSink,
) -> Result<(), Error> {
    let backup_dir = layout.backup_dir(root);

    fs::metadata(&backup_dir).map_err(|err| {
        let err = format!("{}; check if DB name and hostname are correct", err);
        Error::io(&backup_dir)(err)
    })?;

    for entry in WalkDir::new(&backup_dir).follow_links(false) {
        let entry = entry.io_err(&backup_dir)?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .io_err(entry.path())?
            .to_path_buf();

        let job = TransferJob::upload(entry.path().to_path_buf(), relative, transfer_id);
        sink.submit(job)?;
    }

    Ok(())
}
