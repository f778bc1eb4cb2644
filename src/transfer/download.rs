use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{self, Backend};
use crate::errors::ResultExt;
use crate::manifest;
use crate::transfer::pool::JobSink;
use crate::transfer::TransferJob;
use crate::Error;

/// Local destinations of the restore manifests seen while listing. Filled
/// by the producer, consumed by the post-processor once the pool drains.
#[derive(Debug, Default)]
pub struct ManifestPaths {
    pub locations: Vec<PathBuf>,
    pub contents: Vec<PathBuf>,
}

/// Pages through the listing under the transfer id and submits one download
/// job per key matching `key_prefix`. The destination drops the transfer-id
/// component and lands under `out_dir`, with directories created up front.
/// A full pass with no matching key is an error; a wrong uniqueid, host or
/// db name would otherwise restore nothing, silently.
pub fn produce(
    backend: &dyn Backend,
    out_dir: &Path,
    transfer_id: &str,
    key_prefix: &str,
    sink: &JobSink,
    manifests: &mut ManifestPaths,
) -> Result<(), Error> {
    let mut matched = false;

    for key in backend::keys(backend, transfer_id) {
        let key = key?;

        if !key.starts_with(key_prefix) {
            continue;
        }

        let (dir, file_name) = split_key(&key);

        let relative = Path::new(dir)
            .strip_prefix(transfer_id)
            .map_err(|err| Error::transfer(key.as_str())(err))?
            .to_path_buf();

        let dump_dir = out_dir.join(relative);
        fs::create_dir_all(&dump_dir).io_err(&dump_dir)?;

        let dest = dump_dir.join(file_name);

        match file_name {
            manifest::LOCATIONS_FILE => manifests.locations.push(dest.clone()),
            manifest::CONTENTS_FILE => manifests.contents.push(dest.clone()),
            _ => {}
        }

        sink.submit(TransferJob::download(key, dest))?;
        matched = true;
    }

    if !matched {
        return Err(Error::empty_listing(key_prefix));
    }

    Ok(())
}

fn split_key(key: &str) -> (&str, &str) {
    match key.rfind('/') {
        Some(pos) => (&key[..pos], &key[pos + 1..]),
        None => ("", key),
    }
}
