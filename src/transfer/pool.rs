use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex};

use crate::backend::{Backend, DownloadRequest, UploadRequest};
use crate::report::Report;
use crate::transfer::{TransferJob, TransferResult};
use crate::Error;

/// Producer-side handle to the bounded job queue. Submission blocks once
/// `parallel_jobs` jobs are in flight; after the aggregator has seen a
/// failure every further submit is refused.
pub struct JobSink {
    jobs: SyncSender<TransferJob>,
    cancel: Arc<AtomicBool>,
}

impl JobSink {
    pub fn submit(&self, job: TransferJob) -> Result<(), Error> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(Error::aborted());
        }

        self.jobs.send(job).map_err(|_| Error::aborted())
    }
}

#[derive(Debug)]
struct Summary {
    files: usize,
    bytes: usize,
    first_err: Option<Error>,
}

/// Runs one batch: `produce` submits jobs from the caller's thread while
/// `parallel_jobs` workers and one aggregator drain them. Returns the
/// success count, or the first failure once everything already dispatched
/// has drained. Jobs in flight at abort time are awaited, never cancelled;
/// completed transfers are left in place.
pub fn run<F>(
    backend: Arc<dyn Backend>,
    report: Arc<dyn Report>,
    parallel_jobs: usize,
    produce: F,
) -> Result<usize, Error>
where
    F: FnOnce(&JobSink) -> Result<(), Error>,
{
    let workers = parallel_jobs.max(1);

    // one extra thread hosts the aggregator
    let threads = rayon::ThreadPoolBuilder::new()
        .num_threads(workers + 1)
        .build()
        .map_err(Error::config)?;

    let (job_tx, job_rx) = mpsc::sync_channel::<TransferJob>(workers);
    let (result_tx, result_rx) = mpsc::channel::<TransferResult>();
    let (done_tx, done_rx) = mpsc::channel::<Summary>();
    let cancel = Arc::new(AtomicBool::new(false));
    let job_rx = Arc::new(Mutex::new(job_rx));

    for _ in 0..workers {
        let backend = Arc::clone(&backend);
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        let report = Arc::clone(&report);

        threads.spawn(move || worker_loop(&*backend, &job_rx, &result_tx, &*report));
    }
    drop(result_tx);

    {
        let cancel = Arc::clone(&cancel);
        let report = Arc::clone(&report);

        threads.spawn(move || aggregate(result_rx, done_tx, &cancel, &*report));
    }

    let sink = JobSink {
        jobs: job_tx,
        cancel,
    };
    let produced = produce(&sink);
    drop(sink); // closes the job queue, workers drain and exit

    let summary = done_rx.recv().map_err(|_| Error::aborted())?;

    if let Some(err) = summary.first_err {
        return Err(err);
    }

    produced?;

    report.drained(summary.files, summary.bytes);
    Ok(summary.files)
}

fn worker_loop(
    backend: &dyn Backend,
    jobs: &Mutex<Receiver<TransferJob>>,
    results: &Sender<TransferResult>,
    report: &dyn Report,
) {
    loop {
        let job = {
            let queue = match jobs.lock() {
                Ok(queue) => queue,
                Err(_) => return,
            };

            match queue.recv() {
                Ok(job) => job,
                Err(_) => return, // queue closed and empty
            }
        };

        report.started(&job);

        let result = match dispatch(backend, &job) {
            Ok(bytes) => {
                report.completed(&job, bytes);
                TransferResult {
                    job,
                    err: None,
                    bytes,
                }
            }
            Err(err) => TransferResult {
                job,
                err: Some(err),
                bytes: 0,
            },
        };

        if results.send(result).is_err() {
            return;
        }
    }
}

fn dispatch(backend: &dyn Backend, job: &TransferJob) -> Result<usize, Error> {
    match job {
        TransferJob::Upload { path, .. } => backend.upload(UploadRequest {
            path: path.clone(),
            key: job.remote_key(),
        }),
        TransferJob::Download { key, path } => backend.download(DownloadRequest {
            path: path.clone(),
            key: key.clone(),
        }),
    }
}

fn aggregate(
    results: Receiver<TransferResult>,
    done: Sender<Summary>,
    cancel: &AtomicBool,
    report: &dyn Report,
) {
    let mut summary = Summary {
        files: 0,
        bytes: 0,
        first_err: None,
    };

    for result in results.iter() {
        match result.err {
            Some(err) => {
                report.failed(&result.job, &err);
                cancel.store(true, Ordering::SeqCst);

                if summary.first_err.is_none() {
                    summary.first_err = Some(Error::transfer(result.job.identity())(err));
                }
            }
            None => {
                summary.files += 1;
                summary.bytes += result.bytes;
            }
        }
    }

    let _ = done.send(summary);
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::report::LogReport;
    use crate::testing::TestBackend;

    fn upload_job(name: &str) -> TransferJob {
        TransferJob::upload(
            PathBuf::from(format!("/backups/{}", name)),
            PathBuf::from(name),
            "uid",
        )
    }

    fn report() -> Arc<dyn Report> {
        Arc::new(LogReport::default())
    }

    #[test]
    fn every_job_yields_one_success() {
        let backend = Arc::new(TestBackend::new());

        let files = run(Arc::clone(&backend) as Arc<dyn Backend>, report(), 4, |sink| {
            for n in 0..20 {
                sink.submit(upload_job(&format!("file-{}", n)))?;
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(files, 20);
        assert_eq!(backend.uploaded_keys().len(), 20);
    }

    #[test]
    fn single_worker_still_drains() {
        let backend = Arc::new(TestBackend::new());

        let files = run(Arc::clone(&backend) as Arc<dyn Backend>, report(), 1, |sink| {
            for n in 0..5 {
                sink.submit(upload_job(&format!("file-{}", n)))?;
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(files, 5);
    }

    #[test]
    fn first_failure_aborts_the_batch() {
        let backend = Arc::new(TestBackend::new().fail_on("uid/file-3"));

        let err = run(Arc::clone(&backend) as Arc<dyn Backend>, report(), 2, |sink| {
            for n in 0..50 {
                sink.submit(upload_job(&format!("file-{}", n)))?;
            }
            Ok(())
        })
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Transfer failed"), "got: {}", msg);
        assert!(msg.contains("file-3"), "got: {}", msg);
    }

    #[test]
    fn producer_error_drains_enqueued_jobs() {
        let backend = Arc::new(TestBackend::new());

        let err = run(Arc::clone(&backend) as Arc<dyn Backend>, report(), 2, |sink| {
            for n in 0..3 {
                sink.submit(upload_job(&format!("file-{}", n)))?;
            }
            Error::io_err("/backups/missing", "walk failed")
        })
        .unwrap_err();

        assert!(err.to_string().contains("I/O error"));
        // jobs already enqueued before the failure still ran
        assert_eq!(backend.uploaded_keys().len(), 3);
    }
}
