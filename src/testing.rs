use std::fs;
use std::path::Path;
use std::sync::Mutex;

use tempfile::{self, TempDir};

use crate::backend::{Backend, DownloadRequest, ListPage, UploadRequest};
use crate::errors::ResultExt;
use crate::Error;

#[derive(Debug)]
pub struct DirGuard(Option<TempDir>);

impl AsRef<Path> for DirGuard {
    fn as_ref(&self) -> &Path {
        match self.0 {
            Some(ref temp) => temp.path(),
            None => panic!("using after close"),
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Some(dir) = self.0.take() {
            dir.close().expect("cannot close temporary dir")
        }
    }
}

pub fn temp_dir() -> DirGuard {
    let b = tempfile::Builder::new();
    let dir = b.tempdir().unwrap();
    DirGuard(Some(dir))
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// In-memory object store for the engine tests: configurable listing page
/// size, object bodies served on download, and failure injection per key.
#[derive(Debug, Default)]
pub struct TestBackend {
    objects: Vec<(String, Vec<u8>)>,
    page_size: usize,
    fail_key: Option<String>,
    fail_listing: bool,
    uploaded: Mutex<Vec<String>>,
    downloaded: Mutex<Vec<String>>,
}

impl TestBackend {
    pub fn new() -> Self {
        TestBackend::default()
    }

    pub fn object<K>(mut self, key: K, body: &[u8]) -> Self
    where
        K: Into<String>,
    {
        self.objects.push((key.into(), body.to_vec()));
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn fail_on<K>(mut self, key: K) -> Self
    where
        K: Into<String>,
    {
        self.fail_key = Some(key.into());
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        let mut keys = self.uploaded.lock().unwrap().clone();
        keys.sort();
        keys
    }

    pub fn downloaded_keys(&self) -> Vec<String> {
        let mut keys = self.downloaded.lock().unwrap().clone();
        keys.sort();
        keys
    }

    fn check_failure(&self, key: &str) -> Result<(), Error> {
        match &self.fail_key {
            Some(fail_key) if fail_key == key => Err(Error::storage("injected failure")),
            _ => Ok(()),
        }
    }
}

impl Backend for TestBackend {
    fn download(&self, req: DownloadRequest) -> Result<usize, Error> {
        self.check_failure(&req.key)?;

        let body = self
            .objects
            .iter()
            .find(|(key, _)| *key == req.key)
            .map(|(_, body)| body.clone())
            .unwrap_or_default();

        fs::write(&req.path, &body).io_err(&req.path)?;
        self.downloaded.lock().unwrap().push(req.key);

        Ok(body.len())
    }

    fn upload(&self, req: UploadRequest) -> Result<usize, Error> {
        self.check_failure(&req.key)?;
        self.uploaded.lock().unwrap().push(req.key);
        Ok(1)
    }

    fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage, Error> {
        if self.fail_listing {
            return Err(Error::listing(prefix)("injected listing failure"));
        }

        let matching: Vec<String> = self
            .objects
            .iter()
            .map(|(key, _)| key.clone())
            .filter(|key| key.starts_with(prefix))
            .collect();

        let size = if self.page_size == 0 {
            matching.len().max(1)
        } else {
            self.page_size
        };

        let start: usize = token.and_then(|it| it.parse().ok()).unwrap_or(0);
        let keys: Vec<String> = matching.iter().skip(start).take(size).cloned().collect();
        let next = if start + size < matching.len() {
            Some((start + size).to_string())
        } else {
            None
        };

        Ok(ListPage { keys, next })
    }
}
