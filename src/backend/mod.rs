use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::vec;

use url::Url;

use crate::config::Credentials;
use crate::Error;

mod futures_ext;
mod s3;

pub use self::s3::S3;

#[derive(Debug)]
pub struct DownloadRequest {
    pub path: PathBuf,
    pub key: String,
}

#[derive(Debug)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub key: String,
}

/// One page of a key listing plus the continuation token for the next one.
/// `next == None` means the backend has no more pages.
#[derive(Debug, Default)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub next: Option<String>,
}

/// Capability contract of a remote object store. Authentication, retry and
/// timeout policy are the implementation's own business; the transfer
/// engine never retries.
pub trait Backend: Debug + Send + Sync {
    fn download(&self, req: DownloadRequest) -> Result<usize, Error>;
    fn upload(&self, req: UploadRequest) -> Result<usize, Error>;
    fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage, Error>;
}

/// Picks a concrete backend from the remote uri scheme.
pub fn new_backend(uri: &str, credentials: Option<Credentials>) -> Result<Arc<dyn Backend>, Error> {
    let uri = Url::parse(uri).map_err(Error::config)?;

    if uri.scheme() == S3::scheme() {
        let s3 = S3::from(&uri, credentials)?;
        return Ok(Arc::new(s3));
    }

    let err = format!("Unknown remote uri '{}'", uri);
    Err(Error::config(err))
}

/// Lazy sequence of keys under `prefix`, pulling pages on demand. Ends when
/// the backend reports no continuation token; empty pages with a token keep
/// going.
pub fn keys<'a>(backend: &'a dyn Backend, prefix: &'a str) -> Keys<'a> {
    Keys {
        backend,
        prefix,
        page: Vec::new().into_iter(),
        next: None,
        exhausted: false,
    }
}

pub struct Keys<'a> {
    backend: &'a dyn Backend,
    prefix: &'a str,
    page: vec::IntoIter<String>,
    next: Option<String>,
    exhausted: bool,
}

impl<'a> Iterator for Keys<'a> {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.page.next() {
                return Some(Ok(key));
            }

            if self.exhausted {
                return None;
            }

            let token = self.next.take();
            match self.backend.list_page(self.prefix, token) {
                Ok(page) => {
                    self.exhausted = page.next.is_none();
                    self.next = page.next;
                    self.page = page.keys.into_iter();
                }
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
