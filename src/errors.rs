use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

type Cause = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug)]
pub enum ErrorKind {
    Config,
    Io(PathBuf),
    Storage,
    Listing(String),
    EmptyListing(String),
    Transfer(String),
    Aborted,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    cause: Option<Cause>,
}

impl Error {
    pub fn config<E>(err: E) -> Error
    where
        E: Into<Cause>,
    {
        Error {
            kind: ErrorKind::Config,
            cause: Some(err.into()),
        }
    }

    pub fn storage<E>(err: E) -> Error
    where
        E: Into<Cause>,
    {
        Error {
            kind: ErrorKind::Storage,
            cause: Some(err.into()),
        }
    }

    pub fn io<T, E>(path: T) -> impl FnOnce(E) -> Error
    where
        T: AsRef<Path>,
        E: Into<Cause>,
    {
        let path = path.as_ref().to_path_buf();
        |err: E| Error {
            kind: ErrorKind::Io(path),
            cause: Some(err.into()),
        }
    }

    pub fn io_err<T, R, E>(path: T, err: E) -> Result<R, Error>
    where
        T: AsRef<Path>,
        E: Into<Cause>,
    {
        Err(Error {
            kind: ErrorKind::Io(path.as_ref().to_path_buf()),
            cause: Some(err.into()),
        })
    }

    pub fn listing<T, E>(prefix: T) -> impl FnOnce(E) -> Error
    where
        T: Into<String>,
        E: Into<Cause>,
    {
        |err: E| Error {
            kind: ErrorKind::Listing(prefix.into()),
            cause: Some(err.into()),
        }
    }

    pub fn empty_listing<T>(prefix: T) -> Error
    where
        T: Into<String>,
    {
        Error {
            kind: ErrorKind::EmptyListing(prefix.into()),
            cause: None,
        }
    }

    pub fn transfer<T, E>(identity: T) -> impl FnOnce(E) -> Error
    where
        T: Into<String>,
        E: Into<Cause>,
    {
        |err: E| Error {
            kind: ErrorKind::Transfer(identity.into()),
            cause: Some(err.into()),
        }
    }

    pub fn aborted() -> Error {
        Error {
            kind: ErrorKind::Aborted,
            cause: None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        match self.kind {
            ErrorKind::Aborted => true,
            _ => false,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.kind {
            ErrorKind::Config => write!(f, "Configuration error")?,
            ErrorKind::Io(path) => write!(f, "I/O error at {:?}", path.as_os_str())?,
            ErrorKind::Storage => write!(f, "Storage error")?,
            ErrorKind::Listing(prefix) => write!(f, "Listing failed for prefix '{}'", prefix)?,
            ErrorKind::EmptyListing(prefix) => write!(
                f,
                "No matching object found under '{}'; check if DB name, hostname or uniqueid are correct",
                prefix
            )?,
            ErrorKind::Transfer(identity) => write!(f, "Transfer failed for '{}'", identity)?,
            ErrorKind::Aborted => write!(f, "Transfer aborted")?,
        };

        let mut cause = self.source();
        while let Some(err) = cause {
            write!(f, "; {}", err)?;
            cause = err.source()
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        if let Some(ref err) = self.cause {
            return Some(err.as_ref());
        }
        None
    }
}

pub trait ResultExt<T, E> {
    fn io_err<P>(self, path: P) -> Result<T, Error>
    where
        P: AsRef<Path>;

    fn storage_err(self) -> Result<T, Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E>
where
    E: Into<Cause>,
{
    fn io_err<P>(self, path: P) -> Result<T, Error>
    where
        P: AsRef<Path>,
    {
        self.map_err(Error::io(path))
    }

    fn storage_err(self) -> Result<T, Error> {
        self.map_err(Error::storage)
    }
}
