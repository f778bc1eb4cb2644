#![warn(rust_2018_idioms)]

mod backend;
mod commands;
mod config;
mod errors;
mod layout;
mod manifest;
mod mmap;
mod pretty;
mod report;
mod transfer;

#[cfg(test)]
mod testing;

pub use self::backend::{new_backend, Backend, S3};
pub use self::commands::{Download, Upload};
pub use self::config::{Config, Credentials};
pub use self::errors::{Error, ErrorKind};
pub use self::layout::BackupLayout;
pub use self::report::{LogReport, Report};
