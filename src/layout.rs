use std::path::{Path, PathBuf};

/// Well-known directory the NPS host writes its backups beneath.
pub const NETEZZA_DIR: &str = "Netezza";

/// Deterministic key/path scheme shared by the local backup tree and the
/// remote key space: `root/Netezza/host/database/backupset[/increment]`.
/// An empty backup set means "all backup sets" and is skipped when joining,
/// as is a missing increment.
#[derive(Debug, Clone)]
pub struct BackupLayout {
    pub nps_host: String,
    pub db_name: String,
    pub backup_set: String,
    pub increment: Option<String>,
}

impl BackupLayout {
    pub fn new<H, D, B>(nps_host: H, db_name: D, backup_set: B, increment: Option<String>) -> Self
    where
        H: Into<String>,
        D: Into<String>,
        B: Into<String>,
    {
        BackupLayout {
            nps_host: nps_host.into(),
            db_name: db_name.into(),
            backup_set: backup_set.into(),
            increment,
        }
    }

    /// Local directory holding the backup set under `root`.
    pub fn backup_dir<P>(&self, root: P) -> PathBuf
    where
        P: AsRef<Path>,
    {
        let mut dir = root.as_ref().to_path_buf();
        for part in self.components() {
            dir.push(part);
        }
        dir
    }

    /// Remote key prefix matching `backup_dir`, rooted at the transfer id.
    pub fn key_prefix(&self, transfer_id: &str) -> String {
        let mut parts = vec![transfer_id];
        parts.extend(self.components());
        parts.join("/")
    }

    fn components(&self) -> Vec<&str> {
        let mut parts = vec![NETEZZA_DIR, self.nps_host.as_str(), self.db_name.as_str()];

        if !self.backup_set.is_empty() {
            parts.push(self.backup_set.as_str());
        }

        if let Some(increment) = &self.increment {
            if !increment.is_empty() {
                parts.push(increment.as_str());
            }
        }

        parts
    }
}
