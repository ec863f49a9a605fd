//! Env writer: appends the webhook destination to the monitor's `.env` file.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use beacon_common::error::AppError;

/// Key the external monitor reads its webhook destination from.
pub const WEBHOOK_KEY: &str = "WEBHOOK";

/// Appends `KEY=value` lines. Earlier lines are never rewritten, so readers
/// must treat the last occurrence of a key as authoritative.
pub struct EnvWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl EnvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append_webhook(&self, webhook_url: &str) -> Result<(), AppError> {
        self.append(WEBHOOK_KEY, webhook_url).await?;
        tracing::debug!(
            path = %self.path.display(),
            webhook_url,
            "Webhook appended to env file"
        );
        Ok(())
    }

    async fn append(&self, key: &str, value: &str) -> Result<(), AppError> {
        let line = format!("{}={}\n", key, value);

        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // A file that doesn't end in a newline would otherwise get our key
        // glued onto its last line.
        let len = file.metadata().await?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1)).await?;
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                file.write_all(b"\n").await?;
            }
        }

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Last value assigned to `key` in env-file `contents`.
pub fn last_value<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
    contents
        .lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(k, _)| k.trim() == key)
        .map(|(_, v)| v)
        .next_back()
}
