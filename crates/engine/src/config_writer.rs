//! Config writer: persists validated records to `AddressAndChain.toml`.
//!
//! Every write goes to a uniquely named temp file in the target's directory and
//! is then renamed over the target. Readers such as the external monitor
//! therefore see either the old or the new complete file, never a partial one.
//! A mutex serializes writers so a read-modify-write in append mode cannot lose
//! a concurrent update.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use beacon_common::config::WritePolicy;
use beacon_common::error::AppError;
use beacon_common::types::{AddressBook, MonitorRecord};

pub struct ConfigWriter {
    path: PathBuf,
    policy: WritePolicy,
    lock: Mutex<()>,
}

impl ConfigWriter {
    pub fn new(path: impl Into<PathBuf>, policy: WritePolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Persist one record according to the configured policy.
    pub async fn write(&self, record: &MonitorRecord) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;

        let book = match self.policy {
            WritePolicy::Replace => AddressBook {
                addresses: vec![record.clone()],
            },
            WritePolicy::Append => {
                let mut book = self.read_book().await?;
                book.addresses.push(record.clone());
                book
            }
        };

        let contents = toml::to_string(&book)?;
        self.replace_atomically(contents.as_bytes()).await?;

        tracing::info!(
            path = %self.path.display(),
            policy = %self.policy,
            records = book.addresses.len(),
            chain = %record.chain,
            "Monitor configuration written"
        );

        Ok(())
    }

    /// Read the current address book. A missing file is an empty book.
    pub async fn load(&self) -> Result<AddressBook, AppError> {
        let _guard = self.lock.lock().await;
        self.read_book().await
    }

    async fn read_book(&self) -> Result<AddressBook, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AddressBook::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_atomically(&self, contents: &[u8]) -> Result<(), AppError> {
        let tmp_path = self.temp_path();

        let result = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(contents).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(
                    path = %tmp_path.display(),
                    error = %cleanup,
                    "Failed to remove temporary config file"
                );
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Sibling of the target so the final rename never crosses filesystems.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address_suffix: &str, chain: &str, alert_balance: u64) -> MonitorRecord {
        MonitorRecord {
            address: format!("0x{:0>40}", address_suffix),
            rpc_url: "https://sepolia.infura.io/v3/test".to_string(),
            chain: chain.to_string(),
            alert_balance,
        }
    }

    #[tokio::test]
    async fn test_replace_keeps_only_latest_record() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ConfigWriter::new(dir.path().join("AddressAndChain.toml"), WritePolicy::Replace);

        writer.write(&record("aa", "Sepolia", 100)).await.unwrap();
        writer.write(&record("bb", "Arbitrum", 5)).await.unwrap();

        let book = writer.load().await.unwrap();
        assert_eq!(book.addresses, vec![record("bb", "Arbitrum", 5)]);
    }

    #[tokio::test]
    async fn test_append_accumulates_records() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ConfigWriter::new(dir.path().join("AddressAndChain.toml"), WritePolicy::Append);

        writer.write(&record("aa", "Sepolia", 100)).await.unwrap();
        writer.write(&record("bb", "Bitcoin", 2)).await.unwrap();

        let book = writer.load().await.unwrap();
        assert_eq!(
            book.addresses,
            vec![record("aa", "Sepolia", 100), record("bb", "Bitcoin", 2)]
        );
    }

    #[tokio::test]
    async fn test_append_preserves_hand_written_stanzas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AddressAndChain.toml");
        std::fs::write(
            &path,
            "[[addresses]]\naddress = \"0x1111111111111111111111111111111111111111\"\nrpc_url = \"https://arb1.example.org\"\nchain = \"Arbitrum\"\nalert_balance = 7\n",
        )
        .unwrap();

        let writer = ConfigWriter::new(&path, WritePolicy::Append);
        writer.write(&record("aa", "Sepolia", 100)).await.unwrap();

        let book = writer.load().await.unwrap();
        assert_eq!(book.addresses.len(), 2);
        assert_eq!(book.addresses[0].chain, "Arbitrum");
        assert_eq!(book.addresses[1], record("aa", "Sepolia", 100));
    }

    #[tokio::test]
    async fn test_append_refuses_to_clobber_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AddressAndChain.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let writer = ConfigWriter::new(&path, WritePolicy::Append);
        let err = writer.write(&record("aa", "Sepolia", 100)).await.unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "this is = = not toml");
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ConfigWriter::new(dir.path().join("absent.toml"), WritePolicy::Replace);
        assert!(writer.load().await.unwrap().addresses.is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_directory_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ConfigWriter::new(
            dir.path().join("missing-dir").join("AddressAndChain.toml"),
            WritePolicy::Replace,
        );

        let err = writer.write(&record("aa", "Sepolia", 100)).await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ConfigWriter::new(dir.path().join("AddressAndChain.toml"), WritePolicy::Replace);
        writer.write(&record("aa", "Sepolia", 100)).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["AddressAndChain.toml".to_string()]);
    }
}
