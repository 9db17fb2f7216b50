use crate::domain::ports::PrintSink;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Raw copy of the staged file to the printer.
///
/// On Windows the address is a printer share (`\\HOST\TICKET`) and the file is
/// sent with `copy /b`. Elsewhere the address is a device node such as
/// `/dev/usb/lp0`, opened for append; it must already exist.
#[derive(Debug, Clone)]
pub struct DeviceSink {
    address: String,
}

impl DeviceSink {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl PrintSink for DeviceSink {
    #[cfg(windows)]
    async fn deliver(&self, staged: &Path) -> Result<()> {
        let output = tokio::process::Command::new("cmd")
            .arg("/C")
            .arg("copy")
            .arg("/b")
            .arg(staged)
            .arg(&self.address)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ServiceError::DispatchFailure {
                message: format!(
                    "copy exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stdout).trim()
                ),
            })
        }
    }

    #[cfg(not(windows))]
    async fn deliver(&self, staged: &Path) -> Result<()> {
        use tokio::io::AsyncWriteExt;

        let bytes = tokio::fs::read(staged).await?;
        let mut device = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.address)
            .await
            .map_err(|e| ServiceError::DispatchFailure {
                message: format!("cannot open {}: {}", self.address, e),
            })?;
        device.write_all(&bytes).await?;
        device.flush().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.address.clone()
    }
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Keeps a copy of every delivered ticket in memory instead of printing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the attempt, then reports a device failure.
    pub fn failing() -> Self {
        Self {
            deliveries: Arc::default(),
            fail: true,
        }
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl PrintSink for RecordingSink {
    async fn deliver(&self, staged: &Path) -> Result<()> {
        let bytes = tokio::fs::read(staged).await?;
        self.deliveries.lock().await.push(Delivery {
            path: staged.to_path_buf(),
            bytes,
        });

        if self.fail {
            return Err(ServiceError::DispatchFailure {
                message: "printer offline".to_string(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_device_sink_appends_to_device() {
        let dir = TempDir::new().unwrap();
        let device = dir.path().join("lp0");
        std::fs::write(&device, b"").unwrap();
        let staged = dir.path().join("ticket.bin");
        std::fs::write(&staged, b"\x1B@ticket").unwrap();

        let sink = DeviceSink::new(device.to_str().unwrap());
        sink.deliver(&staged).await.unwrap();
        sink.deliver(&staged).await.unwrap();

        assert_eq!(std::fs::read(&device).unwrap(), b"\x1B@ticket\x1B@ticket");
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_device_sink_missing_device_fails() {
        let dir = TempDir::new().unwrap();
        let staged = dir.path().join("ticket.bin");
        std::fs::write(&staged, b"ticket").unwrap();

        let sink = DeviceSink::new(dir.path().join("missing").to_str().unwrap());
        let err = sink.deliver(&staged).await.unwrap_err();
        assert!(matches!(err, ServiceError::DispatchFailure { .. }));
    }

    #[tokio::test]
    async fn test_recording_sink_keeps_bytes() {
        let dir = TempDir::new().unwrap();
        let staged = dir.path().join("ticket.bin");
        std::fs::write(&staged, b"abc").unwrap();

        let sink = RecordingSink::new();
        sink.deliver(&staged).await.unwrap();

        let deliveries = sink.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].bytes, b"abc");
        assert_eq!(sink.describe(), "recording");
    }
}
