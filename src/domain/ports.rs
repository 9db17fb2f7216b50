use crate::domain::model::Student;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::Path;

/// Delivers a staged ticket file to printer hardware.
#[async_trait]
pub trait PrintSink: Send + Sync {
    async fn deliver(&self, staged: &Path) -> Result<()>;

    /// Human-readable identity reported by the status endpoint.
    fn describe(&self) -> String;
}

/// Resolves a scanned code to a student record.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// `Ok(None)` when the directory does not know the code.
    async fn lookup(&self, code: &str) -> Result<Option<Student>>;
}

/// Wall-clock source; entitlement is always evaluated against local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
