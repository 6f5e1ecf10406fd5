//! CLI-backed issue store.
//!
//! Shells out to the tracker CLI (`bd` by default) in a working directory
//! and parses its JSON output. The tracker owns the data; this adapter only
//! reads snapshots.

use super::{IssueStore, StoreHealth};
use crate::domain::RawIssue;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Default tracker CLI program name.
const DEFAULT_PROGRAM: &str = "bd";

/// Directory the tracker keeps its database in, used as the initialization
/// marker for health checks.
const DB_DIR: &str = ".beads";

/// Issue store that reads snapshots from the tracker CLI.
pub struct CliStore {
    program: String,
    workdir: PathBuf,
}

impl CliStore {
    /// Create a store running the default tracker CLI in `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            workdir: workdir.into(),
        }
    }

    /// Override the tracker program (path or name resolved via `PATH`).
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl IssueStore for CliStore {
    async fn snapshot(&self) -> Result<Vec<RawIssue>> {
        let output = Command::new(&self.program)
            .args(["list", "--json", "--all"])
            .current_dir(&self.workdir)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Store(format!(
                "{} list exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let records: Vec<RawIssue> = serde_json::from_slice(&output.stdout)?;
        tracing::debug!(records = records.len(), "fetched snapshot from tracker");
        Ok(records)
    }

    async fn health(&self) -> StoreHealth {
        let initialized = self.workdir.join(DB_DIR).is_dir();

        match Command::new(&self.program)
            .arg("--version")
            .current_dir(&self.workdir)
            .output()
            .await
        {
            Ok(output) if output.status.success() => StoreHealth {
                initialized,
                version: Some(String::from_utf8_lossy(&output.stdout).trim().to_string()),
                error: None,
            },
            Ok(output) => StoreHealth {
                initialized,
                version: None,
                error: Some(format!(
                    "{} --version exited with {}",
                    self.program, output.status
                )),
            },
            Err(err) => StoreHealth {
                initialized,
                version: None,
                error: Some(format!("failed to run {}: {err}", self.program)),
            },
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Drop a fake tracker script into `dir` and return its path.
    fn write_fake_tracker(dir: &Path, body: &str) -> String {
        let path = dir.join("fake-bd");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn snapshot_parses_tracker_output() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"echo '[{"id":"d-1","title":"Fix pump","status":"pending","priority":"high","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-02T00:00:00Z"}]'"#;
        let program = write_fake_tracker(dir.path(), body);

        let store = CliStore::new(dir.path()).with_program(program);
        let records = store.snapshot().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "d-1");
        assert_eq!(records[0].status, "pending");
        assert!(records[0].parent.is_none());
        assert!(records[0].blocks.is_empty());
    }

    #[tokio::test]
    async fn snapshot_surfaces_tracker_failure() {
        let dir = tempfile::tempdir().unwrap();
        let program = write_fake_tracker(dir.path(), "echo 'database locked' >&2\nexit 3");

        let store = CliStore::new(dir.path()).with_program(program);
        let err = store.snapshot().await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("database locked"), "got: {message}");
    }

    #[tokio::test]
    async fn snapshot_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let program = write_fake_tracker(dir.path(), "echo 'not json'");

        let store = CliStore::new(dir.path()).with_program(program);
        assert!(matches!(
            store.snapshot().await.unwrap_err(),
            Error::Json(_)
        ));
    }

    #[tokio::test]
    async fn health_reports_initialized_workdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(DB_DIR)).unwrap();
        let program = write_fake_tracker(dir.path(), "echo 'bd 0.9.2'");

        let store = CliStore::new(dir.path()).with_program(program);
        let health = store.health().await;

        assert!(health.initialized);
        assert_eq!(health.version.as_deref(), Some("bd 0.9.2"));
        assert!(health.error.is_none());
    }

    #[tokio::test]
    async fn health_degrades_when_tracker_missing() {
        let dir = tempfile::tempdir().unwrap();

        let store = CliStore::new(dir.path()).with_program("/nonexistent/tracker");
        let health = store.health().await;

        assert!(!health.initialized);
        assert!(health.version.is_none());
        assert!(health.error.is_some());
    }
}
