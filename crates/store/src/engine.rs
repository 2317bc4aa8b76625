// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The round-robin engine seam.
//!
//! The engine is a black box with `create`, `update`, `tune`; the
//! production binding shells out to the `rrdtool` binary, the fake
//! records calls (and touches files so existence checks behave) for
//! tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Timeout for one engine invocation.
const ENGINE_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from rrd engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine operation failed: {0}")]
    Failed(String),
    #[error("engine operation timed out")]
    Timeout,
}

/// Round-robin database engine operations.
#[async_trait]
pub trait RrdEngine: Send + Sync {
    /// Create a fresh file from DS/RRA arguments.
    async fn create(&self, path: &Path, args: &[String]) -> Result<(), EngineError>;

    /// Feed `when:value` samples, optionally through a cache daemon.
    async fn update(
        &self,
        path: &Path,
        daemon: Option<&str>,
        samples: &[String],
    ) -> Result<(), EngineError>;

    /// Adjust data-source properties of an existing file.
    async fn tune(&self, path: &Path, args: &[String]) -> Result<(), EngineError>;
}

/// Engine binding that shells out to `rrdtool`.
#[derive(Debug, Clone)]
pub struct RrdToolEngine {
    binary: PathBuf,
}

impl Default for RrdToolEngine {
    fn default() -> Self {
        Self::new("rrdtool")
    }
}

impl RrdToolEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: Vec<String>) -> Result<(), EngineError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&args);
        let output = tokio::time::timeout(ENGINE_TIMEOUT, cmd.output())
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Unavailable(format!("{}: {e}", self.binary.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Failed(stderr.trim().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RrdEngine for RrdToolEngine {
    async fn create(&self, path: &Path, args: &[String]) -> Result<(), EngineError> {
        let mut full = vec!["create".to_string(), path.display().to_string()];
        full.extend(args.iter().cloned());
        self.run(full).await
    }

    async fn update(
        &self,
        path: &Path,
        daemon: Option<&str>,
        samples: &[String],
    ) -> Result<(), EngineError> {
        let mut full = vec!["update".to_string()];
        if let Some(daemon) = daemon {
            full.push("--daemon".to_string());
            full.push(daemon.to_string());
        }
        full.push(path.display().to_string());
        full.extend(samples.iter().cloned());
        self.run(full).await
    }

    async fn tune(&self, path: &Path, args: &[String]) -> Result<(), EngineError> {
        let mut full = vec!["tune".to_string(), path.display().to_string()];
        full.extend(args.iter().cloned());
        self.run(full).await
    }
}

/// Recorded engine call
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Create {
        path: PathBuf,
        args: Vec<String>,
    },
    Update {
        path: PathBuf,
        daemon: Option<String>,
        samples: Vec<String>,
    },
    Tune {
        path: PathBuf,
        args: Vec<String>,
    },
}

/// Fake engine for testing: records calls and touches created files so
/// path-existence logic sees them.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakeEngine {
    inner: std::sync::Arc<parking_lot::Mutex<FakeEngineState>>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
struct FakeEngineState {
    calls: Vec<EngineCall>,
    fail_create: bool,
    fail_update: bool,
    fail_tune: bool,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().calls.clone()
    }

    pub fn updates(&self) -> Vec<EngineCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Update { .. }))
            .cloned()
            .collect()
    }

    pub fn fail_create(&self) {
        self.inner.lock().fail_create = true;
    }

    pub fn fail_update(&self) {
        self.inner.lock().fail_update = true;
    }

    pub fn fail_tune(&self) {
        self.inner.lock().fail_tune = true;
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl RrdEngine for FakeEngine {
    async fn create(&self, path: &Path, args: &[String]) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Create {
            path: path.to_path_buf(),
            args: args.to_vec(),
        });
        if state.fail_create {
            return Err(EngineError::Failed("injected create failure".into()));
        }
        drop(state);
        std::fs::File::create(path)
            .map(|_| ())
            .map_err(|e| EngineError::Failed(e.to_string()))
    }

    async fn update(
        &self,
        path: &Path,
        daemon: Option<&str>,
        samples: &[String],
    ) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Update {
            path: path.to_path_buf(),
            daemon: daemon.map(str::to_string),
            samples: samples.to_vec(),
        });
        if state.fail_update {
            return Err(EngineError::Failed("injected update failure".into()));
        }
        Ok(())
    }

    async fn tune(&self, path: &Path, args: &[String]) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Tune {
            path: path.to_path_buf(),
            args: args.to_vec(),
        });
        if state.fail_tune {
            return Err(EngineError::Failed("injected tune failure".into()));
        }
        Ok(())
    }
}
