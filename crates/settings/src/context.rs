//! Run context and workspace types
//!
//! These types describe the execution environment a settings provider
//! resolves against: which run is asking, which file tree the resolved path
//! must be valid on, and where human-readable diagnostics go. The execution
//! engine owns their lifetime; this crate only reads them.

use crate::SettingsError;
use crate::placement::{FilePlacement, LocalPlacement};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Identity of one run: job name plus build number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    job: String,
    number: u64,
}

impl RunId {
    /// Create a run identity.
    #[must_use]
    pub fn new(job: impl Into<String>, number: u64) -> Self {
        Self {
            job: job.into(),
            number,
        }
    }

    /// Job this run belongs to.
    #[must_use]
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Build number within the job.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.job, self.number)
    }
}

/// One build execution.
///
/// Carries the run identity and the cancellation signal of the surrounding
/// run. Providers check the signal cooperatively before blocking work and
/// surface [`SettingsError::Cancelled`] instead of retrying.
#[derive(Debug, Clone)]
pub struct RunContext {
    id: RunId,
    cancel: CancellationToken,
}

impl RunContext {
    /// Create a context for a run that cannot be cancelled externally.
    #[must_use]
    pub fn new(id: RunId) -> Self {
        Self {
            id,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a context wired to the engine's cancellation signal.
    #[must_use]
    pub fn with_cancellation(id: RunId, cancel: CancellationToken) -> Self {
        Self { id, cancel }
    }

    /// Identity of this run.
    #[must_use]
    pub fn id(&self) -> &RunId {
        &self.id
    }

    /// Cancellation signal of this run.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast once the run has been interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Cancelled`] if the run's cancellation signal
    /// has fired.
    pub fn check_cancelled(&self) -> Result<(), SettingsError> {
        if self.cancel.is_cancelled() {
            return Err(SettingsError::Cancelled {
                run: self.id.to_string(),
            });
        }
        Ok(())
    }
}

/// An addressable file-tree root a run executes in, possibly on another
/// machine than the controller.
///
/// The workspace pairs its root path with the [`FilePlacement`] collaborator
/// that knows how to make files readable under that root. Providers that
/// materialize settings go through [`materialize_from`](Workspace::materialize_from)
/// or [`materialize_bytes`](Workspace::materialize_bytes); they must not
/// touch unrelated files in the tree.
#[derive(Clone)]
pub struct Workspace {
    root: PathBuf,
    placement: Arc<dyn FilePlacement>,
}

impl Workspace {
    /// Workspace on the controller's own filesystem.
    #[must_use]
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            placement: Arc::new(LocalPlacement::new()),
        }
    }

    /// Workspace reached through an explicit placement collaborator
    /// (e.g. an agent channel).
    #[must_use]
    pub fn with_placement(root: impl Into<PathBuf>, placement: Arc<dyn FilePlacement>) -> Self {
        Self {
            root: root.into(),
            placement,
        }
    }

    /// Root of the workspace tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy an existing file into the workspace at `relative`.
    ///
    /// # Errors
    ///
    /// Propagates the placement collaborator's I/O failure.
    pub async fn materialize_from(
        &self,
        source: &Path,
        relative: &Path,
    ) -> std::io::Result<WorkspacePath> {
        let dest = self.placement.place_from(&self.root, relative, source).await?;
        Ok(WorkspacePath::new(dest))
    }

    /// Write `content` into the workspace at `relative`.
    ///
    /// # Errors
    ///
    /// Propagates the placement collaborator's I/O failure.
    pub async fn materialize_bytes(
        &self,
        content: &[u8],
        relative: &Path,
    ) -> std::io::Result<WorkspacePath> {
        let dest = self
            .placement
            .place_bytes(&self.root, relative, content)
            .await?;
        Ok(WorkspacePath::new(dest))
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace").field("root", &self.root).finish()
    }
}

/// Handle to a resolved settings file, valid on the workspace's filesystem
/// at the time it was returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePath {
    path: PathBuf,
}

impl WorkspacePath {
    /// Wrap a path known to be readable on the workspace's filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path as seen on the execution node.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Textual form of the path, as passed on a tool command line.
    #[must_use]
    pub fn remote(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Unwrap into the underlying path.
    #[must_use]
    pub fn into_inner(self) -> PathBuf {
        self.path
    }
}

impl fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Per-run sink for human-readable progress and warning messages.
pub trait DiagnosticSink: Send + Sync {
    /// Append one line of diagnostics to the run's output.
    fn log(&self, message: &str);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn log(&self, _message: &str) {}
}

/// Sink that retains messages in memory for later inspection.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    /// Create an empty buffering sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages logged so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for BufferSink {
    fn log(&self, message: &str) {
        let mut guard = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(message.to_string());
    }
}

/// The pre-workspace run type: a run bundled with the workspace it executes
/// in. Exists only for the legacy contract and the convenience entry points;
/// new code passes [`RunContext`] and [`Workspace`] separately.
#[derive(Debug, Clone)]
pub struct LegacyBuild {
    run: RunContext,
    workspace: Workspace,
}

impl LegacyBuild {
    /// Bundle a run with its workspace.
    #[must_use]
    pub fn new(run: RunContext, workspace: Workspace) -> Self {
        Self { run, workspace }
    }

    /// The run this build stands for.
    #[must_use]
    pub fn run(&self) -> &RunContext {
        &self.run
    }

    /// The workspace the run executes in.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}
