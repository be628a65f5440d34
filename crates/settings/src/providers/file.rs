//! Provider materializing a controller-side settings file

use super::SETTINGS_DEST;
use crate::context::{DiagnosticSink, RunContext, Workspace, WorkspacePath};
use crate::{SettingsError, SettingsProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resolves settings from a file path configured on the controller.
///
/// The file is transferred into the run's workspace through its placement
/// collaborator, so the resolved path is valid on the execution node even
/// when the workspace lives on a remote agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettingsProvider {
    /// Controller-side path of the settings file to transfer.
    pub path: PathBuf,
}

impl FileSettingsProvider {
    /// Identifier this provider is registered under.
    pub const ID: &'static str = "fileProvider";

    /// Create a provider for the given controller-side path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsProvider {
    fn provider_name(&self) -> &'static str {
        Self::ID
    }

    async fn supply_settings(
        &self,
        run: &RunContext,
        workspace: &Workspace,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<WorkspacePath>, SettingsError> {
        run.check_cancelled()?;
        sink.log(&format!("using settings file {}", self.path.display()));

        let placed = workspace
            .materialize_from(&self.path, Path::new(SETTINGS_DEST))
            .await
            .map_err(|source| SettingsError::Io {
                run: run.id().to_string(),
                workspace: workspace.root().display().to_string(),
                source,
            })?;

        tracing::debug!(
            run = %run.id(),
            source = %self.path.display(),
            dest = %placed,
            "materialized settings file into workspace"
        );
        Ok(Some(placed))
    }
}
