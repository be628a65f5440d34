//! Provider materializing settings content stored with the job

use super::SETTINGS_DEST;
use crate::context::{DiagnosticSink, RunContext, Workspace, WorkspacePath};
use crate::{SettingsError, SettingsProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolves settings from content submitted with the job configuration.
///
/// The content is written into the run's workspace on every resolution, so
/// it follows the job to whichever node the run executes on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InlineSettingsProvider {
    /// Settings document to write into the workspace.
    pub content: String,
}

impl InlineSettingsProvider {
    /// Identifier this provider is registered under.
    pub const ID: &'static str = "inlineProvider";

    /// Create a provider for the given settings document.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl SettingsProvider for InlineSettingsProvider {
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
        sink.log("using settings stored with the job configuration");

        let placed = workspace
            .materialize_bytes(self.content.as_bytes(), Path::new(SETTINGS_DEST))
            .await
            .map_err(|source| SettingsError::Io {
                run: run.id().to_string(),
                workspace: workspace.root().display().to_string(),
                source,
            })?;

        tracing::debug!(
            run = %run.id(),
            dest = %placed,
            bytes = self.content.len(),
            "wrote job settings into workspace"
        );
        Ok(Some(placed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{NullSink, RunId};

    #[tokio::test]
    async fn writes_content_under_workspace() {
        let ws_dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::local(ws_dir.path());
        let run = RunContext::new(RunId::new("job", 2));

        let provider = InlineSettingsProvider::new("<settings><profiles/></settings>");
        let path = provider
            .supply_settings(&run, &workspace, &NullSink)
            .await
            .unwrap()
            .unwrap();

        assert!(path.as_path().starts_with(ws_dir.path()));
        let content = tokio::fs::read_to_string(path.as_path()).await.unwrap();
        assert_eq!(content, "<settings><profiles/></settings>");
    }

    #[tokio::test]
    async fn rewrites_on_every_resolution() {
        let ws_dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::local(ws_dir.path());
        let run = RunContext::new(RunId::new("job", 2));

        let first = InlineSettingsProvider::new("<settings>a</settings>")
            .supply_settings(&run, &workspace, &NullSink)
            .await
            .unwrap()
            .unwrap();
        let second = InlineSettingsProvider::new("<settings>b</settings>")
            .supply_settings(&run, &workspace, &NullSink)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first, second);
        let content = tokio::fs::read_to_string(second.as_path()).await.unwrap();
        assert_eq!(content, "<settings>b</settings>");
    }

    #[test]
    fn binds_from_submitted_parameters() {
        let provider: InlineSettingsProvider =
            serde_json::from_value(serde_json::json!({ "content": "<settings/>" })).unwrap();
        assert_eq!(provider.content, "<settings/>");
    }
}
