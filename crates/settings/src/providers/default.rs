//! No-op provider deferring to the tool's built-in settings

use crate::context::{DiagnosticSink, RunContext, Workspace, WorkspacePath};
use crate::{SettingsError, SettingsProvider};
use async_trait::async_trait;

/// The "no explicit settings" provider.
///
/// Always resolves to `None`, performs no side effects and cannot fail.
/// Selected whenever a configuration submission carries no settings section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultSettingsProvider;

impl DefaultSettingsProvider {
    /// Create the default provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SettingsProvider for DefaultSettingsProvider {
    fn provider_name(&self) -> &'static str {
        "default"
    }

    async fn supply_settings(
        &self,
        _run: &RunContext,
        _workspace: &Workspace,
        _sink: &dyn DiagnosticSink,
    ) -> Result<Option<WorkspacePath>, SettingsError> {
        Ok(None)
    }
}
