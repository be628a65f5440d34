//! Settings-file resolution for build tool invocations
//!
//! Provides a unified interface for resolving the settings file an external
//! build-tool run should use, via pluggable provider strategies (a default
//! no-op, a controller-side file, inline content, etc.) selected from
//! externally submitted configuration.
//!
//! # Resolution flow
//!
//! ```ignore
//! use build_settings::{ProviderRegistry, resolve_provider};
//!
//! // Once per configuration submission: pick the effective provider.
//! let registry = ProviderRegistry::builtin();
//! let provider = resolve_provider(form.as_ref(), &registry)?;
//!
//! // Per run, possibly several times: resolve the settings path.
//! match provider.supply_settings(&run, &workspace, &sink).await? {
//!     Some(path) => { /* pass `path` to the tool invocation */ }
//!     None => { /* let the tool use its built-in defaults */ }
//! }
//! ```
//!
//! An absent path is not an error: it means no special settings were
//! requested. Genuine failures (transfer I/O, interruption, an unmigrated
//! provider) always surface as [`SettingsError`].

pub mod context;
mod legacy;
mod placement;
pub mod providers;
mod registry;

pub use context::{
    BufferSink, DiagnosticSink, LegacyBuild, NullSink, RunContext, RunId, Workspace, WorkspacePath,
};
pub use legacy::{
    LegacyAdapter, LegacyFailure, LegacySettingsProvider, settings_file_path, settings_remote_path,
    try_settings_file_path,
};
pub use placement::{FilePlacement, LocalPlacement};
pub use providers::{DefaultSettingsProvider, FileSettingsProvider, InlineSettingsProvider};
pub use registry::{BindError, ProviderRegistry, resolve_provider};

use async_trait::async_trait;
use thiserror::Error;

/// Error types for settings resolution
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A concrete provider overrides neither the current nor the legacy
    /// operation. This is a defect in the provider, not a run-time condition.
    #[error("provider '{provider}' implements neither the current nor the legacy settings operation")]
    NotMigrated {
        /// Name of the offending provider
        provider: String,
    },

    /// Materializing the settings file into the workspace failed
    #[error("failed to materialize settings for run '{run}' in workspace '{workspace}'")]
    Io {
        /// Run the settings were being prepared for
        run: String,
        /// Workspace root the file was being placed under
        workspace: String,
        /// Underlying placement failure
        #[source]
        source: std::io::Error,
    },

    /// The run was interrupted while resolution was in flight
    #[error("run '{run}' was interrupted while resolving settings")]
    Cancelled {
        /// Run that was interrupted
        run: String,
    },
}

/// Trait for resolving the settings file of a build-tool run.
///
/// Implementors must provide:
/// - [`supply_settings`](SettingsProvider::supply_settings) - the current operation
/// - [`provider_name`](SettingsProvider::provider_name) - identifier used by the
///   registry and in diagnostics
///
/// The legacy operation has a default implementation that delegates to the
/// current one; only implementations predating the workspace-aware signature
/// override it. Types that override neither operation fail loudly with
/// [`SettingsError::NotMigrated`] instead of silently resolving to nothing.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Get the provider name for this implementation.
    ///
    /// Used as the registry key for form binding and in diagnostics.
    /// Examples: `"default"`, `"fileProvider"`, `"inlineProvider"`
    fn provider_name(&self) -> &'static str;

    /// Resolve the settings file for `run` within `workspace`.
    ///
    /// `Ok(None)` means the tool should fall back to its built-in default
    /// settings; `Ok(Some(path))` is a location readable on the workspace's
    /// filesystem at return time. The operation may write a new file into the
    /// workspace as part of resolving the path.
    ///
    /// Implementations should be aware that this may get called multiple
    /// times during a single run and must not rely on call order.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when materialization fails,
    /// [`SettingsError::Cancelled`] when the run is interrupted mid-flight,
    /// and [`SettingsError::NotMigrated`] from the default body for
    /// implementations that have not adopted this operation yet.
    async fn supply_settings(
        &self,
        run: &RunContext,
        workspace: &Workspace,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<WorkspacePath>, SettingsError> {
        let _ = (run, workspace, sink);
        Err(SettingsError::NotMigrated {
            provider: self.provider_name().to_string(),
        })
    }

    /// Resolve the settings file through the pre-workspace signature.
    ///
    /// Retained for callers that still hold only a [`LegacyBuild`]; new code
    /// should call [`supply_settings`](SettingsProvider::supply_settings)
    /// directly. The default implementation derives the workspace from the
    /// build and delegates to the current operation, wrapping any failure in
    /// a [`LegacyFailure`] that records which run and workspace the settings
    /// were being prepared for.
    ///
    /// # Errors
    ///
    /// Returns [`LegacyFailure`] wrapping the underlying [`SettingsError`].
    async fn supply_settings_legacy(
        &self,
        build: &LegacyBuild,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<WorkspacePath>, LegacyFailure> {
        self.supply_settings(build.run(), build.workspace(), sink)
            .await
            .map_err(|source| LegacyFailure::new(build, source))
    }
}

// Test-only Debug for trait objects so tests can debug-format
// `Result<Arc<dyn SettingsProvider>, _>` values.
#[cfg(test)]
impl std::fmt::Debug for dyn SettingsProvider + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsProvider")
            .field("provider_name", &self.provider_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NullSink;

    struct UnmigratedProvider;

    #[async_trait]
    impl SettingsProvider for UnmigratedProvider {
        fn provider_name(&self) -> &'static str {
            "unmigrated"
        }
    }

    fn fixture() -> (RunContext, Workspace) {
        let run = RunContext::new(RunId::new("job", 1));
        let workspace = Workspace::local("/tmp/ws");
        (run, workspace)
    }

    #[tokio::test]
    async fn unmigrated_provider_fails_loudly() {
        let (run, workspace) = fixture();
        let result = UnmigratedProvider
            .supply_settings(&run, &workspace, &NullSink)
            .await;

        match result {
            Err(SettingsError::NotMigrated { provider }) => assert_eq!(provider, "unmigrated"),
            other => panic!("expected NotMigrated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unmigrated_provider_fails_through_legacy_operation_too() {
        let (run, workspace) = fixture();
        let build = LegacyBuild::new(run, workspace);
        let result = UnmigratedProvider
            .supply_settings_legacy(&build, &NullSink)
            .await;

        let failure = result.err().map(LegacyFailure::into_source);
        assert!(matches!(failure, Some(SettingsError::NotMigrated { .. })));
    }

    #[test]
    fn error_io_display_names_run_and_workspace() {
        let err = SettingsError::Io {
            run: "job #7".to_string(),
            workspace: "/ws/job".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("job #7"));
        assert!(msg.contains("/ws/job"));
    }

    #[test]
    fn error_cancelled_display_names_run() {
        let err = SettingsError::Cancelled {
            run: "job #7".to_string(),
        };
        assert!(err.to_string().contains("interrupted"));
        assert!(err.to_string().contains("job #7"));
    }

    #[test]
    fn error_not_migrated_display_names_provider() {
        let err = SettingsError::NotMigrated {
            provider: "thirdParty".to_string(),
        };
        assert!(err.to_string().contains("thirdParty"));
    }
}
