//! Legacy contract bridge and null-safe convenience entry points
//!
//! An earlier version of the provider contract took only a build (which
//! bundled its workspace) and had no failure channel. This module keeps both
//! directions working during the migration:
//!
//! - implementations written against the old shape keep functioning through
//!   [`LegacyAdapter`] (composition, no inheritance), and through the trait's
//!   defaulted legacy operation;
//! - old call sites still holding a [`LegacyBuild`] go through the
//!   [`settings_file_path`] / [`settings_remote_path`] helpers, which prefer
//!   the current operation and only fall back to the legacy one for
//!   genuinely unmigrated providers.
//!
//! The old signature had nowhere to declare I/O or interruption failures, so
//! these entry points wrap them in [`LegacyFailure`]. The wrapper keeps the
//! underlying kind reachable ([`LegacyFailure::is_cancellation`],
//! [`LegacyFailure::into_source`]); engines that want to apply their own
//! retry policy instead use [`try_settings_file_path`], which propagates the
//! plain [`SettingsError`].

use crate::context::{DiagnosticSink, LegacyBuild, WorkspacePath};
use crate::{SettingsError, SettingsProvider};
use async_trait::async_trait;
use thiserror::Error;

/// Fatal-kind failure raised at the legacy contract boundary.
///
/// Carries the run and workspace the settings were being prepared for, with
/// the original [`SettingsError`] as source.
#[derive(Debug, Error)]
#[error("failed to prepare settings for run '{run}' in workspace '{workspace}'")]
pub struct LegacyFailure {
    run: String,
    workspace: String,
    #[source]
    source: SettingsError,
}

impl LegacyFailure {
    pub(crate) fn new(build: &LegacyBuild, source: SettingsError) -> Self {
        Self {
            run: build.run().id().to_string(),
            workspace: build.workspace().root().display().to_string(),
            source,
        }
    }

    /// Run the settings were being prepared for.
    #[must_use]
    pub fn run(&self) -> &str {
        &self.run
    }

    /// Workspace root the settings were being placed under.
    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Whether the underlying failure was an interruption of the run.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self.source, SettingsError::Cancelled { .. })
    }

    /// Whether the underlying failure was a materialization I/O error.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self.source, SettingsError::Io { .. })
    }

    /// Recover the underlying failure, e.g. to drive an engine-level retry
    /// decision.
    #[must_use]
    pub fn into_source(self) -> SettingsError {
        self.source
    }
}

/// The pre-workspace provider contract.
///
/// Third-party implementations written before the workspace-aware operation
/// implement this trait; [`LegacyAdapter`] makes them usable wherever a
/// [`SettingsProvider`] is expected.
#[async_trait]
pub trait LegacySettingsProvider: Send + Sync {
    /// Identifier of this provider, mirroring
    /// [`SettingsProvider::provider_name`].
    fn provider_name(&self) -> &'static str;

    /// Resolve the settings file for `build`, the pre-workspace signature.
    ///
    /// # Errors
    ///
    /// Returns [`LegacyFailure`]; the old contract had no finer-grained
    /// failure channel.
    async fn supply_settings(
        &self,
        build: &LegacyBuild,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<WorkspacePath>, LegacyFailure>;
}

/// Composition adapter lifting a [`LegacySettingsProvider`] onto the current
/// contract.
///
/// The current operation reassembles the narrower build type the wrapped
/// implementation expects and unwraps its [`LegacyFailure`] back into the
/// declared failure channel, so callers of the current operation see the
/// same result they would have seen through the old one.
#[derive(Debug, Clone)]
pub struct LegacyAdapter<P> {
    inner: P,
}

impl<P> LegacyAdapter<P> {
    /// Wrap a legacy-only implementation.
    #[must_use]
    pub const fn new(inner: P) -> Self {
        Self { inner }
    }

    /// Unwrap the adapted implementation.
    #[must_use]
    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[async_trait]
impl<P: LegacySettingsProvider> SettingsProvider for LegacyAdapter<P> {
    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    async fn supply_settings(
        &self,
        run: &crate::context::RunContext,
        workspace: &crate::context::Workspace,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<WorkspacePath>, SettingsError> {
        let build = LegacyBuild::new(run.clone(), workspace.clone());
        self.inner
            .supply_settings(&build, sink)
            .await
            .map_err(LegacyFailure::into_source)
    }

    async fn supply_settings_legacy(
        &self,
        build: &LegacyBuild,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<WorkspacePath>, LegacyFailure> {
        self.inner.supply_settings(build, sink).await
    }
}

/// Null-safe resolution for callers still holding only a [`LegacyBuild`],
/// with the failure kind preserved.
///
/// An absent provider resolves to `Ok(None)` without invoking anything. For
/// a present provider the current operation is called with the workspace
/// derived from the build; if the provider reports
/// [`SettingsError::NotMigrated`], resolution falls back to its legacy
/// operation.
///
/// # Errors
///
/// Propagates the provider's [`SettingsError`] unchanged, leaving retry
/// policy to the caller.
pub async fn try_settings_file_path(
    provider: Option<&dyn SettingsProvider>,
    build: &LegacyBuild,
    sink: &dyn DiagnosticSink,
) -> Result<Option<WorkspacePath>, SettingsError> {
    let Some(provider) = provider else {
        return Ok(None);
    };
    match provider
        .supply_settings(build.run(), build.workspace(), sink)
        .await
    {
        Err(SettingsError::NotMigrated { provider: name }) => {
            tracing::debug!(
                provider = %name,
                "provider predates the current contract, using its legacy operation"
            );
            provider
                .supply_settings_legacy(build, sink)
                .await
                .map_err(LegacyFailure::into_source)
        }
        other => other,
    }
}

/// Null-safe resolution for callers still holding only a [`LegacyBuild`].
///
/// Matches the historical policy: any failure is wrapped into the fatal-kind
/// [`LegacyFailure`] naming the run and workspace. See
/// [`try_settings_file_path`] for the propagating variant.
///
/// # Errors
///
/// Returns [`LegacyFailure`] wrapping any [`SettingsError`] the provider
/// raised.
pub async fn settings_file_path(
    provider: Option<&dyn SettingsProvider>,
    build: &LegacyBuild,
    sink: &dyn DiagnosticSink,
) -> Result<Option<WorkspacePath>, LegacyFailure> {
    try_settings_file_path(provider, build, sink)
        .await
        .map_err(|source| LegacyFailure::new(build, source))
}

/// Like [`settings_file_path`], returning the textual path form used on a
/// tool command line.
///
/// # Errors
///
/// Returns [`LegacyFailure`] wrapping any [`SettingsError`] the provider
/// raised.
pub async fn settings_remote_path(
    provider: Option<&dyn SettingsProvider>,
    build: &LegacyBuild,
    sink: &dyn DiagnosticSink,
) -> Result<Option<String>, LegacyFailure> {
    let path = settings_file_path(provider, build, sink).await?;
    Ok(path.map(|p| p.remote()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{NullSink, RunContext, RunId, Workspace};

    /// Implements only the current operation.
    struct CurrentOnly;

    #[async_trait]
    impl SettingsProvider for CurrentOnly {
        fn provider_name(&self) -> &'static str {
            "currentOnly"
        }

        async fn supply_settings(
            &self,
            _run: &RunContext,
            workspace: &Workspace,
            _sink: &dyn DiagnosticSink,
        ) -> Result<Option<WorkspacePath>, SettingsError> {
            Ok(Some(WorkspacePath::new(
                workspace.root().join("settings.xml"),
            )))
        }
    }

    /// Implements only the pre-workspace contract.
    struct LegacyOnly;

    #[async_trait]
    impl LegacySettingsProvider for LegacyOnly {
        fn provider_name(&self) -> &'static str {
            "legacyOnly"
        }

        async fn supply_settings(
            &self,
            build: &LegacyBuild,
            _sink: &dyn DiagnosticSink,
        ) -> Result<Option<WorkspacePath>, LegacyFailure> {
            Ok(Some(WorkspacePath::new(
                build.workspace().root().join("legacy-settings.xml"),
            )))
        }
    }

    /// Overrides only the legacy operation of the current trait.
    struct LegacyOverrideOnly;

    #[async_trait]
    impl SettingsProvider for LegacyOverrideOnly {
        fn provider_name(&self) -> &'static str {
            "legacyOverride"
        }

        async fn supply_settings_legacy(
            &self,
            build: &LegacyBuild,
            _sink: &dyn DiagnosticSink,
        ) -> Result<Option<WorkspacePath>, LegacyFailure> {
            Ok(Some(WorkspacePath::new(
                build.workspace().root().join("old-path.xml"),
            )))
        }
    }

    fn build() -> LegacyBuild {
        LegacyBuild::new(RunContext::new(RunId::new("job", 5)), Workspace::local("/ws/job"))
    }

    #[tokio::test]
    async fn absent_provider_resolves_to_none() {
        let result = settings_file_path(None, &build(), &NullSink).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn adapter_routes_current_operation_to_legacy_implementation() {
        let build = build();
        let adapted = LegacyAdapter::new(LegacyOnly);

        let via_current = adapted
            .supply_settings(build.run(), build.workspace(), &NullSink)
            .await
            .unwrap();
        let direct = LegacyOnly
            .supply_settings(&build, &NullSink)
            .await
            .unwrap();

        assert_eq!(via_current, direct);
        assert_eq!(adapted.provider_name(), "legacyOnly");
    }

    #[tokio::test]
    async fn facade_matches_direct_current_operation() {
        let build = build();
        let provider = CurrentOnly;

        let via_facade = settings_file_path(Some(&provider), &build, &NullSink)
            .await
            .unwrap();
        let direct = provider
            .supply_settings(build.run(), build.workspace(), &NullSink)
            .await
            .unwrap();

        assert_eq!(via_facade, direct);
    }

    #[tokio::test]
    async fn facade_falls_back_to_legacy_operation_for_unmigrated_provider() {
        let build = build();
        let path = settings_file_path(Some(&LegacyOverrideOnly), &build, &NullSink)
            .await
            .unwrap();

        assert_eq!(
            path,
            Some(WorkspacePath::new("/ws/job/old-path.xml"))
        );
    }

    #[tokio::test]
    async fn remote_path_is_textual_form() {
        let build = build();
        let remote = settings_remote_path(Some(&CurrentOnly), &build, &NullSink)
            .await
            .unwrap();

        assert_eq!(remote.as_deref(), Some("/ws/job/settings.xml"));
    }

    #[tokio::test]
    async fn failure_wrapping_keeps_kind_and_context() {
        struct Failing;

        #[async_trait]
        impl SettingsProvider for Failing {
            fn provider_name(&self) -> &'static str {
                "failing"
            }

            async fn supply_settings(
                &self,
                run: &RunContext,
                workspace: &Workspace,
                _sink: &dyn DiagnosticSink,
            ) -> Result<Option<WorkspacePath>, SettingsError> {
                Err(SettingsError::Io {
                    run: run.id().to_string(),
                    workspace: workspace.root().display().to_string(),
                    source: std::io::Error::other("transfer failed"),
                })
            }
        }

        let build = build();
        let failure = settings_file_path(Some(&Failing), &build, &NullSink)
            .await
            .unwrap_err();

        assert!(failure.is_io());
        assert!(!failure.is_cancellation());
        assert_eq!(failure.run(), "job #5");
        assert_eq!(failure.workspace(), "/ws/job");
        assert!(matches!(failure.into_source(), SettingsError::Io { .. }));
    }

    #[tokio::test]
    async fn try_variant_propagates_the_plain_error() {
        struct Interrupted;

        #[async_trait]
        impl SettingsProvider for Interrupted {
            fn provider_name(&self) -> &'static str {
                "interrupted"
            }

            async fn supply_settings(
                &self,
                run: &RunContext,
                _workspace: &Workspace,
                _sink: &dyn DiagnosticSink,
            ) -> Result<Option<WorkspacePath>, SettingsError> {
                Err(SettingsError::Cancelled {
                    run: run.id().to_string(),
                })
            }
        }

        let build = build();
        let result = try_settings_file_path(Some(&Interrupted), &build, &NullSink).await;

        assert!(matches!(result, Err(SettingsError::Cancelled { .. })));
    }
}
