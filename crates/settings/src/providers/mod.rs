//! Built-in settings providers
//!
//! - [`DefaultSettingsProvider`] - defer to the tool's own defaults
//! - [`FileSettingsProvider`] - materialize a controller-side file
//! - [`InlineSettingsProvider`] - materialize submitted content
//!
//! Further providers (e.g. remote-fetched settings) live in downstream
//! crates and plug in through the same registry.

mod default;
mod file;
mod inline;

pub use default::DefaultSettingsProvider;
pub use file::FileSettingsProvider;
pub use inline::InlineSettingsProvider;

/// Workspace-relative destination for materialized settings files.
pub(crate) const SETTINGS_DEST: &str = ".settings/settings.xml";
