//! Provider registry and submitted-form binding
//!
//! Turns externally submitted configuration (a JSON form) into a concrete
//! [`SettingsProvider`] instance. The registry is an explicit, injected
//! mapping from provider identifiers to typed factories; there is no ambient
//! discovery, so resolution is deterministic and testable in isolation.

use crate::SettingsProvider;
use crate::providers::{DefaultSettingsProvider, FileSettingsProvider, InlineSettingsProvider};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Error types for provider binding.
///
/// These surface to whoever submitted the configuration (typically rendered
/// back on a form), never to the build engine.
#[derive(Debug, Error)]
pub enum BindError {
    /// The submission does not have the shape the protocol expects
    #[error("malformed settings submission: {reason}")]
    MalformedRequest {
        /// What was wrong with the submitted structure
        reason: String,
    },

    /// No factory is registered for the submitted provider identifier
    #[error("unknown settings provider '{provider}' (known providers: {known:?})")]
    UnknownProvider {
        /// The identifier that was submitted
        provider: String,
        /// Identifiers the registry does know
        known: Vec<String>,
    },

    /// The submitted parameters do not validate against the provider's schema
    #[error("invalid parameters for settings provider '{provider}'")]
    InvalidParams {
        /// The provider the parameters were meant for
        provider: String,
        /// Underlying deserialization failure
        #[source]
        source: serde_json::Error,
    },
}

type FactoryFn =
    Box<dyn Fn(&Value) -> Result<Arc<dyn SettingsProvider>, serde_json::Error> + Send + Sync>;

/// Registry of settings provider factories, keyed by provider identifier.
///
/// Consumers register their provider types up front and pass the registry to
/// [`resolve_provider`] when processing a configuration submission.
///
/// # Example
///
/// ```ignore
/// use build_settings::{ProviderRegistry, FileSettingsProvider};
///
/// let mut registry = ProviderRegistry::new();
/// registry.register::<FileSettingsProvider>(FileSettingsProvider::ID);
///
/// let provider = registry.bind("fileProvider", &params)?;
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<&'static str, FactoryFn>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in providers.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<FileSettingsProvider>(FileSettingsProvider::ID);
        registry.register::<InlineSettingsProvider>(InlineSettingsProvider::ID);
        registry
    }

    /// Register a provider type under `id`.
    ///
    /// The submitted parameter object is validated against `P`'s serde
    /// schema at bind time. Registering the same identifier again replaces
    /// the previous factory.
    pub fn register<P>(&mut self, id: &'static str)
    where
        P: SettingsProvider + DeserializeOwned + 'static,
    {
        self.factories.insert(
            id,
            Box::new(|params: &Value| {
                let provider: P = serde_json::from_value(params.clone())?;
                Ok(Arc::new(provider) as Arc<dyn SettingsProvider>)
            }),
        );
    }

    /// Check if a factory is registered for the given identifier
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Get all registered provider identifiers, sorted for stable diagnostics
    #[must_use]
    pub fn providers(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Instantiate the provider registered under `id` from submitted
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnknownProvider`] when nothing is registered for
    /// `id`, and [`BindError::InvalidParams`] when the parameters do not
    /// deserialize into the registered type.
    pub fn bind(&self, id: &str, params: &Value) -> Result<Arc<dyn SettingsProvider>, BindError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| BindError::UnknownProvider {
                provider: id.to_string(),
                known: self.providers().iter().map(ToString::to_string).collect(),
            })?;

        factory(params).map_err(|source| BindError::InvalidParams {
            provider: id.to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

/// Select the effective provider for one configuration submission.
///
/// An absent form, an absent or `null` `"settings"` section, or an empty
/// section all select the [`DefaultSettingsProvider`]. Otherwise the section
/// must be an object whose `"provider"` field names a registered identifier;
/// the remaining fields are passed to the registered factory as parameters.
///
/// This is pure selection: no I/O happens here.
///
/// # Errors
///
/// Returns [`BindError::MalformedRequest`] when the section is not an object
/// or names no provider, and propagates the registry's binding failures
/// unchanged.
pub fn resolve_provider(
    form: Option<&Value>,
    registry: &ProviderRegistry,
) -> Result<Arc<dyn SettingsProvider>, BindError> {
    let section = match form.and_then(|f| f.get("settings")) {
        None | Some(Value::Null) => return Ok(Arc::new(DefaultSettingsProvider::new())),
        Some(section) => section,
    };

    let Some(object) = section.as_object() else {
        return Err(BindError::MalformedRequest {
            reason: "'settings' section is not an object".to_string(),
        });
    };
    if object.is_empty() {
        return Ok(Arc::new(DefaultSettingsProvider::new()));
    }

    let Some(id) = object.get("provider").and_then(Value::as_str) else {
        return Err(BindError::MalformedRequest {
            reason: "'settings' section names no 'provider'".to_string(),
        });
    };

    // Everything besides the discriminator is the provider's parameters.
    let mut params = object.clone();
    params.remove("provider");

    tracing::debug!(provider = id, "binding submitted settings provider");
    registry.bind(id, &Value::Object(params))
}
