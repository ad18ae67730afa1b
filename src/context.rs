//! Explicit application-wide state, replacing process-level globals.

use tracing::info;

use crate::bindings::{DatabaseBinding, DatabaseBindings};
use crate::settings::{SettingsError, SettingsService};
use crate::storage::SqlSessionStorage;

/// Everything request handlers need from the data-access layer.
///
/// Constructed once at process start, before any concurrent request
/// handling begins, and then passed (cloned or by reference) into every
/// handler. The contained connection handles are reference-counted, so
/// clones are cheap and all of them address the same pools. There is no
/// lazily-initialized global anywhere; if a handler has an `AppContext`,
/// the databases it describes were resolved at startup.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Session persistence for the authentication library.
    pub sessions: SqlSessionStorage,
    /// The configured database bindings for the settings service.
    pub bindings: DatabaseBindings,
}

impl AppContext {
    /// Assembles the context, logging which bindings the deployment
    /// configured.
    pub fn new(sessions: SqlSessionStorage, bindings: DatabaseBindings) -> Self {
        for binding in bindings.configured() {
            info!(%binding, "database binding configured");
        }

        Self { sessions, bindings }
    }

    /// Returns a settings service already bound to `binding`, or the
    /// `Unavailable` error when the deployment did not configure it.
    pub fn settings(&self, binding: DatabaseBinding) -> Result<SettingsService, SettingsError> {
        let mut service = SettingsService::new(binding);

        if service.bind(&self.bindings, binding) {
            Ok(service)
        } else {
            Err(SettingsError::Unavailable(binding))
        }
    }
}
