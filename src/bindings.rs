//! Typed configuration of the available database handles.
//!
//! A deployment exposes up to three independent databases under the binding
//! names `DB`, `DB2`, and `DB3`. Instead of probing an untyped environment
//! bag by string, the recognized names are an enum and the configured
//! handles a struct of typed optionals, so a missing binding is an ordinary
//! `None` rather than a runtime lookup miss.

use std::fmt;
use std::str::FromStr;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

/// One of the recognized database binding names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseBinding {
    /// The primary binding, `DB`. Also backs session storage.
    Db,
    /// The secondary binding, `DB2`.
    Db2,
    /// The tertiary binding, `DB3`.
    Db3,
}

impl DatabaseBinding {
    /// Every recognized binding, in configuration order.
    pub const ALL: [DatabaseBinding; 3] =
        [DatabaseBinding::Db, DatabaseBinding::Db2, DatabaseBinding::Db3];

    /// The deployment-facing name of this binding.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBinding::Db => "DB",
            DatabaseBinding::Db2 => "DB2",
            DatabaseBinding::Db3 => "DB3",
        }
    }
}

impl fmt::Display for DatabaseBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the recognized bindings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized database binding: {0}")]
pub struct UnknownBinding(pub String);

impl FromStr for DatabaseBinding {
    type Err = UnknownBinding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DB" => Ok(DatabaseBinding::Db),
            "DB2" => Ok(DatabaseBinding::Db2),
            "DB3" => Ok(DatabaseBinding::Db3),
            other => Err(UnknownBinding(other.to_owned())),
        }
    }
}

/// The set of database handles a deployment actually configured.
///
/// Built once at process start; not every deployment configures every
/// binding, and absence is a normal condition rather than an error.
/// Connection handles are internally reference-counted, so the struct is
/// cheap to clone into request handlers.
#[derive(Debug, Clone, Default)]
pub struct DatabaseBindings {
    /// Handle for the `DB` binding.
    pub db: Option<DatabaseConnection>,
    /// Handle for the `DB2` binding.
    pub db2: Option<DatabaseConnection>,
    /// Handle for the `DB3` binding.
    pub db3: Option<DatabaseConnection>,
}

impl DatabaseBindings {
    /// Looks up the handle configured for `binding`, if any.
    pub fn get(&self, binding: DatabaseBinding) -> Option<&DatabaseConnection> {
        match binding {
            DatabaseBinding::Db => self.db.as_ref(),
            DatabaseBinding::Db2 => self.db2.as_ref(),
            DatabaseBinding::Db3 => self.db3.as_ref(),
        }
    }

    /// Iterates over the bindings that have a configured handle, for
    /// startup validation and logging.
    pub fn configured(&self) -> impl Iterator<Item = DatabaseBinding> + '_ {
        DatabaseBinding::ALL
            .into_iter()
            .filter(|binding| self.get(*binding).is_some())
    }
}
