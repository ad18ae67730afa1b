//! # Shopify Session Storage and Settings Persistence for Sea-ORM
//!
//! The data-access layer of a Shopify embedded-app backend, built on
//! [Sea-ORM](https://crates.io/crates/sea-orm): a session-persistence
//! adapter satisfying the session capability contract of the authentication
//! library, and a generic key/value settings service addressing one of
//! several independently configured databases.
//!
//! ## Features
//!
//! - Persistent session storage in the `shopify_sessions` table, with
//!   upsert-by-id, shop-scoped lookup, and transactional bulk deletion
//! - Degrade-on-failure semantics at the [`SessionStorage`] contract
//!   boundary, with a typed-error `try_*` core underneath
//! - A [`SettingsService`] for key/value/timestamp tables, bindable to any
//!   of the configured databases, built on raw parameterized statement
//!   primitives that are also exposed directly
//! - Typed multi-database configuration ([`DatabaseBindings`]) and an
//!   explicit [`AppContext`] instead of process-wide globals
//! - Schema management through a Sea-ORM migrator (feature `migration`,
//!   default on)
//!
//! ## Quick Start
//!
//! ```no_run
//! use sea_orm::Database;
//! use shopify_sessions_seaorm_store::{
//!     AppContext, DatabaseBinding, DatabaseBindings, Session, SessionStorage,
//!     SqlSessionStorage,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Connect the primary database and bring up the sessions schema.
//! let db = Database::connect("sqlite://shopify.db?mode=rwc").await?;
//! let sessions = SqlSessionStorage::new(db.clone());
//! sessions.migrate().await?;
//!
//! // Describe the configured bindings; unconfigured ones stay `None`.
//! let bindings = DatabaseBindings {
//!     db: Some(db),
//!     ..DatabaseBindings::default()
//! };
//! let ctx = AppContext::new(sessions, bindings);
//!
//! // The authentication library drives the session store...
//! let session = Session::new("sess1", "store.myshopify.com", false);
//! assert!(ctx.sessions.store_session(&session).await);
//!
//! // ...while routes talk to settings tables through a bound service.
//! let settings = ctx.settings(DatabaseBinding::Db)?;
//! settings.ensure_table("settings").await?;
//! settings.set("settings", "test_checkbox", "true").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The two components deliberately differ. Session operations behind
//! [`SessionStorage`] log failures and degrade to `false` / `None` / empty,
//! because the authentication flow must survive a database hiccup; the
//! fallible core is still reachable through the `try_*` methods on
//! [`SqlSessionStorage`]. Settings operations propagate
//! [`SettingsError`](settings::SettingsError) for the caller to render.

pub mod bindings;
pub mod context;
pub mod entity;
#[cfg(feature = "migration")]
pub mod migration;
pub mod session;
pub mod settings;
pub mod storage;

/// Recognized database binding names and the typed set of configured
/// handles.
pub use bindings::{DatabaseBinding, DatabaseBindings, UnknownBinding};

/// The explicit application context carrying session storage and bindings.
pub use context::AppContext;

/// The session record persisted for the authentication library.
pub use session::Session;

/// Key/value settings persistence over a bound database.
pub use settings::{Setting, SettingsError, SettingsService};

/// The session capability contract and its Sea-ORM-backed implementation.
pub use storage::{SessionStorage, SqlSessionStorage, StorageError};

/// Database connection type, re-exported from Sea-ORM for convenience.
pub use sea_orm::DatabaseConnection;
