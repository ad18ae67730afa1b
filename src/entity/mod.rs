//! Database entity models for the session storage adapter.
//!
//! Contains the Sea-ORM entity definition for the `shopify_sessions` table.
//! Settings tables are intentionally not modelled as entities: their names
//! are chosen at runtime, so the settings service speaks to them through raw
//! statements instead.

/// Session entity mapping to the `shopify_sessions` table.
pub mod session;
