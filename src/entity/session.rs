//! Session entity model for Sea-ORM database interaction.
//!
//! Defines the schema representation of the `shopify_sessions` table. Column
//! names keep the camelCase spelling of the wire schema, mapped onto
//! snake_case Rust fields via `column_name` overrides.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing one stored session.
///
/// # Database Schema
///
/// | Column           | Type               | Description                          |
/// |------------------|--------------------|--------------------------------------|
/// | id               | TEXT (Primary Key) | Session ID                           |
/// | shop             | TEXT NOT NULL      | Shop domain the session belongs to   |
/// | state            | TEXT               | OAuth state nonce                    |
/// | isOnline         | INTEGER            | Online/offline flag                  |
/// | scope            | TEXT               | Granted scopes, comma-separated      |
/// | accessToken      | TEXT               | API access token                     |
/// | expires          | INTEGER            | Expiry as epoch milliseconds         |
/// | onlineAccessInfo | TEXT               | Online-access metadata as JSON text  |
///
/// This entity is used internally by the storage adapter; the public record
/// type is [`crate::Session`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shopify_sessions")]
pub struct Model {
    /// The externally generated session identifier.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// The shop key, used for bulk lookups across a tenant's sessions.
    pub shop: String,

    pub state: Option<String>,

    #[sea_orm(column_name = "isOnline")]
    pub is_online: bool,

    pub scope: Option<String>,

    #[sea_orm(column_name = "accessToken")]
    pub access_token: Option<String>,

    /// Expiry as epoch milliseconds; NULL for sessions that never expire.
    pub expires: Option<i64>,

    #[sea_orm(column_name = "onlineAccessInfo")]
    pub online_access_info: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
