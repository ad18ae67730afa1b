use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use time::OffsetDateTime;
use tracing::error;

use crate::entity::session::{
    self, ActiveModel as SessionActiveModel, Entity as SessionEntity, Model as SessionModel,
};
use crate::session::Session;

/// Errors raised by the fallible storage core.
///
/// The [`SessionStorage`] trait surface never exposes these: the contract
/// requires degrade-on-failure. They are available through the `try_*`
/// methods for callers that want error visibility.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing database reported a failure.
    #[error("database error: {0}")]
    Backend(#[from] sea_orm::DbErr),

    /// The online-access metadata could not be serialized for storage.
    #[error("could not encode online access info: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored row could not be reconstructed into a session.
    #[error("could not decode session row: {0}")]
    Decode(String),
}

/// The session persistence capability set required by the authentication
/// library.
///
/// The library invokes these at points in its own handshake, request, and
/// uninstall flows; none of them may fail its control flow. Implementations
/// therefore report failure through the return value (`false`, `None`, or
/// an empty list) after logging diagnostics, and never raise. Not-found is
/// not a failure.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Upserts a full session record keyed by `session.id`.
    async fn store_session(&self, session: &Session) -> bool;

    /// Fetches one session by identifier. Absence and backend failure both
    /// surface as `None`; failure is logged first.
    async fn load_session(&self, id: &str) -> Option<Session>;

    /// Removes one session by identifier. Deleting an absent session is
    /// success.
    async fn delete_session(&self, id: &str) -> bool;

    /// Removes every listed session as a unit.
    async fn delete_sessions(&self, ids: &[String]) -> bool;

    /// Returns all sessions belonging to the given shop, or an empty list if
    /// the store is unreachable.
    async fn find_sessions_by_shop(&self, shop: &str) -> Vec<Session>;
}

/// Matches the `shopify_sessions` schema created by the migrator; kept as a
/// single statement so it can run against backends without migration support.
const CREATE_SESSIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS shopify_sessions (id TEXT PRIMARY KEY, shop TEXT NOT NULL, state TEXT, isOnline INTEGER, scope TEXT, accessToken TEXT, expires INTEGER, onlineAccessInfo TEXT)";

/// A SQL-backed session store for Shopify app sessions using Sea-ORM.
///
/// `SqlSessionStorage` persists session records in the `shopify_sessions`
/// table through a Sea-ORM [`DatabaseConnection`]. It exposes two layers:
///
/// - the inherent `try_*` methods, which return typed [`StorageError`]s;
/// - the [`SessionStorage`] trait impl, which wraps the same operations in
///   the authentication library's degrade-on-failure contract.
///
/// The online-access metadata payload is serialized as JSON text; expiry
/// timestamps are stored as epoch milliseconds.
///
/// # Usage
///
/// ```no_run
/// use sea_orm::Database;
/// use shopify_sessions_seaorm_store::SqlSessionStorage;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Database::connect("sqlite://shopify.db?mode=rwc").await?;
///
/// let storage = SqlSessionStorage::new(conn);
/// storage.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqlSessionStorage {
    conn: DatabaseConnection,
}

impl SqlSessionStorage {
    /// Creates a session store over the given connection.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The underlying connection, for callers that share it with other
    /// components.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Runs the crate's migrations, creating the `shopify_sessions` table.
    #[cfg(feature = "migration")]
    pub async fn migrate(&self) -> Result<(), sea_orm::DbErr> {
        use sea_orm_migration::MigratorTrait;

        crate::migration::Migrator::up(&self.conn, None).await
    }

    /// Idempotently creates the `shopify_sessions` table with a plain
    /// `CREATE TABLE IF NOT EXISTS`, for deployments that manage schema
    /// without the migrator.
    pub async fn ensure_table(&self) -> Result<(), StorageError> {
        self.conn.execute_unprepared(CREATE_SESSIONS_TABLE).await?;
        Ok(())
    }

    /// Upserts a session row keyed by its identifier.
    pub async fn try_store(&self, session: &Session) -> Result<(), StorageError> {
        let row = to_active_model(session)?;

        match SessionEntity::find_by_id(session.id.clone())
            .one(&self.conn)
            .await?
        {
            Some(_) => {
                row.update(&self.conn).await?;
            }
            None => {
                row.insert(&self.conn).await?;
            }
        }

        Ok(())
    }

    /// Fetches one session by identifier, reconstructing the metadata and
    /// expiry fields from their stored forms.
    ///
    /// Expiry is not checked here: the authentication library owns expiry
    /// policy and receives whatever row exists.
    pub async fn try_load(&self, id: &str) -> Result<Option<Session>, StorageError> {
        let model = SessionEntity::find_by_id(id.to_owned())
            .one(&self.conn)
            .await?;

        model.map(to_session).transpose()
    }

    /// Deletes one session by identifier. Absence of the row is success.
    pub async fn try_delete(&self, id: &str) -> Result<(), StorageError> {
        SessionEntity::delete_by_id(id.to_owned())
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Deletes every listed session inside a single transaction, so a
    /// failure partway through rolls back the whole batch.
    pub async fn try_delete_many(&self, ids: &[String]) -> Result<(), StorageError> {
        let txn = self.conn.begin().await?;

        for id in ids {
            SessionEntity::delete_by_id(id.clone()).exec(&txn).await?;
        }

        txn.commit().await?;

        Ok(())
    }

    /// Returns all sessions whose shop key matches, reconstructed as in
    /// [`Self::try_load`].
    pub async fn try_find_by_shop(&self, shop: &str) -> Result<Vec<Session>, StorageError> {
        let models = SessionEntity::find()
            .filter(session::Column::Shop.eq(shop))
            .all(&self.conn)
            .await?;

        models.into_iter().map(to_session).collect()
    }
}

#[async_trait]
impl SessionStorage for SqlSessionStorage {
    async fn store_session(&self, session: &Session) -> bool {
        match self.try_store(session).await {
            Ok(()) => true,
            Err(err) => {
                error!(id = %session.id, %err, "failed to store session");
                false
            }
        }
    }

    async fn load_session(&self, id: &str) -> Option<Session> {
        match self.try_load(id).await {
            Ok(found) => found,
            Err(err) => {
                error!(%id, %err, "failed to load session");
                None
            }
        }
    }

    async fn delete_session(&self, id: &str) -> bool {
        match self.try_delete(id).await {
            Ok(()) => true,
            Err(err) => {
                error!(%id, %err, "failed to delete session");
                false
            }
        }
    }

    async fn delete_sessions(&self, ids: &[String]) -> bool {
        match self.try_delete_many(ids).await {
            Ok(()) => true,
            Err(err) => {
                error!(count = ids.len(), %err, "failed to delete sessions");
                false
            }
        }
    }

    async fn find_sessions_by_shop(&self, shop: &str) -> Vec<Session> {
        match self.try_find_by_shop(shop).await {
            Ok(sessions) => sessions,
            Err(err) => {
                error!(%shop, %err, "failed to find sessions by shop");
                Vec::new()
            }
        }
    }
}

fn to_active_model(session: &Session) -> Result<SessionActiveModel, StorageError> {
    let online_access_info = session
        .online_access_info
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(StorageError::Encode)?;

    Ok(SessionActiveModel {
        id: Set(session.id.clone()),
        shop: Set(session.shop.clone()),
        state: Set(session.state.clone()),
        is_online: Set(session.is_online),
        scope: Set(session.scope.clone()),
        access_token: Set(session.access_token.clone()),
        expires: Set(session.expires.map(expires_to_epoch_ms)),
        online_access_info: Set(online_access_info),
    })
}

fn to_session(model: SessionModel) -> Result<Session, StorageError> {
    let online_access_info = model
        .online_access_info
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|err| StorageError::Decode(err.to_string()))?;

    let expires = model.expires.map(epoch_ms_to_expires).transpose()?;

    Ok(Session {
        id: model.id,
        shop: model.shop,
        state: model.state,
        is_online: model.is_online,
        scope: model.scope,
        access_token: model.access_token,
        expires,
        online_access_info,
    })
}

// Helper functions converting between time::OffsetDateTime and the epoch-millisecond
// INTEGER representation used by the `expires` column.
fn expires_to_epoch_ms(expires: OffsetDateTime) -> i64 {
    (expires.unix_timestamp_nanos() / 1_000_000) as i64
}

fn epoch_ms_to_expires(ms: i64) -> Result<OffsetDateTime, StorageError> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .map_err(|err| StorageError::Decode(err.to_string()))
}
