//! Generic key/value settings persistence over one of the configured
//! database bindings.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, ExecResult, FromQueryResult, QueryResult, Statement,
    Value,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::bindings::{DatabaseBinding, DatabaseBindings};

/// Errors raised by the settings service.
///
/// Unlike the session storage adapter, the settings service propagates
/// failures: callers catch these and translate them into user-facing
/// messages.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The service was used before a successful [`SettingsService::bind`],
    /// or the deployment never configured the named binding.
    #[error("database not available: {0}")]
    Unavailable(DatabaseBinding),

    /// The backing database reported a failure.
    #[error("database error: {0}")]
    Backend(#[from] sea_orm::DbErr),
}

/// One named configuration value within a settings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct Setting {
    /// The setting key, unique per table.
    pub key: String,
    /// The stored value in its string form; callers own any typed decoding.
    pub value: String,
    /// Epoch milliseconds of the last write to this key.
    pub updated_at: i64,
}

/// Key/value persistence helper with lazy per-instance binding to one of the
/// configured database handles.
///
/// An instance starts unbound and remembers which binding it was created
/// for; every operation before a successful [`bind`](Self::bind) fails with
/// [`SettingsError::Unavailable`] naming that binding. Once bound, the
/// instance stays bound for its lifetime.
///
/// The get/set/list operations are built from the raw statement primitives
/// ([`execute`](Self::execute), [`query_all`](Self::query_all),
/// [`query_one`](Self::query_one)), which are public for ad hoc use. Table
/// names are interpolated verbatim into the SQL and must come from trusted
/// callers; only values are bound as parameters.
#[derive(Debug, Clone)]
pub struct SettingsService {
    conn: Option<DatabaseConnection>,
    binding: DatabaseBinding,
}

impl SettingsService {
    /// Creates an unbound service targeting `binding`.
    pub fn new(binding: DatabaseBinding) -> Self {
        Self {
            conn: None,
            binding,
        }
    }

    /// Resolves `binding` from the configured handles, recording a
    /// reference on success. Returns whether binding succeeded; an
    /// unconfigured binding is a normal outcome, not an error.
    pub fn bind(&mut self, bindings: &DatabaseBindings, binding: DatabaseBinding) -> bool {
        match bindings.get(binding) {
            Some(conn) => {
                self.conn = Some(conn.clone());
                self.binding = binding;
                true
            }
            None => false,
        }
    }

    /// The binding this service addresses (bound or not).
    pub fn binding(&self) -> DatabaseBinding {
        self.binding
    }

    /// Whether a successful [`bind`](Self::bind) has happened.
    pub fn is_bound(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&DatabaseConnection, SettingsError> {
        match &self.conn {
            Some(conn) => Ok(conn),
            None => {
                warn!(binding = %self.binding, "settings operation without a bound database");
                Err(SettingsError::Unavailable(self.binding))
            }
        }
    }

    /// Executes a statement with positional parameters. Statements without
    /// parameters take the unprepared bulk path instead of a prepared
    /// statement.
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecResult, SettingsError> {
        let conn = self.conn()?;

        let result = if params.is_empty() {
            conn.execute_unprepared(sql).await
        } else {
            conn.execute(Statement::from_sql_and_values(
                conn.get_database_backend(),
                sql,
                params,
            ))
            .await
        };

        result.map_err(|err| {
            error!(binding = %self.binding, %err, "query failed");
            SettingsError::Backend(err)
        })
    }

    /// Fetches every row produced by a query with positional parameters.
    pub async fn query_all(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Vec<QueryResult>, SettingsError> {
        let conn = self.conn()?;

        conn.query_all(Statement::from_sql_and_values(
            conn.get_database_backend(),
            sql,
            params,
        ))
        .await
        .map_err(|err| {
            error!(binding = %self.binding, %err, "query failed");
            SettingsError::Backend(err)
        })
    }

    /// Fetches the first row produced by a query with positional
    /// parameters, or `None` if the query matched nothing.
    pub async fn query_one(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<QueryResult>, SettingsError> {
        let conn = self.conn()?;

        conn.query_one(Statement::from_sql_and_values(
            conn.get_database_backend(),
            sql,
            params,
        ))
        .await
        .map_err(|err| {
            error!(binding = %self.binding, %err, "query failed");
            SettingsError::Backend(err)
        })
    }

    /// Idempotently creates a key/value/timestamp settings table.
    pub async fn ensure_table(&self, table: &str) -> Result<(), SettingsError> {
        self.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (key TEXT PRIMARY KEY, value TEXT, updated_at INTEGER)"
            ),
            Vec::new(),
        )
        .await?;

        Ok(())
    }

    /// Returns the setting stored under `key`, or `None` if absent.
    pub async fn get(&self, table: &str, key: &str) -> Result<Option<Setting>, SettingsError> {
        let row = self
            .query_one(
                &format!("SELECT key, value, updated_at FROM {table} WHERE key = ?"),
                vec![key.into()],
            )
            .await?;

        row.map(|row| Setting::from_query_result(&row, ""))
            .transpose()
            .map_err(SettingsError::from)
    }

    /// Returns every setting in `table`, in whatever order the backing
    /// store reports.
    pub async fn get_all(&self, table: &str) -> Result<Vec<Setting>, SettingsError> {
        let rows = self
            .query_all(
                &format!("SELECT key, value, updated_at FROM {table}"),
                Vec::new(),
            )
            .await?;

        rows.iter()
            .map(|row| Setting::from_query_result(row, ""))
            .collect::<Result<Vec<_>, _>>()
            .map_err(SettingsError::from)
    }

    /// Upserts `key` with the string form of `value`, stamping the current
    /// time.
    pub async fn set(
        &self,
        table: &str,
        key: &str,
        value: impl ToString,
    ) -> Result<(), SettingsError> {
        self.execute(
            &format!("INSERT OR REPLACE INTO {table} (key, value, updated_at) VALUES (?, ?, ?)"),
            vec![key.into(), value.to_string().into(), epoch_ms_now().into()],
        )
        .await?;

        Ok(())
    }
}

fn epoch_ms_now() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
