use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use shopify_sessions_seaorm_store::{
    DatabaseBinding, DatabaseBindings, SettingsError, SettingsService,
};
use time::OffsetDateTime;

const TABLE: &str = "settings";

// A single pooled connection keeps the in-memory database alive and shared
// across every statement in a test.
async fn memory_conn() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    Database::connect(opt)
        .await
        .expect("connect in-memory sqlite")
}

async fn bindings_with(binding: DatabaseBinding) -> DatabaseBindings {
    let conn = memory_conn().await;
    let mut bindings = DatabaseBindings::default();
    match binding {
        DatabaseBinding::Db => bindings.db = Some(conn),
        DatabaseBinding::Db2 => bindings.db2 = Some(conn),
        DatabaseBinding::Db3 => bindings.db3 = Some(conn),
    }
    bindings
}

async fn bound_service(binding: DatabaseBinding) -> SettingsService {
    let bindings = bindings_with(binding).await;
    let mut service = SettingsService::new(binding);
    assert!(service.bind(&bindings, binding));
    service.ensure_table(TABLE).await.expect("create table");
    service
}

fn epoch_ms_now() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[tokio::test]
async fn operations_before_bind_fail_naming_the_binding() {
    let service = SettingsService::new(DatabaseBinding::Db2);

    let err = service
        .get(TABLE, "test_checkbox")
        .await
        .expect_err("unbound service must fail");
    assert!(matches!(err, SettingsError::Unavailable(DatabaseBinding::Db2)));
    assert!(err.to_string().contains("DB2"));

    assert!(service.set(TABLE, "test_checkbox", "true").await.is_err());
    assert!(service.get_all(TABLE).await.is_err());
    assert!(service.ensure_table(TABLE).await.is_err());
}

#[tokio::test]
async fn bind_reports_whether_the_binding_is_configured() {
    let bindings = bindings_with(DatabaseBinding::Db2).await;

    let mut missing = SettingsService::new(DatabaseBinding::Db3);
    assert!(!missing.bind(&bindings, DatabaseBinding::Db3));
    assert!(!missing.is_bound());

    let mut present = SettingsService::new(DatabaseBinding::Db2);
    assert!(present.bind(&bindings, DatabaseBinding::Db2));
    assert!(present.is_bound());
    assert_eq!(present.binding(), DatabaseBinding::Db2);

    assert_eq!(
        bindings.configured().collect::<Vec<_>>(),
        vec![DatabaseBinding::Db2]
    );
}

#[tokio::test]
async fn set_then_get_returns_the_string_form_with_a_fresh_timestamp() {
    let service = bound_service(DatabaseBinding::Db).await;

    let before = epoch_ms_now();
    service
        .set(TABLE, "test_checkbox", "true")
        .await
        .expect("set");

    let setting = service
        .get(TABLE, "test_checkbox")
        .await
        .expect("get")
        .expect("setting present");
    assert_eq!(setting.key, "test_checkbox");
    assert_eq!(setting.value, "true");
    assert!(setting.updated_at >= before);

    // Booleans are only ever decoded by explicit string comparison.
    assert!(setting.value == "true");
}

#[tokio::test]
async fn non_string_values_are_coerced_on_write() {
    let service = bound_service(DatabaseBinding::Db).await;

    service.set(TABLE, "enabled", true).await.expect("set bool");
    service.set(TABLE, "retries", 3_i64).await.expect("set int");

    let enabled = service.get(TABLE, "enabled").await.expect("get").expect("present");
    assert_eq!(enabled.value, "true");
    let retries = service.get(TABLE, "retries").await.expect("get").expect("present");
    assert_eq!(retries.value, "3");
}

#[tokio::test]
async fn get_of_a_missing_key_is_none_not_an_error() {
    let service = bound_service(DatabaseBinding::Db).await;
    let missing = service.get(TABLE, "never-written").await.expect("get");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn get_all_reflects_one_row_per_key_with_last_write_wins() {
    let service = bound_service(DatabaseBinding::Db).await;

    service.set(TABLE, "alpha", "1").await.expect("set");
    service.set(TABLE, "beta", "2").await.expect("set");
    service.set(TABLE, "gamma", "3").await.expect("set");
    let first_beta = service
        .get(TABLE, "beta")
        .await
        .expect("get")
        .expect("present");
    service.set(TABLE, "beta", "two").await.expect("overwrite");

    let mut all = service.get_all(TABLE).await.expect("get_all");
    assert_eq!(all.len(), 3);
    all.sort_by(|left, right| left.key.cmp(&right.key));
    assert_eq!(all[1].key, "beta");
    assert_eq!(all[1].value, "two");
    assert!(all[1].updated_at >= first_beta.updated_at);
}

#[tokio::test]
async fn ensure_table_is_idempotent() {
    let service = bound_service(DatabaseBinding::Db).await;
    service.ensure_table(TABLE).await.expect("second create");
    service.set(TABLE, "still", "works").await.expect("set");
}

#[tokio::test]
async fn bindings_are_fully_independent() {
    let bindings = DatabaseBindings {
        db: None,
        db2: Some(memory_conn().await),
        db3: Some(memory_conn().await),
    };

    let mut second = SettingsService::new(DatabaseBinding::Db2);
    assert!(second.bind(&bindings, DatabaseBinding::Db2));
    let mut third = SettingsService::new(DatabaseBinding::Db3);
    assert!(third.bind(&bindings, DatabaseBinding::Db3));

    // Same table name, different backing stores.
    second.ensure_table(TABLE).await.expect("create on db2");
    third.ensure_table(TABLE).await.expect("create on db3");
    let (a, b) = tokio::join!(
        second.set(TABLE, "test_checkbox", "true"),
        third.set(TABLE, "test_checkbox", "false"),
    );
    a.expect("set on db2");
    b.expect("set on db3");

    let on_second = second
        .get(TABLE, "test_checkbox")
        .await
        .expect("get")
        .expect("present");
    let on_third = third
        .get(TABLE, "test_checkbox")
        .await
        .expect("get")
        .expect("present");
    assert_eq!(on_second.value, "true");
    assert_eq!(on_third.value, "false");
}

#[tokio::test]
async fn raw_primitives_prepare_only_when_parameters_are_present() {
    let service = bound_service(DatabaseBinding::Db).await;

    // Zero parameters: the unprepared bulk path.
    service
        .execute(
            "CREATE TABLE IF NOT EXISTS counters (key TEXT PRIMARY KEY, value TEXT, updated_at INTEGER)",
            Vec::new(),
        )
        .await
        .expect("bulk execute");

    // Positional parameters: the prepared path.
    service
        .execute(
            "INSERT OR REPLACE INTO counters (key, value, updated_at) VALUES (?, ?, ?)",
            vec!["hits".into(), "41".into(), epoch_ms_now().into()],
        )
        .await
        .expect("prepared execute");

    let row = service
        .query_one(
            "SELECT value FROM counters WHERE key = ?",
            vec!["hits".into()],
        )
        .await
        .expect("query_one")
        .expect("row present");
    let value: String = row.try_get("", "value").expect("value column");
    assert_eq!(value, "41");

    let rows = service
        .query_all("SELECT key, value, updated_at FROM counters", Vec::new())
        .await
        .expect("query_all");
    assert_eq!(rows.len(), 1);
}
