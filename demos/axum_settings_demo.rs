//! Axum demo for shopify-sessions-seaorm-store
//!
//! Shows the intended wiring from a web application: an `AppContext` built
//! once at startup, session storage migrated on the primary database, and a
//! settings page that talks to up to three independent database bindings
//! concurrently and renders every binding's settings table.
//!
//! # Running the demo
//!
//! 1. Optionally point the bindings at real databases:
//!    ```bash
//!    export DB_URL=sqlite://demo.db?mode=rwc
//!    export DB2_URL=sqlite://demo2.db?mode=rwc
//!    # leave DB3_URL unset to see an unconfigured binding rendered
//!    ```
//! 2. Run it:
//!    ```bash
//!    cargo run --example axum_settings_demo
//!    ```
//! 3. The server starts on http://127.0.0.1:3000
//!
//! # Testing the demo
//!
//! ```bash
//! # Render every binding's settings table
//! curl "http://127.0.0.1:3000/"
//!
//! # Toggle the example checkbox setting on the second binding
//! curl "http://127.0.0.1:3000/toggle?binding=DB2&checked=true"
//! ```

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use dotenvy::dotenv;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use shopify_sessions_seaorm_store::{
    AppContext, DatabaseBinding, DatabaseBindings, Setting, SettingsError, SqlSessionStorage,
};
use std::{env, net::SocketAddr};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// One settings table per binding, mirroring a multi-database deployment.
const TABLES: [(DatabaseBinding, &str); 3] = [
    (DatabaseBinding::Db, "example_table"),
    (DatabaseBinding::Db2, "example_table_db2"),
    (DatabaseBinding::Db3, "example_table_db3"),
];

const CHECKBOX_KEY: &str = "test_checkbox";

#[derive(Clone)]
struct AppState {
    ctx: AppContext,
}

// What the overview page knows about one binding.
struct BindingView {
    binding: DatabaseBinding,
    table: &'static str,
    available: bool,
    is_checked: bool,
    settings: Vec<Setting>,
    error: Option<String>,
}

impl BindingView {
    fn unavailable(binding: DatabaseBinding, table: &'static str) -> Self {
        Self {
            binding,
            table,
            available: false,
            is_checked: false,
            settings: Vec::new(),
            error: None,
        }
    }
}

fn table_for(binding: DatabaseBinding) -> &'static str {
    TABLES
        .iter()
        .find(|(candidate, _)| *candidate == binding)
        .map(|(_, table)| *table)
        .expect("every binding has a table")
}

async fn load_binding(ctx: &AppContext, binding: DatabaseBinding) -> BindingView {
    let table = table_for(binding);
    let service = match ctx.settings(binding) {
        Ok(service) => service,
        Err(_) => return BindingView::unavailable(binding, table),
    };

    let loaded = async {
        service.ensure_table(table).await?;
        let checkbox = service.get(table, CHECKBOX_KEY).await?;
        let settings = service.get_all(table).await?;
        Ok::<_, SettingsError>((checkbox, settings))
    }
    .await;

    match loaded {
        Ok((checkbox, settings)) => BindingView {
            binding,
            table,
            available: true,
            // The stored value is a string; true only by explicit comparison.
            is_checked: checkbox.map(|s| s.value == "true").unwrap_or(false),
            settings,
            error: None,
        },
        Err(err) => BindingView {
            binding,
            table,
            available: true,
            is_checked: false,
            settings: Vec::new(),
            error: Some(err.to_string()),
        },
    }
}

fn render_binding(view: &BindingView) -> String {
    if !view.available {
        return format!(
            "<section><h2>{} &mdash; {}</h2><p>Binding not configured in this deployment.</p></section>",
            view.binding, view.table
        );
    }

    if let Some(error) = &view.error {
        return format!(
            "<section><h2>{} &mdash; {}</h2><p>Error: {}</p></section>",
            view.binding, view.table, error
        );
    }

    let rows: String = view
        .settings
        .iter()
        .map(|setting| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                setting.key, setting.value, setting.updated_at
            )
        })
        .collect();

    format!(
        r#"<section>
            <h2>{binding} &mdash; {table}</h2>
            <p>{key} is <strong>{state}</strong>.
               <a href="/toggle?binding={binding}&checked={next}">Toggle it</a></p>
            <table border="1">
                <tr><th>key</th><th>value</th><th>updated_at</th></tr>
                {rows}
            </table>
        </section>"#,
        binding = view.binding,
        table = view.table,
        key = CHECKBOX_KEY,
        state = if view.is_checked { "checked" } else { "unchecked" },
        next = !view.is_checked,
        rows = rows,
    )
}

async fn overview(State(state): State<AppState>) -> Html<String> {
    // The bindings are independent; load them jointly with no ordering.
    let (db, db2, db3) = tokio::join!(
        load_binding(&state.ctx, DatabaseBinding::Db),
        load_binding(&state.ctx, DatabaseBinding::Db2),
        load_binding(&state.ctx, DatabaseBinding::Db3),
    );

    Html(format!(
        r#"<html>
            <body>
                <h1>Multi-database settings</h1>
                {}{}{}
            </body>
        </html>"#,
        render_binding(&db),
        render_binding(&db2),
        render_binding(&db3),
    ))
}

#[derive(Deserialize)]
struct ToggleQuery {
    binding: String,
    checked: bool,
}

async fn toggle(State(state): State<AppState>, Query(params): Query<ToggleQuery>) -> Html<String> {
    let binding: DatabaseBinding = match params.binding.parse() {
        Ok(binding) => binding,
        Err(err) => return Html(format!("<html><body><p>{err}</p></body></html>")),
    };
    let table = table_for(binding);

    let updated = match state.ctx.settings(binding) {
        Ok(service) => {
            let value = if params.checked { "true" } else { "false" };
            async {
                service.ensure_table(table).await?;
                service.set(table, CHECKBOX_KEY, value).await
            }
            .await
        }
        Err(err) => Err(err),
    };

    match updated {
        Ok(()) => Html(format!(
            r#"<html><body>
                <p>Saved {CHECKBOX_KEY}={} on {}.</p>
                <p><a href="/">Back to overview</a></p>
            </body></html>"#,
            params.checked, binding
        )),
        Err(err) => Html(format!(
            "<html><body><p>Could not save to {binding}: {err}</p></body></html>"
        )),
    }
}

async fn connect_from_env(var: &str) -> Option<DatabaseConnection> {
    let url = env::var(var).ok()?;
    match Database::connect(&url).await {
        Ok(conn) => Some(conn),
        Err(err) => {
            warn!(%var, %err, "skipping binding, connection failed");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    dotenv().ok();

    // The primary binding defaults to an on-disk SQLite file so the demo
    // runs without any configuration at all.
    let db = match connect_from_env("DB_URL").await {
        Some(conn) => conn,
        None => Database::connect("sqlite://demo.db?mode=rwc").await?,
    };

    let sessions = SqlSessionStorage::new(db.clone());
    sessions.migrate().await?;

    let bindings = DatabaseBindings {
        db: Some(db),
        db2: connect_from_env("DB2_URL").await,
        db3: connect_from_env("DB3_URL").await,
    };
    let state = AppState {
        ctx: AppContext::new(sessions, bindings),
    };

    let app = Router::new()
        .route("/", get(overview))
        .route("/toggle", get(toggle))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("demo running on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
